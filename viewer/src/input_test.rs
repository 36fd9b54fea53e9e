#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn begin_records_start_translate() {
    let t = ViewTransform { scale: 2.0, tx: 15.0, ty: -4.0 };
    let s = PanSession::begin(7, Point::new(100.0, 100.0), &t);
    assert_eq!(s.pointer_id, 7);
    assert_eq!(s.start_tx, 15.0);
    assert_eq!(s.start_ty, -4.0);
}

#[test]
fn translate_for_adds_total_pointer_displacement() {
    let t = ViewTransform { scale: 3.0, tx: 10.0, ty: 20.0 };
    let s = PanSession::begin(1, Point::new(50.0, 50.0), &t);
    assert_eq!(s.translate_for(Point::new(80.0, 40.0)), (40.0, 10.0));
    assert_eq!(s.translate_for(Point::new(50.0, 50.0)), (10.0, 20.0));
}

#[test]
fn displacement_measures_from_start_translate() {
    let start = ViewTransform { scale: 1.0, tx: 5.0, ty: 5.0 };
    let s = PanSession::begin(1, Point::new(0.0, 0.0), &start);
    let now = ViewTransform { scale: 1.0, tx: 35.5, ty: -10.0 };
    assert_eq!(s.displacement(&now), (30.5, -15.0));
}

#[test]
fn button_equality() {
    assert_eq!(Button::Primary, Button::Primary);
    assert_ne!(Button::Primary, Button::Secondary);
}

//! Input model: mouse buttons and the pan session.
//!
//! A `PanSession` exists from the primary-button pointer-down until the
//! matching up, cancel, or leave. It remembers where the pointer and the
//! translate started so every move computes the total displacement from the
//! start instead of accumulating per-event deltas.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::transform::{Point, ViewTransform};

/// Host pointer identifier (e.g. a DOM `pointerId`).
pub type PointerId = i32;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// An active drag-to-pan gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanSession {
    pub pointer_id: PointerId,
    /// Screen position of the pointer-down.
    pub start_pointer: Point,
    /// Translate at the pointer-down.
    pub start_tx: f64,
    pub start_ty: f64,
}

impl PanSession {
    #[must_use]
    pub fn begin(pointer_id: PointerId, start_pointer: Point, transform: &ViewTransform) -> Self {
        Self { pointer_id, start_pointer, start_tx: transform.tx, start_ty: transform.ty }
    }

    /// Translate for a pointer at `pointer`: start translate plus total pointer displacement.
    #[must_use]
    pub fn translate_for(&self, pointer: Point) -> (f64, f64) {
        (
            self.start_tx + (pointer.x - self.start_pointer.x),
            self.start_ty + (pointer.y - self.start_pointer.y),
        )
    }

    /// How far `transform` has moved since the session began.
    #[must_use]
    pub fn displacement(&self, transform: &ViewTransform) -> (f64, f64) {
        (transform.tx - self.start_tx, transform.ty - self.start_ty)
    }
}

//! Viewer controller: turns host input events into transform updates.
//!
//! `ViewerCore` holds every piece of view state: the transform, measured
//! image and viewport sizes, the optional pan session, and the action log.
//! Each handler mutates that state and returns the `Action`s the host must
//! apply (restyle the image, capture the pointer, swap the cursor). Handlers
//! never fail; missing measurements degrade to the identity transform.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::action_log::{ActionKind, ActionLog};
use crate::consts::{CURSOR_IDLE, CURSOR_PANNING, DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, ZOOM_INTENSITY};
use crate::input::{Button, PanSession, PointerId};
use crate::transform::{Point, Size, ViewTransform, clamp_scale};

/// Side effects for the UI host.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Re-apply the image transform.
    TransformChanged(ViewTransform),
    CapturePointer(PointerId),
    ReleasePointer(PointerId),
    SetCursor(String),
}

pub struct ViewerCore {
    transform: ViewTransform,
    image_size: Option<Size>,
    viewport: Size,
    pan: Option<PanSession>,
    log: ActionLog,
    min_scale: f64,
    max_scale: f64,
}

impl Default for ViewerCore {
    fn default() -> Self {
        Self::with_scale_limits(DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE)
    }
}

impl ViewerCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller with custom scale bounds. Swapped bounds are reordered.
    #[must_use]
    pub fn with_scale_limits(min_scale: f64, max_scale: f64) -> Self {
        let (min_scale, max_scale) =
            if min_scale <= max_scale { (min_scale, max_scale) } else { (max_scale, min_scale) };
        Self {
            transform: ViewTransform::default(),
            image_size: None,
            viewport: Size::default(),
            pan: None,
            log: ActionLog::new(),
            min_scale,
            max_scale,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    #[must_use]
    pub fn scale_limits(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    #[must_use]
    pub fn image_size(&self) -> Option<Size> {
        self.image_size
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    #[must_use]
    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    #[must_use]
    pub fn cursor(&self) -> &'static str {
        if self.is_panning() { CURSOR_PANNING } else { CURSOR_IDLE }
    }

    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.transform.screen_to_world(screen)
    }

    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        self.transform.world_to_screen(world)
    }

    // --- Measurements ---

    /// Record the measured viewport size. Does not move the image.
    pub fn set_viewport(&mut self, size: Size) -> Vec<Action> {
        self.viewport = size;
        Vec::new()
    }

    /// Record the image's natural size and center it at scale 1. Not logged.
    pub fn on_image_loaded(&mut self, size: Size) -> Vec<Action> {
        self.image_size = Some(size);
        self.transform = ViewTransform::centered(self.image_size, self.viewport);
        vec![Action::TransformChanged(self.transform)]
    }

    // --- Zoom ---

    /// Zoom about `cursor` (viewport-relative). Positive `delta_y` zooms out.
    #[allow(clippy::float_cmp)]
    pub fn on_wheel(&mut self, cursor: Point, delta_y: f64) -> Vec<Action> {
        if !delta_y.is_finite() {
            return Vec::new();
        }
        let old_scale = self.transform.scale;
        let factor = (-delta_y * ZOOM_INTENSITY).exp();
        let new_scale = clamp_scale(old_scale * factor, self.min_scale, self.max_scale);

        // Clamped values repeat exactly, so pinned scales compare equal.
        if new_scale == old_scale {
            return Vec::new();
        }

        self.transform = self.transform.zoomed_about(cursor, new_scale);
        let kind = if new_scale > old_scale { ActionKind::ZoomIn } else { ActionKind::ZoomOut };
        self.log.push(kind, Some(format!("scale {old_scale:.3} → {new_scale:.3}")));
        vec![Action::TransformChanged(self.transform)]
    }

    // --- Pan ---

    /// Start a pan session on primary-button press. Ignored while one is active.
    pub fn on_pointer_down(&mut self, pos: Point, button: Button, pointer_id: PointerId) -> Vec<Action> {
        if button != Button::Primary || self.pan.is_some() {
            return Vec::new();
        }
        self.pan = Some(PanSession::begin(pointer_id, pos, &self.transform));
        self.log.push(
            ActionKind::PanStart,
            Some(format!("start tx={:.1}, ty={:.1}", self.transform.tx, self.transform.ty)),
        );
        vec![Action::CapturePointer(pointer_id), Action::SetCursor(CURSOR_PANNING.to_owned())]
    }

    pub fn on_pointer_move(&mut self, pos: Point) -> Vec<Action> {
        let Some(session) = self.pan else {
            return Vec::new();
        };
        let (tx, ty) = session.translate_for(pos);
        self.transform.tx = tx;
        self.transform.ty = ty;
        vec![Action::TransformChanged(self.transform)]
    }

    pub fn on_pointer_up(&mut self, pos: Point) -> Vec<Action> {
        self.end_pan(Some(pos))
    }

    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.end_pan(None)
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.end_pan(None)
    }

    fn end_pan(&mut self, release: Option<Point>) -> Vec<Action> {
        let Some(session) = self.pan.take() else {
            return Vec::new();
        };
        let (dx, dy) = session.displacement(&self.transform);
        let mut details = format!("delta dx={dx:.1}, dy={dy:.1}");
        if let Some(p) = release {
            details.push_str(&format!(" (mouse {},{})", p.x, p.y));
        }
        self.log.push(ActionKind::PanEnd, Some(details));
        vec![Action::ReleasePointer(session.pointer_id), Action::SetCursor(CURSOR_IDLE.to_owned())]
    }

    // --- Recenter ---

    /// Scale 1 with the image centered; identity translate when sizes are unknown.
    pub fn recenter(&mut self) -> Vec<Action> {
        self.transform = ViewTransform::centered(self.image_size, self.viewport);
        self.log.push(ActionKind::ResetCenter, Some("Reset view to centered (scale=1)".to_owned()));
        vec![Action::TransformChanged(self.transform)]
    }

    /// Double-click recenters.
    pub fn on_double_click(&mut self) -> Vec<Action> {
        self.recenter()
    }
}

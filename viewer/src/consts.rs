//! Shared numeric constants for the viewer crate.

// ── Zoom ────────────────────────────────────────────────────────

/// Wheel sensitivity: `factor = exp(-delta_y * ZOOM_INTENSITY)`.
pub const ZOOM_INTENSITY: f64 = 0.0015;

/// Default lower scale bound.
pub const DEFAULT_MIN_SCALE: f64 = 0.25;

/// Default upper scale bound.
pub const DEFAULT_MAX_SCALE: f64 = 5.0;

// ── Cursors ─────────────────────────────────────────────────────

/// Cursor while idle over the viewport.
pub const CURSOR_IDLE: &str = "grab";

/// Cursor during a pan session.
pub const CURSOR_PANNING: &str = "grabbing";

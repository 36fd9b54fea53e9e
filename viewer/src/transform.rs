#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

/// A point in either screen (viewport pixel) or world (image pixel) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height in pixels. Zero in either dimension means "not measured".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive.
    #[must_use]
    pub fn is_measured(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Image-to-viewport transform: scale about the origin, then translate.
///
/// `screen = world * scale + (tx, ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { scale: 1.0, tx: 0.0, ty: 0.0 }
    }
}

impl ViewTransform {
    /// Convert a screen-space point to world (image) coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.tx) / self.scale,
            y: (screen.y - self.ty) / self.scale,
        }
    }

    /// Convert a world (image) point to screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.scale + self.tx,
            y: world.y * self.scale + self.ty,
        }
    }

    /// Rescale to `new_scale` keeping the world point under `anchor` fixed on screen.
    #[must_use]
    pub fn zoomed_about(&self, anchor: Point, new_scale: f64) -> Self {
        let world = self.screen_to_world(anchor);
        Self {
            scale: new_scale,
            tx: anchor.x - world.x * new_scale,
            ty: anchor.y - world.y * new_scale,
        }
    }

    /// Scale 1 with the image centered in the viewport.
    ///
    /// Falls back to the identity translate when either size is not measured.
    #[must_use]
    pub fn centered(image: Option<Size>, viewport: Size) -> Self {
        match image {
            Some(image) if image.is_measured() && viewport.is_measured() => Self {
                scale: 1.0,
                tx: (viewport.width - image.width) / 2.0,
                ty: (viewport.height - image.height) / 2.0,
            },
            _ => Self::default(),
        }
    }
}

/// Clamp `value` into `[min, max]`. Never panics, unlike `f64::clamp`.
#[must_use]
pub fn clamp_scale(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

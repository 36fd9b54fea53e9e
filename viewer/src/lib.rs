//! Pan/zoom controller for the plan viewer.
//!
//! This crate owns the viewport math for a single raster plan shown inside a
//! fixed viewport: the affine transform (scale, then translate), cursor
//! anchored wheel zoom, drag panning, recentering, and a chronological log of
//! the user's view actions. It has no DOM or rendering dependency. A UI host
//! feeds it measured sizes and pointer events and applies the returned
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::ViewerCore`] event handlers and host actions |
//! | [`transform`] | Points, sizes, the view transform, and coordinate conversions |
//! | [`input`] | Pointer buttons and the pan session |
//! | [`action_log`] | Newest-first log of zoom/pan/recenter actions |
//! | [`consts`] | Zoom intensity and default scale limits |

pub mod action_log;
pub mod consts;
pub mod engine;
pub mod input;
pub mod transform;

//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and talk to the catalog and storage
//! backend so route handlers can stay focused on request parsing and
//! response shaping.

pub mod catalog;
pub mod files;
pub mod project;

//! Rendering only; every state change goes through [`crate::state::AppState`].

pub mod estimate;
pub mod format;
pub mod panels;
pub mod plot;
pub mod table;

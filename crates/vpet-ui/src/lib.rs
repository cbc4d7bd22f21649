//! Terminal rendering for vpet.
//!
//! Turns a [`vpet_sim::DrawList`] into half-block pixels, draws the
//! selection overlay as widgets, and frames everything with a top bar and
//! HUD. All rendering uses [`ratatui`]; this crate owns the visual
//! presentation while [`vpet_sim`] owns the state.

pub mod canvas;
pub mod graphics;
pub mod layout;
pub mod scene;
pub mod shell;
pub mod sprites;

//! Configuration and persisted state for vpet.
//!
//! This crate owns the on-disk schemas: the `vpet.toml` settings file and
//! the JSON record remembering which two creatures were last selected.

pub mod selection;
pub mod settings;

pub use selection::{SelectionRecord, SelectionStore};
pub use settings::{
    CreatureSettings, FoodSettings, InputSettings, PathSettings, ScreenSettings, Settings,
    TickRange, UiSettings,
};

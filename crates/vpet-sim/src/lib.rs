//! The vpet simulation: two creatures, the food they compete for, and the
//! selection overlay that picks who is on screen.
//!
//! Everything here is deterministic given a seeded RNG and runs one fixed
//! tick at a time. Rendering lives elsewhere; [`Game::draw_list`] describes
//! each frame as a list of sprites and widgets.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use rand::SeedableRng;
//! use vpet_config::{SelectionStore, Settings};
//! use vpet_sim::{AssetSizes, Catalog, Game};
//!
//! let settings = Settings::default();
//! let catalog = Catalog::load(Path::new("assets"), AssetSizes::from_settings(&settings));
//! let store = SelectionStore::new(settings.selection_path());
//! let mut game = Game::new(settings, catalog, store, rand::rngs::StdRng::seed_from_u64(1));
//! game.tick();
//! let _frame = game.draw_list();
//! ```

pub mod animation;
pub mod assets;
pub mod background;
pub mod creature;
pub mod draw;
pub mod food;
pub mod game;
pub mod geom;
pub mod gesture;
pub mod overlay;
pub mod world;

pub use animation::{AnimationKind, AnimationSet, SpriteRef};
pub use assets::{AssetSizes, Catalog, Frame};
pub use creature::{Creature, CreatureId, Emotion, Facing, StateKind};
pub use draw::{DrawCommand, DrawList};
pub use food::{Food, FoodArena, FoodId};
pub use game::{CreatureStatus, Game, Status};
pub use geom::Rect;
pub use overlay::{OverlayView, SelectionOverlay};
pub use world::World;

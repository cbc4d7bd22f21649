use rand::rngs::StdRng;
use vpet_config::{SelectionStore, Settings};
use vpet_core::event::{Action, Event, PointerEvent};

use crate::animation::AnimationSet;
use crate::assets::Catalog;
use crate::background::BackgroundCycler;
use crate::creature::{Creature, StateKind};
use crate::draw::{DrawCommand, DrawList};
use crate::gesture::{Gesture, GestureTracker, SwipeDirection};
use crate::overlay::{OverlayOutcome, SelectionOverlay};
use crate::world::{CreatureSpec, TapOutcome, World};

/// Vertical gap between a creature's top edge and its emotion icon.
const EMOTION_OFFSET: f32 = 10.0;

/// Per-creature line for the HUD.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatureStatus {
    pub name: String,
    pub state: StateKind,
    pub hunger: f32,
}

/// Snapshot of everything the HUD shows besides the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub creatures: [CreatureStatus; 2],
    pub foods: usize,
    pub ticks: u64,
    pub paused: bool,
    pub background: String,
}

/// The whole application state: scene, overlay, gestures and persistence.
///
/// Input arrives as [`Event`]s; the caller draws whatever
/// [`draw_list`](Self::draw_list) returns.
#[derive(Debug)]
pub struct Game {
    settings: Settings,
    catalog: Catalog,
    world: World,
    pair: [usize; 2],
    overlay: SelectionOverlay,
    gestures: GestureTracker,
    backgrounds: BackgroundCycler,
    store: SelectionStore,
}

impl Game {
    /// Start with the persisted pair when it is still valid, otherwise a
    /// random pair from the catalog.
    pub fn new(
        settings: Settings,
        catalog: Catalog,
        store: SelectionStore,
        mut rng: StdRng,
    ) -> Self {
        let saved = store
            .load()
            .and_then(|record| record.valid_pair(|name| catalog.contains(name)))
            .and_then(|[a, b]| Some([catalog.index_of(&a)?, catalog.index_of(&b)?]))
            .filter(|[a, b]| a != b);
        let pair = match saved {
            Some(pair) => {
                let ids = catalog.ids();
                tracing::info!(a = %ids[pair[0]], b = %ids[pair[1]], "restored selection");
                pair
            }
            None => {
                let pair = catalog.random_pair(&mut rng);
                tracing::info!(
                    a = pair[0],
                    b = pair[1],
                    "no usable saved selection, picked at random"
                );
                pair
            }
        };

        let specs = creature_specs(&catalog, &settings, pair);
        let world = World::new(settings.clone(), specs, rng);
        let overlay = SelectionOverlay::new(
            catalog.names(),
            settings.ui.page_size,
            settings.screen.width as f32,
            settings.screen.height as f32,
        );
        Self {
            gestures: GestureTracker::new(settings.input.clone()),
            backgrounds: BackgroundCycler::new(catalog.backgrounds().len()),
            settings,
            catalog,
            world,
            pair,
            overlay,
            store,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn pair(&self) -> [usize; 2] {
        self.pair
    }

    pub fn overlay(&self) -> &SelectionOverlay {
        &self.overlay
    }

    pub fn background(&self) -> usize {
        self.backgrounds.current()
    }

    pub fn is_paused(&self) -> bool {
        self.overlay.is_active()
    }

    /// Route one event. Returns `false` when the app should quit.
    pub fn handle(&mut self, event: &Event) -> bool {
        match event {
            Event::Tick { .. } => {
                self.tick();
            }
            Event::Pointer(pointer) => self.handle_pointer(pointer),
            Event::Action(action) => self.handle_action(*action),
            Event::Resize { .. } => {}
            Event::Quit => return false,
        }
        true
    }

    /// Advance the scene one tick. Does nothing while the overlay is open.
    pub fn tick(&mut self) -> bool {
        if self.overlay.is_active() {
            return false;
        }
        self.world.tick();
        true
    }

    pub fn handle_pointer(&mut self, pointer: &PointerEvent) {
        let Some(gesture) = self.gestures.handle(pointer) else {
            return;
        };
        if self.overlay.is_active() {
            match gesture {
                Gesture::Tap { x, y, .. } => {
                    let outcome = self.overlay.handle_tap(x, y);
                    self.apply_overlay_outcome(outcome);
                }
                Gesture::Swipe(SwipeDirection::Left) => {
                    self.overlay.close();
                    tracing::debug!("selection overlay dismissed");
                }
                Gesture::Swipe(SwipeDirection::Right) => {}
            }
            return;
        }

        match gesture {
            Gesture::Swipe(SwipeDirection::Right) => self.open_overlay(),
            Gesture::Swipe(SwipeDirection::Left) => {}
            Gesture::Tap { x, y, double } => {
                let half_h = self.settings.screen.height as f32 / 2.0;
                if y < half_h {
                    if double {
                        let half_w = self.settings.screen.width as f32 / 2.0;
                        self.step_background(if x < half_w { -1 } else { 1 });
                    }
                    return;
                }
                // Only taps in the sky can pair up into a double tap.
                self.gestures.forget_tap();
                match self.world.tap(x, y) {
                    TapOutcome::Food(id) => tracing::debug!(food_id = %id, "food dropped by tap"),
                    TapOutcome::Creature(id) => tracing::debug!(creature = %id, "creature tapped"),
                    TapOutcome::Ignored(_) => {}
                }
            }
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::ToggleSelection => {
                if self.overlay.is_active() {
                    self.overlay.close();
                } else {
                    self.open_overlay();
                }
            }
            Action::DropFood => {
                if !self.overlay.is_active() {
                    self.world.drop_food_above_random();
                }
            }
            Action::NextBackground => self.step_background(1),
            Action::PrevBackground => self.step_background(-1),
        }
    }

    fn open_overlay(&mut self) {
        self.gestures.reset();
        self.overlay.open(self.pair);
    }

    fn step_background(&mut self, step: i8) {
        let index = if step < 0 {
            self.backgrounds.prev()
        } else {
            self.backgrounds.next()
        };
        tracing::debug!(background = index, "background changed");
    }

    fn apply_overlay_outcome(&mut self, outcome: OverlayOutcome) {
        match outcome {
            OverlayOutcome::Nothing | OverlayOutcome::Updated => {}
            OverlayOutcome::Background(step) => self.step_background(step),
            OverlayOutcome::Cancelled => tracing::debug!("selection cancelled"),
            OverlayOutcome::Confirmed(pair) => self.apply_selection(pair),
        }
    }

    /// Persist `pair` and replace both creatures. A failed write is logged
    /// and the new pair is still used for this session.
    pub fn apply_selection(&mut self, pair: [usize; 2]) {
        let ids = self.catalog.ids();
        let (Some(a), Some(b)) = (ids.get(pair[0]), ids.get(pair[1])) else {
            tracing::warn!(?pair, "selection outside the catalog ignored");
            return;
        };
        let named = [a.clone(), b.clone()];
        if let Err(e) = self.store.save(&named) {
            tracing::error!("failed to save selection: {e:#}");
        }
        tracing::info!(a = %named[0], b = %named[1], "selection confirmed");

        self.pair = pair;
        let specs = creature_specs(&self.catalog, &self.settings, pair);
        self.world.reinit(specs);
    }

    pub fn draw_list(&self) -> DrawList {
        let mut list = DrawList::new(self.settings.screen.width, self.settings.screen.height);
        list.push(DrawCommand::Background {
            index: self.backgrounds.current(),
        });
        for food in self.world.foods().iter() {
            list.push(DrawCommand::Food { rect: food.rect() });
        }
        for creature in self.world.creatures() {
            list.push(DrawCommand::Creature {
                catalog_index: creature.catalog_index(),
                sprite: creature.sprite(),
                x: creature.x(),
                y: creature.y(),
            });
        }
        for creature in self.world.creatures() {
            if let Some((emotion, alpha)) = creature.emotion() {
                list.push(DrawCommand::Emotion {
                    emotion,
                    x: creature.center_x(),
                    y: (creature.y() - EMOTION_OFFSET).max(0.0),
                    alpha,
                });
            }
        }
        if self.overlay.is_active() {
            list.push(DrawCommand::Overlay(self.overlay.view()));
        }
        list
    }

    pub fn status(&self) -> Status {
        let line = |c: &Creature| CreatureStatus {
            name: c.name().to_string(),
            state: c.state_kind(),
            hunger: c.hunger(),
        };
        let [a, b] = self.world.creatures();
        Status {
            creatures: [line(a), line(b)],
            foods: self.world.foods().len(),
            ticks: self.world.ticks(),
            paused: self.overlay.is_active(),
            background: self
                .catalog
                .backgrounds()
                .get(self.backgrounds.current())
                .map(|b| b.name.clone())
                .unwrap_or_default(),
        }
    }
}

fn creature_specs(
    catalog: &Catalog,
    settings: &Settings,
    pair: [usize; 2],
) -> [CreatureSpec; 2] {
    pair.map(|index| {
        let (name, animations) = match catalog.creature(index) {
            Some(sprites) => (
                sprites.name.clone(),
                sprites.animations(settings.creature.frame_delay),
            ),
            None => (
                format!("#{index}"),
                AnimationSet::for_frames(&Default::default(), settings.creature.frame_delay),
            ),
        };
        CreatureSpec {
            name,
            catalog_index: index,
            animations,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetSizes;
    use crate::creature::CreatureId;
    use rand::SeedableRng;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vpet-game-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn catalog_with(root: &Path, names: &[&str]) -> Catalog {
        for name in names {
            for i in [0, 1] {
                let path = root.join("sprites").join(name).join(format!("{i}.png"));
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]))
                    .save(&path)
                    .unwrap();
            }
        }
        Catalog::load(
            root,
            AssetSizes {
                sprite: 48,
                food: 12,
                screen_width: 480,
                screen_height: 320,
            },
        )
    }

    fn game(name: &str, names: &[&str]) -> (Game, PathBuf) {
        let root = temp_dir(name);
        let catalog = catalog_with(&root, names);
        let store = SelectionStore::new(root.join("selection.json"));
        let game = Game::new(
            Settings::default(),
            catalog,
            store,
            StdRng::seed_from_u64(1),
        );
        (game, root)
    }

    fn tap(game: &mut Game, x: f32, y: f32, at: u64) {
        game.handle(&Event::Pointer(PointerEvent::press(x, y, at)));
        game.handle(&Event::Pointer(PointerEvent::release(x, y, at + 20)));
    }

    fn swipe(game: &mut Game, from: f32, to: f32, at: u64) {
        game.handle(&Event::Pointer(PointerEvent::press(from, 200.0, at)));
        game.handle(&Event::Pointer(PointerEvent::release(to, 200.0, at + 100)));
    }

    #[test]
    fn saved_selection_is_restored() {
        let root = temp_dir("restore");
        let catalog = catalog_with(&root, &["Agumon", "Gabumon", "Patamon"]);
        let store = SelectionStore::new(root.join("selection.json"));
        store.save(&["Patamon".into(), "Agumon".into()]).unwrap();

        let game = Game::new(Settings::default(), catalog, store, StdRng::seed_from_u64(1));
        assert_eq!(game.pair(), [2, 0]);
        assert_eq!(game.world().creature(CreatureId::A).name(), "Patamon");
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn folder_named_selection_is_restored() {
        let root = temp_dir("restore-dmc");
        let catalog = catalog_with(&root, &["Agumon_dmc", "Gabumon_dmc", "Patamon_dmc"]);
        assert_eq!(catalog.names(), vec!["Agumon", "Gabumon", "Patamon"]);
        let store = SelectionStore::new(root.join("selection.json"));
        store
            .save(&["Patamon_dmc".into(), "Agumon_dmc".into()])
            .unwrap();

        for seed in 0..5 {
            let game = Game::new(
                Settings::default(),
                catalog.clone(),
                store.clone(),
                StdRng::seed_from_u64(seed),
            );
            assert_eq!(game.pair(), [2, 0], "seed {seed}");
        }
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn confirmed_selection_stores_folder_names() {
        let (mut game, root) = game("save-dmc", &["Agumon_dmc", "Gabumon_dmc", "Patamon_dmc"]);
        game.apply_selection([1, 2]);
        let record = SelectionStore::new(root.join("selection.json")).load().unwrap();
        assert_eq!(record.selected_digimon, vec!["Gabumon_dmc", "Patamon_dmc"]);
        assert_eq!(game.world().creature(CreatureId::A).name(), "Gabumon");
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn folder_and_display_name_of_one_creature_is_not_a_pair() {
        let root = temp_dir("restore-same");
        let catalog = catalog_with(&root, &["Agumon_dmc", "Gabumon_dmc"]);
        let store = SelectionStore::new(root.join("selection.json"));
        store.save(&["Agumon".into(), "Agumon_dmc".into()]).unwrap();

        let game = Game::new(Settings::default(), catalog, store, StdRng::seed_from_u64(1));
        let [a, b] = game.pair();
        assert_ne!(a, b);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn stale_selection_falls_back_to_random_pair() {
        let root = temp_dir("stale");
        let catalog = catalog_with(&root, &["Agumon", "Gabumon"]);
        let store = SelectionStore::new(root.join("selection.json"));
        store.save(&["Agumon".into(), "Gone".into()]).unwrap();

        let game = Game::new(Settings::default(), catalog, store, StdRng::seed_from_u64(1));
        let [a, b] = game.pair();
        assert_ne!(a, b);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn swipe_right_opens_overlay_and_pauses() {
        let (mut game, root) = game("swipe", &["Agumon", "Gabumon", "Patamon"]);
        swipe(&mut game, 100.0, 300.0, 0);
        assert!(game.is_paused());
        assert!(game.draw_list().overlay().is_some());
        let ticks = game.world().ticks();
        game.handle(&Event::Tick {
            now: std::time::Instant::now(),
        });
        assert_eq!(game.world().ticks(), ticks);

        swipe(&mut game, 300.0, 100.0, 1000);
        assert!(!game.is_paused());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn confirming_overlay_saves_and_reinits() {
        let (mut game, root) = game("confirm", &["Agumon", "Gabumon", "Patamon"]);
        game.handle_action(Action::ToggleSelection);
        let layout = game.overlay().layout().clone();
        let picks = game.overlay().picks();
        let fresh = (0..3).find(|i| !picks.contains(i)).unwrap();

        let tile = layout.tiles[fresh];
        tap(&mut game, tile.center_x(), tile.center_y(), 0);
        let confirm = layout
            .buttons
            .iter()
            .find(|(b, _)| *b == crate::overlay::OverlayButton::Confirm)
            .map(|(_, r)| *r)
            .unwrap();
        tap(&mut game, confirm.center_x(), confirm.center_y(), 1000);

        assert!(!game.is_paused());
        assert_eq!(game.pair(), [picks[1], fresh]);
        let record = SelectionStore::new(root.join("selection.json")).load().unwrap();
        let ids = game.catalog().ids();
        assert_eq!(
            record.selected_digimon,
            vec![ids[picks[1]].clone(), ids[fresh].clone()]
        );
        assert_eq!(
            game.world().creature(CreatureId::A).state_kind(),
            StateKind::Sleeping
        );
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn lower_half_tap_drops_food_upper_double_tap_cycles_background() {
        let root = temp_dir("taps");
        fs::create_dir_all(root.join("backgrounds")).unwrap();
        for name in ["a", "b"] {
            image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]))
                .save(root.join("backgrounds").join(format!("{name}.png")))
                .unwrap();
        }
        let catalog = catalog_with(&root, &["Agumon", "Gabumon"]);
        let store = SelectionStore::new(root.join("selection.json"));
        let mut game = Game::new(Settings::default(), catalog, store, StdRng::seed_from_u64(5));

        // find empty ground away from both creatures
        let x = (0..480)
            .map(|x| x as f32)
            .find(|&x| {
                game.world()
                    .creatures()
                    .iter()
                    .all(|c| !c.rect().contains(x, 280.0))
            })
            .unwrap();
        tap(&mut game, x, 280.0, 0);
        assert_eq!(game.world().foods().len(), 1);

        tap(&mut game, 400.0, 40.0, 1000);
        assert_eq!(game.background(), 0);
        tap(&mut game, 400.0, 40.0, 1100);
        assert_eq!(game.background(), 1);
        assert_eq!(game.world().foods().len(), 1);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn ground_tap_then_sky_tap_is_not_a_double_tap() {
        let root = temp_dir("mixed-taps");
        fs::create_dir_all(root.join("backgrounds")).unwrap();
        for name in ["a", "b"] {
            image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]))
                .save(root.join("backgrounds").join(format!("{name}.png")))
                .unwrap();
        }
        let catalog = catalog_with(&root, &["Agumon", "Gabumon"]);
        let store = SelectionStore::new(root.join("selection.json"));
        let mut game = Game::new(Settings::default(), catalog, store, StdRng::seed_from_u64(5));

        let x = (0..480)
            .map(|x| x as f32)
            .find(|&x| {
                game.world()
                    .creatures()
                    .iter()
                    .all(|c| !c.rect().contains(x, 280.0))
            })
            .unwrap();
        tap(&mut game, x, 280.0, 0);
        assert_eq!(game.world().foods().len(), 1);
        tap(&mut game, 400.0, 40.0, 200);
        assert_eq!(game.background(), 0);

        // the sky tap above still pairs with a quick second one
        tap(&mut game, 400.0, 40.0, 300);
        assert_eq!(game.background(), 1);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn tapping_creature_wakes_it() {
        let (mut game, root) = game("wake", &["Agumon", "Gabumon"]);
        let rect = game.world().creature(CreatureId::B).rect();
        tap(&mut game, rect.center_x(), rect.center_y(), 0);
        assert_eq!(
            game.world().creature(CreatureId::B).state_kind(),
            StateKind::Walking
        );
        assert!(game.world().foods().is_empty());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn draw_list_orders_background_first() {
        let (mut game, root) = game("draw", &["Agumon", "Gabumon"]);
        game.handle_action(Action::DropFood);
        let list = game.draw_list();
        assert!(matches!(list.commands[0], DrawCommand::Background { index: 0 }));
        assert!(matches!(list.commands[1], DrawCommand::Food { .. }));
        let creatures = list
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Creature { .. }))
            .count();
        assert_eq!(creatures, 2);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn status_reports_both_creatures() {
        let (game, root) = game("status", &["Agumon", "Gabumon"]);
        let status = game.status();
        assert_eq!(status.creatures[0].state, StateKind::Sleeping);
        assert_eq!(status.creatures[1].hunger, 50.0);
        assert!(!status.paused);
        assert_eq!(status.background, "sky");
        let _ = fs::remove_dir_all(&root);
    }
}

use rand::rngs::StdRng;
use rand::Rng;
use vpet_config::Settings;

use crate::animation::AnimationSet;
use crate::creature::{Creature, CreatureId, Facing};
use crate::food::{FoodArena, FoodId};

/// What a new creature is built from.
#[derive(Debug, Clone)]
pub struct CreatureSpec {
    pub name: String,
    pub catalog_index: usize,
    pub animations: AnimationSet,
}

/// Result of a tap on the ground half of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The tap landed on a creature, which woke or jumped.
    Creature(CreatureId),
    /// The tap landed on a creature that was too busy to react.
    Ignored(CreatureId),
    /// Empty ground: a food item was dropped there.
    Food(FoodId),
}

/// Push `b` away from `a` until they are at least `min_sep` apart while
/// both stay inside `[0, max_x]`. `a` only moves when there is no room on
/// either side of it.
pub fn separate(a: f32, b: f32, min_sep: f32, max_x: f32) -> (f32, f32) {
    if (b - a).abs() >= min_sep {
        return (a, b);
    }
    if b >= a && a + min_sep <= max_x {
        return (a, a + min_sep);
    }
    if a - min_sep >= 0.0 {
        return (a, a - min_sep);
    }
    if a + min_sep <= max_x {
        return (a, a + min_sep);
    }
    // The screen is narrower than the separation; spread as far as possible.
    (0.0, max_x)
}

/// The pair coordinator: both creatures, the food arena, and the rules that
/// connect them.
///
/// Creature `A` is always evaluated before `B`. That order decides food
/// assignment ties and makes every run with the same seed reproducible.
#[derive(Debug)]
pub struct World {
    settings: Settings,
    creatures: [Creature; 2],
    foods: FoodArena,
    rng: StdRng,
    ticks: u64,
}

impl World {
    /// Place both creatures at random, non-overlapping ground positions.
    pub fn new(settings: Settings, specs: [CreatureSpec; 2], mut rng: StdRng) -> Self {
        let positions = random_positions(&settings, &mut rng);
        Self::with_positions(settings, specs, positions, rng)
    }

    /// Place both creatures at `positions`, spreading them apart first if
    /// they are closer than the minimum separation.
    pub fn with_positions(
        settings: Settings,
        specs: [CreatureSpec; 2],
        positions: [f32; 2],
        mut rng: StdRng,
    ) -> Self {
        let creatures = spawn(&settings, specs, positions, &mut rng);
        let ground_line = settings
            .screen
            .height
            .saturating_sub(settings.screen.ground_margin) as f32;
        let foods = FoodArena::new(
            settings.food.clone(),
            settings.screen.width as f32,
            ground_line,
        );
        Self {
            settings,
            creatures,
            foods,
            rng,
            ticks: 0,
        }
    }

    /// Replace both creatures. Food stays on the ground but every claim is
    /// dropped, since the claim holders no longer exist.
    pub fn reinit(&mut self, specs: [CreatureSpec; 2]) {
        let positions = random_positions(&self.settings, &mut self.rng);
        self.creatures = spawn(&self.settings, specs, positions, &mut self.rng);
        self.foods.clear_claims();
        tracing::info!(
            a = %self.creatures[0].name(),
            b = %self.creatures[1].name(),
            "creatures replaced"
        );
    }

    pub fn creatures(&self) -> &[Creature; 2] {
        &self.creatures
    }

    pub fn creature(&self, id: CreatureId) -> &Creature {
        &self.creatures[id.index()]
    }

    pub fn foods(&self) -> &FoodArena {
        &self.foods
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Advance the whole scene by one tick.
    pub fn tick(&mut self) {
        self.ticks += 1;

        for gone in self.foods.tick() {
            for creature in &mut self.creatures {
                creature.food_removed(gone.id());
            }
        }

        self.assign_food();

        let before = [self.creatures[0].x(), self.creatures[1].x()];
        for creature in &mut self.creatures {
            creature.update(&mut self.foods, &mut self.rng);
        }

        self.resolve_collision(before);
    }

    /// Hand each unclaimed, grounded item to the nearest free creature
    /// within the engagement radius. Items go oldest first and each
    /// creature takes at most one per tick.
    fn assign_food(&mut self) {
        let radius = self.settings.food.engagement_radius;
        let mut taken = [false; 2];

        for food_id in self.foods.ids() {
            let Some(food) = self.foods.live(food_id) else {
                continue;
            };
            if !food.is_grounded() || food.claimed_by().is_some() {
                continue;
            }
            let food_x = food.center_x();

            let mut best: Option<(CreatureId, f32)> = None;
            for id in CreatureId::BOTH {
                let creature = &self.creatures[id.index()];
                if taken[id.index()] || !creature.can_seek() {
                    continue;
                }
                let distance = (creature.center_x() - food_x).abs();
                if distance > radius {
                    continue;
                }
                // Strict comparison keeps A on ties.
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((id, distance));
                }
            }

            let Some((winner, distance)) = best else {
                continue;
            };
            let claimed = self
                .foods
                .get_mut(food_id)
                .is_some_and(|f| f.claim(winner));
            if claimed && self.creatures[winner.index()].begin_seeking(food_id, food_x) {
                taken[winner.index()] = true;
                tracing::debug!(
                    creature = %self.creatures[winner.index()].name(),
                    food_id = %food_id,
                    distance,
                    "food assigned"
                );
            } else if let Some(f) = self.foods.get_mut(food_id) {
                f.release(winner);
            }
        }
    }

    /// Start the greeting handshake when the two creatures touch and both
    /// are free to greet.
    fn resolve_collision(&mut self, before: [f32; 2]) {
        let [a, b] = &mut self.creatures;
        if !a.rect().overlaps(&b.rect()) || !a.can_greet() || !b.can_greet() {
            return;
        }

        a.rollback_x(before[0]);
        b.rollback_x(before[1]);

        let face_a = if a.center_x() <= b.center_x() {
            Facing::Right
        } else {
            Facing::Left
        };
        let face_b = face_a.opposite();
        a.begin_greeting(face_a, face_a.opposite());
        b.begin_greeting(face_b, face_b.opposite());

        let nudge = self.settings.creature.collision_nudge;
        a.nudge(-face_a.sign() * nudge);
        b.nudge(-face_b.sign() * nudge);

        tracing::debug!(a = %a.name(), b = %b.name(), "greeting");
    }

    /// Tap at scene coordinates on the ground half. Creatures are hit-tested
    /// in order; a miss drops food at the tap point.
    pub fn tap(&mut self, x: f32, y: f32) -> TapOutcome {
        for id in CreatureId::BOTH {
            let creature = &mut self.creatures[id.index()];
            if creature.rect().contains(x, y) {
                return if creature.tap(&mut self.rng) {
                    TapOutcome::Creature(id)
                } else {
                    TapOutcome::Ignored(id)
                };
            }
        }
        TapOutcome::Food(self.drop_food(x, y))
    }

    /// Wake or jump `id` directly.
    pub fn tap_creature(&mut self, id: CreatureId) -> bool {
        self.creatures[id.index()].tap(&mut self.rng)
    }

    pub fn drop_food(&mut self, x: f32, y: f32) -> FoodId {
        self.foods.drop_at(x, y)
    }

    /// Drop food from the top of the screen above a random creature.
    pub fn drop_food_above_random(&mut self) -> FoodId {
        let id = if self.rng.gen_bool(0.5) {
            CreatureId::A
        } else {
            CreatureId::B
        };
        let x = self.creatures[id.index()].center_x();
        self.foods.drop_at(x, 0.0)
    }

    #[cfg(test)]
    pub(crate) fn creature_mut(&mut self, id: CreatureId) -> &mut Creature {
        &mut self.creatures[id.index()]
    }
}

/// Whole-pixel start positions, so `a + min_separation` stays exact.
fn random_positions(settings: &Settings, rng: &mut StdRng) -> [f32; 2] {
    let max_x = settings
        .screen
        .width
        .saturating_sub(settings.creature.sprite_size);
    [rng.gen_range(0..=max_x) as f32, rng.gen_range(0..=max_x) as f32]
}

fn max_x(settings: &Settings) -> f32 {
    settings
        .screen
        .width
        .saturating_sub(settings.creature.sprite_size) as f32
}

fn spawn(
    settings: &Settings,
    specs: [CreatureSpec; 2],
    positions: [f32; 2],
    rng: &mut StdRng,
) -> [Creature; 2] {
    let (xa, xb) = separate(
        positions[0],
        positions[1],
        settings.creature.min_separation,
        max_x(settings),
    );
    let [a, b] = specs;
    [
        Creature::new(CreatureId::A, a.name, a.catalog_index, a.animations, xa, settings, rng),
        Creature::new(CreatureId::B, b.name, b.catalog_index, b.animations, xb, settings, rng),
    ]
}

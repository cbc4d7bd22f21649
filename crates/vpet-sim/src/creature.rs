use std::fmt;

use rand::Rng;
use vpet_config::{Settings, TickRange};

use crate::animation::{AnimationKind, AnimationSet, SpriteRef};
use crate::food::{FoodArena, FoodId};
use crate::geom::Rect;

/// Ticks after a greeting during which the same pair cannot greet again.
const GREET_COOLDOWN_TICKS: u32 = 30;

/// Which of the two on-screen creatures. `A` is always evaluated first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreatureId(usize);

impl CreatureId {
    pub const A: CreatureId = CreatureId(0);
    pub const B: CreatureId = CreatureId(1);
    pub const BOTH: [CreatureId; 2] = [Self::A, Self::B];

    pub fn index(self) -> usize {
        self.0
    }

    pub fn other(self) -> CreatureId {
        CreatureId(1 - self.0)
    }
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0 == 0 { "A" } else { "B" })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Direction from `from_x` toward `to_x`. Ties face right.
    pub fn toward(from_x: f32, to_x: f32) -> Facing {
        if to_x < from_x {
            Facing::Left
        } else {
            Facing::Right
        }
    }
}

/// Icon shown briefly above a creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    /// Woken up.
    Happy,
    /// Greeting the other creature.
    Love,
    /// Spotted food.
    Surprise,
    /// Finished eating.
    Yum,
}

impl Emotion {
    pub fn glyph(self) -> char {
        match self {
            Emotion::Happy => '♪',
            Emotion::Love => '♥',
            Emotion::Surprise => '!',
            Emotion::Yum => '*',
        }
    }
}

/// Where a jump lands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ground {
    Sleeping,
    Walking,
}

/// The behavior state. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum State {
    Sleeping,
    Walking,
    SeekingFood { food: FoodId },
    Eating { food: FoodId },
    Greeting { depart: Facing },
    Jumping { vy: f32, resume: Ground },
}

/// Payload-free view of [`State`] for display and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Sleeping,
    Walking,
    SeekingFood,
    Eating,
    Greeting,
    Jumping,
}

impl State {
    pub fn kind(&self) -> StateKind {
        match self {
            State::Sleeping => StateKind::Sleeping,
            State::Walking => StateKind::Walking,
            State::SeekingFood { .. } => StateKind::SeekingFood,
            State::Eating { .. } => StateKind::Eating,
            State::Greeting { .. } => StateKind::Greeting,
            State::Jumping { .. } => StateKind::Jumping,
        }
    }

    /// The food this state holds a claim on, if any.
    pub fn food(&self) -> Option<FoodId> {
        match *self {
            State::SeekingFood { food } | State::Eating { food } => Some(food),
            _ => None,
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StateKind::Sleeping => "sleeping",
            StateKind::Walking => "walking",
            StateKind::SeekingFood => "seeking food",
            StateKind::Eating => "eating",
            StateKind::Greeting => "greeting",
            StateKind::Jumping => "jumping",
        };
        f.write_str(s)
    }
}

/// Per-creature copy of the tuning it needs every tick.
#[derive(Debug, Clone)]
struct Tuning {
    speed: f32,
    max_x: f32,
    max_y: f32,
    ground_y: f32,
    turn_interval: TickRange,
    bounce_interval: TickRange,
    jump_impulse: f32,
    gravity: f32,
    hunger_decay: f32,
    hunger_decay_period: u32,
    feed_amount: f32,
    eat_distance: f32,
    emotion_ticks: u32,
    emotion_fade: f32,
}

impl Tuning {
    fn from_settings(settings: &Settings, size: f32) -> Self {
        let c = &settings.creature;
        Self {
            speed: c.speed,
            max_x: (settings.screen.width as f32 - size).max(0.0),
            max_y: (settings.screen.height as f32 - size).max(0.0),
            ground_y: settings.ground_y(size as u32),
            turn_interval: c.turn_interval,
            bounce_interval: c.bounce_interval,
            jump_impulse: c.jump_impulse,
            gravity: c.gravity,
            hunger_decay: c.hunger_decay,
            hunger_decay_period: c.hunger_decay_period,
            feed_amount: c.feed_amount,
            eat_distance: settings.food.eat_distance,
            emotion_ticks: c.emotion_ticks,
            emotion_fade: c.emotion_fade,
        }
    }
}

fn roll(range: TickRange, rng: &mut impl Rng) -> u32 {
    rng.gen_range(range.min..=range.max)
}

/// One of the two pets.
///
/// Transitions are driven from outside only through the command methods
/// ([`wake`](Self::wake), [`jump`](Self::jump),
/// [`begin_seeking`](Self::begin_seeking),
/// [`begin_greeting`](Self::begin_greeting)); everything else happens in
/// [`update`](Self::update).
#[derive(Debug, Clone)]
pub struct Creature {
    id: CreatureId,
    name: String,
    catalog_index: usize,
    x: f32,
    y: f32,
    size: f32,
    facing: Facing,
    state: State,
    anim: AnimationSet,
    hunger: f32,
    hunger_timer: u32,
    turn_timer: u32,
    next_turn: u32,
    greet_cooldown: u32,
    emotion: Option<(Emotion, u32)>,
    tuning: Tuning,
}

impl Creature {
    /// A new creature asleep on the ground at `x`, facing right.
    pub fn new(
        id: CreatureId,
        name: impl Into<String>,
        catalog_index: usize,
        anim: AnimationSet,
        x: f32,
        settings: &Settings,
        rng: &mut impl Rng,
    ) -> Self {
        let size = settings.creature.sprite_size as f32;
        let tuning = Tuning::from_settings(settings, size);
        let mut creature = Self {
            id,
            name: name.into(),
            catalog_index,
            x: x.clamp(0.0, tuning.max_x),
            y: tuning.ground_y,
            size,
            facing: Facing::Right,
            state: State::Sleeping,
            anim,
            hunger: settings.creature.hunger_start.clamp(0.0, 100.0),
            hunger_timer: 0,
            turn_timer: 0,
            next_turn: roll(tuning.turn_interval, rng),
            greet_cooldown: 0,
            emotion: None,
            tuning,
        };
        creature.set_facing(Facing::Right);
        creature.anim.play(AnimationKind::Sleep);
        creature
    }

    pub fn id(&self) -> CreatureId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog_index(&self) -> usize {
        self.catalog_index
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.size / 2.0
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn state_kind(&self) -> StateKind {
        self.state.kind()
    }

    pub fn hunger(&self) -> f32 {
        self.hunger
    }

    pub fn claimed_food(&self) -> Option<FoodId> {
        self.state.food()
    }

    pub fn sprite(&self) -> SpriteRef {
        self.anim.current()
    }

    pub fn animation(&self) -> &AnimationSet {
        &self.anim
    }

    /// Ticks left before the next spontaneous turn.
    pub fn ticks_until_turn(&self) -> u32 {
        self.next_turn.saturating_sub(self.turn_timer)
    }

    /// Active emotion and its opacity in `[0, 1]`. Opacity falls linearly
    /// over the final `emotion_fade` fraction of the display time.
    pub fn emotion(&self) -> Option<(Emotion, f32)> {
        let (emotion, remaining) = self.emotion?;
        let total = self.tuning.emotion_ticks.max(1) as f32;
        let fade_span = total * self.tuning.emotion_fade;
        let alpha = if fade_span <= 0.0 || remaining as f32 >= fade_span {
            1.0
        } else {
            remaining as f32 / fade_span
        };
        Some((emotion, alpha.clamp(0.0, 1.0)))
    }

    /// Free to take part in a food assignment.
    pub fn can_seek(&self) -> bool {
        matches!(self.state, State::Walking)
    }

    /// Free to take part in a greeting.
    pub fn can_greet(&self) -> bool {
        matches!(self.state, State::Walking) && self.greet_cooldown == 0
    }

    /// Change hunger by `delta`, clamped to `[0, 100]`.
    pub fn adjust_hunger(&mut self, delta: f32) {
        self.hunger = (self.hunger + delta).clamp(0.0, 100.0);
    }

    fn show(&mut self, emotion: Emotion) {
        self.emotion = Some((emotion, self.tuning.emotion_ticks));
    }

    pub(crate) fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
        self.anim.set_mirrored(facing == Facing::Right);
    }

    fn reset_turn_timer(&mut self, range: TickRange, rng: &mut impl Rng) {
        self.turn_timer = 0;
        self.next_turn = roll(range, rng);
    }

    fn enter(&mut self, state: State) {
        let kind = match state {
            State::Sleeping => AnimationKind::Sleep,
            State::Walking | State::SeekingFood { .. } | State::Jumping { .. } => {
                AnimationKind::Walk
            }
            State::Eating { .. } => AnimationKind::Feed,
            State::Greeting { .. } => AnimationKind::Greet,
        };
        tracing::debug!(
            creature = %self.name,
            from = %self.state.kind(),
            to = %state.kind(),
            "state change"
        );
        if self.state.kind() != state.kind() {
            self.anim.play(kind);
        }
        self.state = state;
    }

    /// Tap on a sleeping creature: start walking in a random direction.
    pub fn wake(&mut self, rng: &mut impl Rng) -> bool {
        if !matches!(self.state, State::Sleeping) {
            return false;
        }
        let facing = if rng.gen_bool(0.5) {
            Facing::Left
        } else {
            Facing::Right
        };
        self.set_facing(facing);
        self.reset_turn_timer(self.tuning.turn_interval, rng);
        self.enter(State::Walking);
        self.show(Emotion::Happy);
        true
    }

    /// Hop straight up, landing back in the current ground state.
    pub fn jump(&mut self) -> bool {
        let resume = match self.state {
            State::Walking => Ground::Walking,
            State::Sleeping => Ground::Sleeping,
            _ => return false,
        };
        self.enter(State::Jumping {
            vy: -self.tuning.jump_impulse,
            resume,
        });
        true
    }

    /// Tap on the creature: wake it if asleep, otherwise jump.
    pub fn tap(&mut self, rng: &mut impl Rng) -> bool {
        if matches!(self.state, State::Sleeping) {
            self.wake(rng)
        } else {
            self.jump()
        }
    }

    /// Head for `food`, which the coordinator has already claimed for us.
    pub fn begin_seeking(&mut self, food: FoodId, food_center_x: f32) -> bool {
        if !self.can_seek() {
            return false;
        }
        self.set_facing(Facing::toward(self.center_x(), food_center_x));
        self.enter(State::SeekingFood { food });
        self.show(Emotion::Surprise);
        true
    }

    /// Start the greeting handshake: face `face` now, leave toward `depart`
    /// when done.
    pub fn begin_greeting(&mut self, face: Facing, depart: Facing) -> bool {
        if !self.can_greet() {
            return false;
        }
        self.set_facing(face);
        self.enter(State::Greeting { depart });
        self.show(Emotion::Love);
        true
    }

    /// The coordinator removed `food`. Drops back to walking if we were
    /// after it.
    pub fn food_removed(&mut self, food: FoodId) {
        if self.state.food() == Some(food) {
            tracing::debug!(creature = %self.name, food_id = %food, "claimed food vanished");
            self.enter(State::Walking);
        }
    }

    /// Undo this tick's horizontal move.
    pub fn rollback_x(&mut self, x: f32) {
        self.x = x.clamp(0.0, self.tuning.max_x);
    }

    /// Shift horizontally, staying in bounds.
    pub fn nudge(&mut self, dx: f32) {
        self.x = (self.x + dx).clamp(0.0, self.tuning.max_x);
    }

    /// Advance one tick.
    pub fn update(&mut self, foods: &mut FoodArena, rng: &mut impl Rng) {
        self.hunger_timer += 1;
        if self.hunger_timer >= self.tuning.hunger_decay_period {
            self.hunger_timer = 0;
            self.adjust_hunger(-self.tuning.hunger_decay);
        }

        if let Some((_, remaining)) = &mut self.emotion {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.emotion = None;
            }
        }
        self.greet_cooldown = self.greet_cooldown.saturating_sub(1);

        match self.state {
            State::Sleeping => {
                self.anim.advance(1);
            }
            State::Walking => self.walk(rng),
            State::SeekingFood { food } => self.seek(food, foods),
            State::Eating { food } => self.eat(food, foods, rng),
            State::Greeting { depart } => {
                self.anim.advance(1);
                if self.anim.finished() {
                    self.set_facing(depart);
                    self.greet_cooldown = GREET_COOLDOWN_TICKS;
                    self.reset_turn_timer(self.tuning.bounce_interval, rng);
                    self.enter(State::Walking);
                }
            }
            State::Jumping { vy, resume } => {
                self.y += vy;
                let vy = vy + self.tuning.gravity;
                if self.y >= self.tuning.ground_y {
                    self.y = self.tuning.ground_y;
                    self.enter(match resume {
                        Ground::Walking => State::Walking,
                        Ground::Sleeping => State::Sleeping,
                    });
                } else {
                    self.state = State::Jumping { vy, resume };
                }
            }
        }

        self.x = self.x.clamp(0.0, self.tuning.max_x);
        self.y = self.y.clamp(0.0, self.tuning.max_y);
    }

    fn walk(&mut self, rng: &mut impl Rng) {
        self.anim.advance(1);

        self.turn_timer += 1;
        if self.turn_timer >= self.next_turn {
            self.set_facing(self.facing.opposite());
            self.reset_turn_timer(self.tuning.turn_interval, rng);
        }

        self.x += self.tuning.speed * self.facing.sign();

        // Edges override the random timer.
        if self.x >= self.tuning.max_x {
            self.x = self.tuning.max_x;
            self.set_facing(Facing::Left);
            self.reset_turn_timer(self.tuning.bounce_interval, rng);
        } else if self.x <= 0.0 {
            self.x = 0.0;
            self.set_facing(Facing::Right);
            self.reset_turn_timer(self.tuning.bounce_interval, rng);
        }
    }

    fn seek(&mut self, food: FoodId, foods: &mut FoodArena) {
        let target = foods
            .live(food)
            .filter(|f| f.claimed_by() == Some(self.id))
            .map(|f| f.center_x());
        let Some(target_x) = target else {
            self.abandon(food, foods);
            return;
        };

        self.anim.advance(1);
        let dx = target_x - self.center_x();
        if dx.abs() <= self.tuning.eat_distance {
            self.enter(State::Eating { food });
            return;
        }
        self.set_facing(Facing::toward(self.center_x(), target_x));
        let step = self.tuning.speed.min(dx.abs());
        self.x += step * self.facing.sign();
    }

    fn eat(&mut self, food: FoodId, foods: &mut FoodArena, rng: &mut impl Rng) {
        let held = foods
            .live(food)
            .is_some_and(|f| f.claimed_by() == Some(self.id));
        if !held {
            self.abandon(food, foods);
            return;
        }

        self.anim.advance(1);
        if !self.anim.finished() {
            return;
        }
        self.adjust_hunger(self.tuning.feed_amount);
        if let Some(item) = foods.get_mut(food) {
            item.mark_consumed();
            item.release(self.id);
        }
        tracing::debug!(creature = %self.name, food_id = %food, hunger = self.hunger, "ate food");
        self.reset_turn_timer(self.tuning.turn_interval, rng);
        self.enter(State::Walking);
        self.show(Emotion::Yum);
    }

    /// Give up on `food`: release the claim if the item still exists and
    /// return to walking.
    fn abandon(&mut self, food: FoodId, foods: &mut FoodArena) {
        if let Some(item) = foods.get_mut(food) {
            item.release(self.id);
        }
        tracing::debug!(creature = %self.name, food_id = %food, "abandoned food");
        self.enter(State::Walking);
    }
}

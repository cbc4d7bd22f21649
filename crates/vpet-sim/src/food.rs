use std::collections::BTreeMap;
use std::fmt;

use vpet_config::FoodSettings;

use crate::creature::CreatureId;
use crate::geom::Rect;

/// Stable handle to a food item. Ids are never reused, so a stale id simply
/// stops resolving once the item is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FoodId(u64);

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "food#{}", self.0)
    }
}

/// A dropped piece of food: falls to the ground, then waits to be eaten or
/// to expire.
#[derive(Debug, Clone)]
pub struct Food {
    id: FoodId,
    x: f32,
    y: f32,
    vy: f32,
    size: f32,
    ground_y: f32,
    gravity: f32,
    grounded: bool,
    age: u32,
    lifetime: u32,
    consumed: bool,
    claim: Option<CreatureId>,
}

impl Food {
    /// Advance one tick. Returns `false` once the item should be removed
    /// (consumed, or older than its lifetime).
    pub fn tick(&mut self) -> bool {
        if self.consumed {
            return false;
        }
        self.age += 1;
        if self.age > self.lifetime {
            return false;
        }
        if !self.grounded {
            self.vy += self.gravity;
            self.y += self.vy;
            if self.y >= self.ground_y {
                self.y = self.ground_y;
                self.vy = 0.0;
                self.grounded = true;
            }
        }
        true
    }

    /// Take the claim for `who`. Succeeds when unclaimed or already held by
    /// `who`.
    pub fn claim(&mut self, who: CreatureId) -> bool {
        match self.claim {
            None => {
                self.claim = Some(who);
                true
            }
            Some(holder) => holder == who,
        }
    }

    /// Drop the claim if `who` holds it.
    pub fn release(&mut self, who: CreatureId) {
        if self.claim == Some(who) {
            self.claim = None;
        }
    }

    pub fn mark_consumed(&mut self) {
        self.consumed = true;
    }

    pub fn id(&self) -> FoodId {
        self.id
    }

    pub fn claimed_by(&self) -> Option<CreatureId> {
        self.claim
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.size / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.size / 2.0
    }
}

/// Owns every live food item, keyed by [`FoodId`].
///
/// Creatures refer to food only by id and must look it up through the arena
/// each tick, so removal can never leave them holding a dangling item.
#[derive(Debug, Clone)]
pub struct FoodArena {
    items: BTreeMap<FoodId, Food>,
    next_id: u64,
    settings: FoodSettings,
    screen_width: f32,
    ground_y: f32,
}

impl FoodArena {
    /// `ground_line` is the y coordinate of the ground (food rests with its
    /// bottom edge on it).
    pub fn new(settings: FoodSettings, screen_width: f32, ground_line: f32) -> Self {
        let ground_y = (ground_line - settings.size as f32).max(0.0);
        Self {
            items: BTreeMap::new(),
            next_id: 0,
            settings,
            screen_width,
            ground_y,
        }
    }

    /// Drop a new item centered on `(x, y)`. Items at or below the ground
    /// line start out grounded.
    pub fn drop_at(&mut self, x: f32, y: f32) -> FoodId {
        let size = self.settings.size as f32;
        let id = FoodId(self.next_id);
        self.next_id += 1;

        let left = (x - size / 2.0).clamp(0.0, (self.screen_width - size).max(0.0));
        let top = (y - size / 2.0).max(0.0);
        let grounded = top >= self.ground_y;
        self.items.insert(
            id,
            Food {
                id,
                x: left,
                y: top.min(self.ground_y),
                vy: 0.0,
                size,
                ground_y: self.ground_y,
                gravity: self.settings.gravity,
                grounded,
                age: 0,
                lifetime: self.settings.lifetime,
                consumed: false,
                claim: None,
            },
        );
        tracing::debug!(food_id = %id, x = left, "food dropped");
        id
    }

    /// Advance every item and remove the ones that are done. Returns the
    /// removed items so their claim holders can be told.
    pub fn tick(&mut self) -> Vec<Food> {
        let expired: Vec<FoodId> = self
            .items
            .values_mut()
            .filter_map(|food| (!food.tick()).then_some(food.id))
            .collect();
        expired
            .into_iter()
            .filter_map(|id| self.items.remove(&id))
            .inspect(|food| {
                tracing::debug!(
                    food_id = %food.id,
                    eaten = food.consumed,
                    claim = ?food.claim,
                    "food removed"
                );
            })
            .collect()
    }

    pub fn get(&self, id: FoodId) -> Option<&Food> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: FoodId) -> Option<&mut Food> {
        self.items.get_mut(&id)
    }

    /// Live, unconsumed item by id.
    pub fn live(&self, id: FoodId) -> Option<&Food> {
        self.items.get(&id).filter(|f| !f.consumed)
    }

    /// Items in ascending id order (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &Food> {
        self.items.values()
    }

    pub fn ids(&self) -> Vec<FoodId> {
        self.items.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Forget every claim, used when the creatures are replaced.
    pub fn clear_claims(&mut self) {
        for food in self.items.values_mut() {
            food.claim = None;
        }
    }

    pub fn ground_y(&self) -> f32 {
        self.ground_y
    }
}

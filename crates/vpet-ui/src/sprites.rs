use std::collections::BTreeMap;

use vpet_sim::{Catalog, Frame, SpriteRef};

/// A sprite in both orientations. Source art faces left.
#[derive(Debug, Clone)]
struct Oriented {
    left: Frame,
    right: Frame,
}

/// Render-side copy of the catalog images with every creature frame
/// pre-mirrored, so flipping a creature never touches pixel data.
#[derive(Debug, Clone)]
pub struct SpriteBank {
    creatures: Vec<BTreeMap<usize, Oriented>>,
    backgrounds: Vec<Frame>,
    food: Frame,
}

impl SpriteBank {
    pub fn new(catalog: &Catalog) -> Self {
        let creatures = catalog
            .creatures()
            .iter()
            .map(|c| {
                c.frames
                    .iter()
                    .map(|(&i, frame)| {
                        (
                            i,
                            Oriented {
                                right: frame.mirrored(),
                                left: frame.clone(),
                            },
                        )
                    })
                    .collect()
            })
            .collect();
        Self {
            creatures,
            backgrounds: catalog
                .backgrounds()
                .iter()
                .map(|b| b.frame.clone())
                .collect(),
            food: catalog.food().clone(),
        }
    }

    /// The frame for `sprite`, falling back to walk frame 0 when the index
    /// is missing.
    pub fn sprite(&self, catalog_index: usize, sprite: SpriteRef) -> Option<&Frame> {
        let frames = self.creatures.get(catalog_index)?;
        let oriented = frames
            .get(&sprite.index)
            .or_else(|| frames.values().next())?;
        Some(if sprite.mirrored {
            &oriented.right
        } else {
            &oriented.left
        })
    }

    pub fn background(&self, index: usize) -> Option<&Frame> {
        self.backgrounds.get(index)
    }

    pub fn food(&self) -> &Frame {
        &self.food
    }
}

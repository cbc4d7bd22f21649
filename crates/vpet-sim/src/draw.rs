use crate::animation::SpriteRef;
use crate::creature::Emotion;
use crate::geom::Rect;
use crate::overlay::OverlayView;

/// One thing to paint, in back-to-front order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Full-scene background image, by index into the catalog backgrounds.
    Background { index: usize },
    Food { rect: Rect },
    Creature {
        catalog_index: usize,
        sprite: SpriteRef,
        x: f32,
        y: f32,
    },
    /// Emotion icon centered on `(x, y)`, drawn with opacity `alpha`.
    Emotion {
        emotion: Emotion,
        x: f32,
        y: f32,
        alpha: f32,
    },
    Overlay(OverlayView),
}

/// The scene for one frame. Coordinates are scene pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawList {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn overlay(&self) -> Option<&OverlayView> {
        self.commands.iter().find_map(|c| match c {
            DrawCommand::Overlay(view) => Some(view),
            _ => None,
        })
    }
}

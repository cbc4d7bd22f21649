use std::time::Instant;

/// Phase of a pointer (mouse or touch) interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Press,
    Move,
    Release,
}

/// A pointer event already mapped into scene pixel coordinates.
///
/// `at_ms` is a monotonic millisecond timestamp used for swipe and
/// double-tap timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    pub at_ms: u64,
}

impl PointerEvent {
    pub fn press(x: f32, y: f32, at_ms: u64) -> Self {
        Self {
            phase: PointerPhase::Press,
            x,
            y,
            at_ms,
        }
    }

    pub fn moved(x: f32, y: f32, at_ms: u64) -> Self {
        Self {
            phase: PointerPhase::Move,
            x,
            y,
            at_ms,
        }
    }

    pub fn release(x: f32, y: f32, at_ms: u64) -> Self {
        Self {
            phase: PointerPhase::Release,
            x,
            y,
            at_ms,
        }
    }
}

/// Keyboard shortcuts that stand in for gestures on terminals without a mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleSelection,
    DropFood,
    NextBackground,
    PrevBackground,
}

#[derive(Debug, Clone)]
pub enum Event {
    Tick { now: Instant },
    Pointer(PointerEvent),
    Action(Action),
    Resize { cols: u16, rows: u16 },
    Quit,
}

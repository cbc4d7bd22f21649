use vpet_config::InputSettings;
use vpet_core::event::{PointerEvent, PointerPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

/// A completed pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Press and release in about the same spot. `double` is set when the
    /// previous tap was close in time.
    Tap { x: f32, y: f32, double: bool },
    /// Fast, mostly horizontal drag.
    Swipe(SwipeDirection),
}

#[derive(Debug, Clone, Copy)]
struct Press {
    x: f32,
    y: f32,
    at_ms: u64,
}

/// Turns raw press/move/release events into taps and swipes.
///
/// A gesture is decided on release: a swipe must cover `swipe_distance`
/// horizontally within `swipe_max_ms` and move further sideways than
/// vertically; a tap must end within `tap_slop` of where it started.
/// Anything else is a drag and produces nothing.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    settings: InputSettings,
    press: Option<Press>,
    last_tap_ms: Option<u64>,
}

impl GestureTracker {
    pub fn new(settings: InputSettings) -> Self {
        Self {
            settings,
            press: None,
            last_tap_ms: None,
        }
    }

    pub fn handle(&mut self, event: &PointerEvent) -> Option<Gesture> {
        match event.phase {
            PointerPhase::Press => {
                self.press = Some(Press {
                    x: event.x,
                    y: event.y,
                    at_ms: event.at_ms,
                });
                None
            }
            PointerPhase::Move => None,
            PointerPhase::Release => {
                let press = self.press.take()?;
                self.classify(press, event)
            }
        }
    }

    /// Forget a half-finished gesture, e.g. when the overlay opens.
    pub fn reset(&mut self) {
        self.press = None;
        self.last_tap_ms = None;
    }

    /// Stop the last tap from pairing with the next one.
    pub fn forget_tap(&mut self) {
        self.last_tap_ms = None;
    }

    fn classify(&mut self, press: Press, release: &PointerEvent) -> Option<Gesture> {
        let dx = release.x - press.x;
        let dy = release.y - press.y;
        let elapsed = release.at_ms.saturating_sub(press.at_ms);

        if elapsed <= self.settings.swipe_max_ms
            && dx.abs() >= self.settings.swipe_distance
            && dx.abs() > dy.abs()
        {
            self.last_tap_ms = None;
            let direction = if dx > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            };
            return Some(Gesture::Swipe(direction));
        }

        if dx.hypot(dy) > self.settings.tap_slop {
            return None;
        }

        let window = self.settings.double_tap_ms;
        let double = self
            .last_tap_ms
            .is_some_and(|prev| release.at_ms.saturating_sub(prev) <= window);
        // A double tap consumes both taps, so a third starts over.
        self.last_tap_ms = if double { None } else { Some(release.at_ms) };
        Some(Gesture::Tap {
            x: press.x,
            y: press.y,
            double,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> GestureTracker {
        GestureTracker::new(InputSettings::default())
    }

    fn gesture(
        t: &mut GestureTracker,
        from: (f32, f32),
        to: (f32, f32),
        start: u64,
        end: u64,
    ) -> Option<Gesture> {
        let mid = ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
        t.handle(&PointerEvent::press(from.0, from.1, start));
        t.handle(&PointerEvent::moved(mid.0, mid.1, (start + end) / 2));
        t.handle(&PointerEvent::release(to.0, to.1, end))
    }

    #[test]
    fn quick_horizontal_drag_is_a_swipe() {
        let mut t = tracker();
        assert_eq!(
            gesture(&mut t, (100.0, 200.0), (250.0, 210.0), 0, 300),
            Some(Gesture::Swipe(SwipeDirection::Right))
        );
        assert_eq!(
            gesture(&mut t, (300.0, 200.0), (100.0, 190.0), 1000, 1200),
            Some(Gesture::Swipe(SwipeDirection::Left))
        );
    }

    #[test]
    fn slow_or_short_or_vertical_drags_are_ignored() {
        let mut t = tracker();
        assert_eq!(gesture(&mut t, (100.0, 200.0), (250.0, 200.0), 0, 900), None);
        assert_eq!(gesture(&mut t, (100.0, 200.0), (150.0, 200.0), 0, 100), None);
        assert_eq!(gesture(&mut t, (100.0, 50.0), (190.0, 250.0), 0, 100), None);
    }

    #[test]
    fn tap_reports_press_position() {
        let mut t = tracker();
        assert_eq!(
            gesture(&mut t, (40.0, 60.0), (43.0, 62.0), 0, 80),
            Some(Gesture::Tap {
                x: 40.0,
                y: 60.0,
                double: false
            })
        );
    }

    #[test]
    fn second_quick_tap_is_double() {
        let mut t = tracker();
        gesture(&mut t, (40.0, 60.0), (40.0, 60.0), 0, 50);
        assert!(matches!(
            gesture(&mut t, (40.0, 60.0), (40.0, 60.0), 200, 250),
            Some(Gesture::Tap { double: true, .. })
        ));
        assert!(matches!(
            gesture(&mut t, (40.0, 60.0), (40.0, 60.0), 300, 350),
            Some(Gesture::Tap { double: false, .. })
        ));
    }

    #[test]
    fn slow_second_tap_is_single() {
        let mut t = tracker();
        gesture(&mut t, (40.0, 60.0), (40.0, 60.0), 0, 50);
        assert!(matches!(
            gesture(&mut t, (40.0, 60.0), (40.0, 60.0), 900, 950),
            Some(Gesture::Tap { double: false, .. })
        ));
    }

    #[test]
    fn forgotten_tap_does_not_pair() {
        let mut t = tracker();
        gesture(&mut t, (40.0, 280.0), (40.0, 280.0), 0, 50);
        t.forget_tap();
        assert!(matches!(
            gesture(&mut t, (400.0, 40.0), (400.0, 40.0), 200, 250),
            Some(Gesture::Tap { double: false, .. })
        ));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut t = tracker();
        assert_eq!(t.handle(&PointerEvent::release(1.0, 1.0, 10)), None);
    }
}

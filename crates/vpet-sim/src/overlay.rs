use std::collections::VecDeque;

use crate::geom::Rect;

/// Number of creatures a selection must contain.
pub const PICK_COUNT: usize = 2;

const GRID_COLUMNS: usize = 3;
const TITLE_HEIGHT: f32 = 36.0;
const BAR_HEIGHT: f32 = 48.0;
const GAP: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayButton {
    PrevPage,
    NextPage,
    PrevBackground,
    NextBackground,
    Cancel,
    Confirm,
}

impl OverlayButton {
    pub const ALL: [OverlayButton; 6] = [
        OverlayButton::PrevPage,
        OverlayButton::NextPage,
        OverlayButton::PrevBackground,
        OverlayButton::NextBackground,
        OverlayButton::Cancel,
        OverlayButton::Confirm,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OverlayButton::PrevPage => "< Page",
            OverlayButton::NextPage => "Page >",
            OverlayButton::PrevBackground => "< BG",
            OverlayButton::NextBackground => "BG >",
            OverlayButton::Cancel => "Cancel",
            OverlayButton::Confirm => "OK",
        }
    }
}

/// Hit areas of the overlay in scene coordinates: a title strip, a grid of
/// `page_size` tiles, and a bottom bar of buttons.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayout {
    pub title: Rect,
    pub tiles: Vec<Rect>,
    pub buttons: Vec<(OverlayButton, Rect)>,
}

impl OverlayLayout {
    pub fn new(width: f32, height: f32, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let columns = GRID_COLUMNS.min(page_size);
        let rows = page_size.div_ceil(columns);

        let grid_top = TITLE_HEIGHT;
        let grid_height = (height - TITLE_HEIGHT - BAR_HEIGHT).max(0.0);
        let tile_w = ((width - GAP) / columns as f32 - GAP).max(1.0);
        let tile_h = ((grid_height - GAP) / rows as f32 - GAP).max(1.0);

        let tiles = (0..page_size)
            .map(|i| {
                let col = (i % columns) as f32;
                let row = (i / columns) as f32;
                Rect::new(
                    GAP + col * (tile_w + GAP),
                    grid_top + GAP + row * (tile_h + GAP),
                    tile_w,
                    tile_h,
                )
            })
            .collect();

        let bar_top = height - BAR_HEIGHT;
        let button_w = width / OverlayButton::ALL.len() as f32;
        let buttons = OverlayButton::ALL
            .iter()
            .enumerate()
            .map(|(i, &b)| {
                let rect = Rect::new(
                    i as f32 * button_w + GAP / 2.0,
                    bar_top + GAP / 2.0,
                    button_w - GAP,
                    BAR_HEIGHT - GAP,
                );
                (b, rect)
            })
            .collect();

        Self {
            title: Rect::new(0.0, 0.0, width, TITLE_HEIGHT),
            tiles,
            buttons,
        }
    }

    pub fn tile_at(&self, x: f32, y: f32) -> Option<usize> {
        self.tiles.iter().position(|r| r.contains(x, y))
    }

    pub fn button_at(&self, x: f32, y: f32) -> Option<OverlayButton> {
        self.buttons
            .iter()
            .find(|(_, r)| r.contains(x, y))
            .map(|(b, _)| *b)
    }
}

/// What a tap on the overlay asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayOutcome {
    Nothing,
    /// Picks or the page changed; redraw only.
    Updated,
    /// Step the scene background by this many entries.
    Background(i8),
    /// Closed without saving.
    Cancelled,
    /// Closed with exactly two catalog indices, in pick order.
    Confirmed([usize; PICK_COUNT]),
}

/// One tile as it should be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct TileView {
    pub rect: Rect,
    pub catalog_index: usize,
    pub name: String,
    /// 1-based pick order when picked.
    pub pick: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonView {
    pub rect: Rect,
    pub button: OverlayButton,
    pub enabled: bool,
}

/// Everything the renderer needs to draw the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub title: String,
    pub title_rect: Rect,
    pub tiles: Vec<TileView>,
    pub buttons: Vec<ButtonView>,
}

/// Modal creature picker.
///
/// While active it owns all input and the scene does not tick. Picks are a
/// FIFO of at most two catalog indices: picking a third drops the oldest,
/// picking a picked tile again unpicks it.
#[derive(Debug, Clone)]
pub struct SelectionOverlay {
    names: Vec<String>,
    page_size: usize,
    page: usize,
    picks: VecDeque<usize>,
    active: bool,
    layout: OverlayLayout,
}

impl SelectionOverlay {
    pub fn new(names: Vec<String>, page_size: usize, width: f32, height: f32) -> Self {
        let page_size = page_size.max(1);
        Self {
            names,
            page_size,
            page: 0,
            picks: VecDeque::with_capacity(PICK_COUNT + 1),
            active: false,
            layout: OverlayLayout::new(width, height, page_size),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Open with `current` pre-picked and the page showing the first of them.
    pub fn open(&mut self, current: [usize; PICK_COUNT]) {
        self.picks.clear();
        for index in current {
            if index < self.names.len() && !self.picks.contains(&index) {
                self.picks.push_back(index);
            }
        }
        self.page = current[0].min(self.names.len().saturating_sub(1)) / self.page_size;
        self.active = true;
        tracing::debug!(page = self.page, "selection overlay opened");
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.names.len().div_ceil(self.page_size).max(1)
    }

    /// Jump to a 0-based page. Out-of-range pages leave the page unchanged.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page >= self.page_count() || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        match self.page.checked_sub(1) {
            Some(p) => self.go_to_page(p),
            None => false,
        }
    }

    pub fn picks(&self) -> Vec<usize> {
        self.picks.iter().copied().collect()
    }

    /// Pick or unpick a catalog entry.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.names.len() {
            return false;
        }
        if let Some(pos) = self.picks.iter().position(|&i| i == index) {
            self.picks.remove(pos);
        } else {
            self.picks.push_back(index);
            while self.picks.len() > PICK_COUNT {
                self.picks.pop_front();
            }
        }
        true
    }

    pub fn can_confirm(&self) -> bool {
        self.picks.len() == PICK_COUNT
    }

    /// Close and return the pair, if exactly two are picked.
    pub fn confirm(&mut self) -> Option<[usize; PICK_COUNT]> {
        if !self.can_confirm() {
            return None;
        }
        self.active = false;
        Some([self.picks[0], self.picks[1]])
    }

    pub fn handle_tap(&mut self, x: f32, y: f32) -> OverlayOutcome {
        if !self.active {
            return OverlayOutcome::Nothing;
        }
        if let Some(slot) = self.layout.tile_at(x, y) {
            let index = self.page * self.page_size + slot;
            return if self.toggle(index) {
                OverlayOutcome::Updated
            } else {
                OverlayOutcome::Nothing
            };
        }
        let Some(button) = self.layout.button_at(x, y) else {
            return OverlayOutcome::Nothing;
        };
        let changed = match button {
            OverlayButton::PrevPage => self.prev_page(),
            OverlayButton::NextPage => self.next_page(),
            OverlayButton::PrevBackground => return OverlayOutcome::Background(-1),
            OverlayButton::NextBackground => return OverlayOutcome::Background(1),
            OverlayButton::Cancel => {
                self.close();
                return OverlayOutcome::Cancelled;
            }
            OverlayButton::Confirm => {
                return match self.confirm() {
                    Some(pair) => OverlayOutcome::Confirmed(pair),
                    None => OverlayOutcome::Nothing,
                };
            }
        };
        if changed {
            OverlayOutcome::Updated
        } else {
            OverlayOutcome::Nothing
        }
    }

    pub fn layout(&self) -> &OverlayLayout {
        &self.layout
    }

    pub fn view(&self) -> OverlayView {
        let start = self.page * self.page_size;
        let tiles = self
            .layout
            .tiles
            .iter()
            .enumerate()
            .filter_map(|(slot, rect)| {
                let index = start + slot;
                let name = self.names.get(index)?;
                Some(TileView {
                    rect: *rect,
                    catalog_index: index,
                    name: name.clone(),
                    pick: self.picks.iter().position(|&i| i == index).map(|p| p + 1),
                })
            })
            .collect();

        let buttons = self
            .layout
            .buttons
            .iter()
            .map(|&(button, rect)| ButtonView {
                rect,
                button,
                enabled: match button {
                    OverlayButton::PrevPage => self.page > 0,
                    OverlayButton::NextPage => self.page + 1 < self.page_count(),
                    OverlayButton::Confirm => self.can_confirm(),
                    _ => true,
                },
            })
            .collect();

        OverlayView {
            title: format!(
                "Pick two  {}/{}  ({}/{})",
                self.page + 1,
                self.page_count(),
                self.picks.len(),
                PICK_COUNT
            ),
            title_rect: self.layout.title,
            tiles,
            buttons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("mon{i}")).collect()
    }

    fn overlay(n: usize) -> SelectionOverlay {
        let mut o = SelectionOverlay::new(names(n), 6, 480.0, 320.0);
        o.open([0, 1]);
        o
    }

    fn tap_button(o: &mut SelectionOverlay, button: OverlayButton) -> OverlayOutcome {
        let rect = o
            .layout()
            .buttons
            .iter()
            .find(|(b, _)| *b == button)
            .map(|(_, r)| *r)
            .unwrap();
        o.handle_tap(rect.center_x(), rect.center_y())
    }

    #[test]
    fn out_of_range_page_is_noop() {
        let mut o = overlay(5);
        assert_eq!(o.page_count(), 1);
        assert!(!o.go_to_page(1));
        assert_eq!(o.page(), 0);
        assert!(!o.next_page());
        assert_eq!(o.page(), 0);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(overlay(7).page_count(), 2);
        assert_eq!(overlay(12).page_count(), 2);
        assert_eq!(overlay(0).page_count(), 1);
    }

    #[test]
    fn third_pick_evicts_oldest() {
        let mut o = overlay(8);
        assert_eq!(o.picks(), vec![0, 1]);
        o.toggle(4);
        assert_eq!(o.picks(), vec![1, 4]);
        o.toggle(1);
        assert_eq!(o.picks(), vec![4]);
        assert!(!o.can_confirm());
        assert_eq!(o.confirm(), None);
        assert!(o.is_active());
    }

    #[test]
    fn confirm_returns_pick_order_and_closes() {
        let mut o = overlay(8);
        o.toggle(3);
        assert_eq!(tap_button(&mut o, OverlayButton::Confirm), OverlayOutcome::Confirmed([1, 3]));
        assert!(!o.is_active());
    }

    #[test]
    fn tile_taps_respect_page() {
        let mut o = overlay(8);
        assert_eq!(tap_button(&mut o, OverlayButton::NextPage), OverlayOutcome::Updated);
        assert_eq!(o.page(), 1);

        let first = o.layout().tiles[0];
        assert_eq!(o.handle_tap(first.center_x(), first.center_y()), OverlayOutcome::Updated);
        assert_eq!(o.picks(), vec![1, 6]);

        // slot 3 on page 1 would be index 9, past the end
        let empty = o.layout().tiles[3];
        assert_eq!(o.handle_tap(empty.center_x(), empty.center_y()), OverlayOutcome::Nothing);
    }

    #[test]
    fn cancel_and_background_buttons() {
        let mut o = overlay(3);
        assert_eq!(
            tap_button(&mut o, OverlayButton::NextBackground),
            OverlayOutcome::Background(1)
        );
        assert_eq!(
            tap_button(&mut o, OverlayButton::PrevBackground),
            OverlayOutcome::Background(-1)
        );
        assert_eq!(tap_button(&mut o, OverlayButton::Cancel), OverlayOutcome::Cancelled);
        assert!(!o.is_active());
        assert_eq!(o.handle_tap(1.0, 1.0), OverlayOutcome::Nothing);
    }

    #[test]
    fn open_shows_page_of_first_pick() {
        let mut o = SelectionOverlay::new(names(14), 6, 480.0, 320.0);
        o.open([13, 2]);
        assert_eq!(o.page(), 2);
        assert_eq!(o.picks(), vec![13, 2]);
    }

    #[test]
    fn view_marks_picks_and_disables_buttons() {
        let o = overlay(5);
        let view = o.view();
        assert_eq!(view.tiles.len(), 5);
        assert_eq!(view.tiles[0].pick, Some(1));
        assert_eq!(view.tiles[1].pick, Some(2));
        assert_eq!(view.tiles[2].pick, None);
        let enabled = |b: OverlayButton| {
            view.buttons
                .iter()
                .find(|v| v.button == b)
                .unwrap()
                .enabled
        };
        assert!(!enabled(OverlayButton::PrevPage));
        assert!(!enabled(OverlayButton::NextPage));
        assert!(enabled(OverlayButton::Confirm));
    }

    #[test]
    fn layout_tiles_do_not_overlap_bar() {
        let layout = OverlayLayout::new(480.0, 320.0, 6);
        let bar_top = layout.buttons[0].1.y;
        for tile in &layout.tiles {
            assert!(tile.bottom() <= bar_top);
            assert!(tile.y >= layout.title.bottom());
        }
    }
}

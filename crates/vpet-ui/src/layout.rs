use ratatui::layout::{Constraint, Direction, Layout, Rect};
use vpet_sim::Rect as SceneRect;

/// Screen regions: a one-line top bar, the scene, and a three-column HUD.
#[derive(Debug, Clone, Copy)]
pub struct PetRects {
    pub top: Rect,
    pub scene: Rect,
    pub hud: Rect,
    pub hud_left: Rect,
    pub hud_mid: Rect,
    pub hud_right: Rect,
}

pub fn pet_layout(area: Rect, hud_height: u16) -> PetRects {
    let hud_height = hud_height.max(4).min(area.height.saturating_sub(2).max(4));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),          // top bar
            Constraint::Min(1),             // scene
            Constraint::Length(hud_height), // hud
        ])
        .split(area);

    let hud = chunks[2];
    let hud_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(30),
            Constraint::Percentage(35),
        ])
        .split(hud);

    PetRects {
        top: chunks[0],
        scene: chunks[1],
        hud,
        hud_left: hud_cols[0],
        hud_mid: hud_cols[1],
        hud_right: hud_cols[2],
    }
}

/// Largest rect inside `area`, centered, whose cells keep the scene's
/// aspect ratio. Terminal cells are assumed twice as tall as wide.
pub fn fit_scene(area: Rect, scene_w: u32, scene_h: u32) -> Rect {
    if area.width == 0 || area.height == 0 || scene_w == 0 || scene_h == 0 {
        return Rect::new(area.x, area.y, 0, 0);
    }
    let want_w_for_h = (area.height as u64 * 2 * scene_w as u64 / scene_h as u64) as u16;
    let (w, h) = if want_w_for_h <= area.width {
        (want_w_for_h.max(1), area.height)
    } else {
        let h = (area.width as u64 * scene_h as u64 / (2 * scene_w as u64)) as u16;
        (area.width, h.max(1))
    };
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

/// Converts between terminal cells and scene pixels for one scene rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneMapping {
    pub area: Rect,
    pub scene_w: u32,
    pub scene_h: u32,
}

impl SceneMapping {
    pub fn new(area: Rect, scene_w: u32, scene_h: u32) -> Self {
        Self {
            area,
            scene_w,
            scene_h,
        }
    }

    /// Scene point at the center of cell `(col, row)`, or `None` outside the
    /// scene.
    pub fn to_scene(&self, col: u16, row: u16) -> Option<(f32, f32)> {
        let a = self.area;
        if a.width == 0 || a.height == 0 {
            return None;
        }
        if col < a.x || row < a.y || col >= a.x + a.width || row >= a.y + a.height {
            return None;
        }
        let x = (col - a.x) as f32 + 0.5;
        let y = (row - a.y) as f32 + 0.5;
        Some((
            x * self.scene_w as f32 / a.width as f32,
            y * self.scene_h as f32 / a.height as f32,
        ))
    }

    /// Cell containing scene point `(x, y)`, clamped into the area.
    pub fn to_cell(&self, x: f32, y: f32) -> (u16, u16) {
        let a = self.area;
        let col = (x * a.width as f32 / self.scene_w.max(1) as f32).floor();
        let row = (y * a.height as f32 / self.scene_h.max(1) as f32).floor();
        let col = (col.max(0.0) as u16).min(a.width.saturating_sub(1));
        let row = (row.max(0.0) as u16).min(a.height.saturating_sub(1));
        (a.x + col, a.y + row)
    }

    /// Cells covering a scene rect, at least one cell in each direction.
    pub fn rect_to_cells(&self, r: SceneRect) -> Rect {
        let (x0, y0) = self.to_cell(r.x, r.y);
        let (x1, y1) = self.to_cell(r.right() - 0.01, r.bottom() - 0.01);
        Rect::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1)
    }
}

use ratatui::{buffer::Buffer, layout::Rect, style::Color};
use vpet_sim::{DrawCommand, DrawList, Frame};

use crate::graphics::GraphicsBackend;
use crate::sprites::SpriteBank;

/// Minimum alpha value (0–255) for a pixel to be considered opaque.
///
/// Pixels below this threshold are skipped when blitting and when drawing
/// cells.
const ALPHA_THRESHOLD: u8 = 128;

/// Scene-resolution RGBA buffer the draw list is composited into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Canvas {
    /// Fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
        if x >= self.width {
            return None;
        }
        sample_pixel(&self.data, self.width, x, y)
    }

    /// Copy the opaque pixels of `frame` with its top-left corner at
    /// `(x, y)`. Parts outside the canvas are clipped.
    pub fn blit(&mut self, frame: &Frame, x: i32, y: i32) {
        for fy in 0..frame.height {
            let cy = y + fy as i32;
            if cy < 0 || cy >= self.height as i32 {
                continue;
            }
            for fx in 0..frame.width {
                let cx = x + fx as i32;
                if cx < 0 || cx >= self.width as i32 {
                    continue;
                }
                let Some(src) = sample_pixel(&frame.data, frame.width, fx, fy) else {
                    continue;
                };
                if src.3 < ALPHA_THRESHOLD {
                    continue;
                }
                let i = ((cy as u32 * self.width + cx as u32) * 4) as usize;
                self.data[i..i + 4].copy_from_slice(&[src.0, src.1, src.2, 255]);
            }
        }
    }
}

/// Paint the pixel layers of `list` (background, food, creatures). Emotions
/// and the overlay are drawn as text cells afterwards.
pub fn compose(list: &DrawList, bank: &SpriteBank) -> Canvas {
    let mut canvas = Canvas::new(list.width, list.height);
    for command in &list.commands {
        match command {
            DrawCommand::Background { index } => {
                if let Some(frame) = bank.background(*index) {
                    canvas.blit(frame, 0, 0);
                }
            }
            DrawCommand::Food { rect } => {
                canvas.blit(bank.food(), rect.x.round() as i32, rect.y.round() as i32);
            }
            DrawCommand::Creature {
                catalog_index,
                sprite,
                x,
                y,
            } => {
                if let Some(frame) = bank.sprite(*catalog_index, *sprite) {
                    canvas.blit(frame, x.round() as i32, y.round() as i32);
                }
            }
            DrawCommand::Emotion { .. } | DrawCommand::Overlay(_) => {}
        }
    }
    canvas
}

/// Render an RGBA image into a terminal rect.
///
/// With [`GraphicsBackend::HalfBlock`] each cell shows two vertically
/// stacked pixels via `▀`; with [`GraphicsBackend::FullBlock`] each cell is
/// one pixel painted as its background color. The image is downsampled
/// from `(src_width × src_height)` to fit `area` using nearest-neighbour
/// scaling. Transparent pixels (alpha < 128) leave the cell untouched.
pub fn render_pixels(
    buf: &mut Buffer,
    area: Rect,
    data: &[u8],
    src_width: u32,
    src_height: u32,
    backend: GraphicsBackend,
) {
    if area.width == 0 || area.height == 0 || src_width == 0 || src_height == 0 {
        return;
    }

    let expected_len = match (src_width as u64)
        .checked_mul(src_height as u64)
        .and_then(|v| v.checked_mul(4))
    {
        Some(v) => v,
        None => return,
    };
    if (data.len() as u64) < expected_len {
        return;
    }

    let cell_w = area.width as u32;
    let cell_h = area.height as u32;
    let rows = backend.rows_per_cell() as u32;
    let pixel_h = cell_h * rows;

    for cy in 0..cell_h {
        for cx in 0..cell_w {
            let px = (cx * src_width) / cell_w;
            let top_py = (cy * rows * src_height) / pixel_h;
            let Some(top) = sample_pixel(data, src_width, px, top_py) else {
                continue;
            };
            let x = area.x + cx as u16;
            let y = area.y + cy as u16;
            let Some(cell) = buf.cell_mut((x, y)) else {
                continue;
            };

            if backend == GraphicsBackend::FullBlock {
                if top.3 >= ALPHA_THRESHOLD {
                    cell.set_char(' ');
                    cell.set_bg(Color::Rgb(top.0, top.1, top.2));
                }
                continue;
            }

            let bot_py = ((cy * 2 + 1) * src_height) / pixel_h;
            let Some(bot) = sample_pixel(data, src_width, px, bot_py) else {
                continue;
            };
            let top_opaque = top.3 >= ALPHA_THRESHOLD;
            let bot_opaque = bot.3 >= ALPHA_THRESHOLD;

            if top_opaque && bot_opaque {
                cell.set_char('▀');
                cell.set_fg(Color::Rgb(top.0, top.1, top.2));
                cell.set_bg(Color::Rgb(bot.0, bot.1, bot.2));
            } else if top_opaque {
                cell.set_char('▀');
                cell.set_fg(Color::Rgb(top.0, top.1, top.2));
                cell.set_bg(Color::Reset);
            } else if bot_opaque {
                cell.set_char('▄');
                cell.set_fg(Color::Rgb(bot.0, bot.1, bot.2));
                cell.set_bg(Color::Reset);
            }
        }
    }
}

/// Read an RGBA pixel from row-major data.
///
/// Returns `None` if the computed index overflows or falls outside `data`.
fn sample_pixel(data: &[u8], width: u32, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
    let idx = (y as usize)
        .checked_mul(width as usize)?
        .checked_add(x as usize)?
        .checked_mul(4)?;
    let r = *data.get(idx)?;
    let g = *data.get(idx + 1)?;
    let b = *data.get(idx + 2)?;
    let a = *data.get(idx + 3)?;
    Some((r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use vpet_sim::assets::{AssetSizes, PLACEHOLDER_BACKGROUND, PLACEHOLDER_CREATURE};
    use vpet_sim::{Catalog, Rect as SceneRect, SpriteRef};

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Frame {
        Frame::solid(w, h, rgba)
    }

    fn placeholder_bank() -> SpriteBank {
        let catalog = Catalog::load(
            Path::new("/nonexistent/vpet-assets"),
            AssetSizes {
                sprite: 4,
                food: 2,
                screen_width: 16,
                screen_height: 8,
            },
        );
        SpriteBank::new(&catalog)
    }

    #[test]
    fn half_block_two_pixels_per_cell() {
        let data = solid(4, 4, [255, 0, 0, 255]).data;
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        render_pixels(&mut buf, area, &data, 4, 4, GraphicsBackend::HalfBlock);

        let cell = buf.cell((0, 0)).unwrap();
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn full_block_paints_background() {
        let data = solid(2, 2, [0, 0, 255, 255]).data;
        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        render_pixels(&mut buf, area, &data, 2, 2, GraphicsBackend::FullBlock);
        assert_eq!(buf.cell((1, 1)).unwrap().bg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn transparent_pixels_leave_cells_alone() {
        let data = solid(4, 4, [0, 255, 0, 0]).data;
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        render_pixels(&mut buf, area, &data, 4, 4, GraphicsBackend::HalfBlock);
        let cell = buf.cell((0, 0)).unwrap();
        assert_ne!(cell.symbol(), "▀");
        assert_ne!(cell.symbol(), "▄");
    }

    #[test]
    fn bottom_only_uses_lower_half() {
        let mut frame = solid(1, 2, [0, 0, 0, 0]);
        frame.data[4..8].copy_from_slice(&[9, 9, 9, 255]);
        let area = Rect::new(0, 0, 1, 1);
        let mut buf = Buffer::empty(area);
        render_pixels(&mut buf, area, &frame.data, 1, 2, GraphicsBackend::HalfBlock);
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "▄");
    }

    #[test]
    fn short_data_or_empty_area_no_panic() {
        let area = Rect::new(0, 0, 6, 4);
        let mut buf = Buffer::empty(area);
        render_pixels(&mut buf, area, &[0; 8], 4, 4, GraphicsBackend::HalfBlock);
        render_pixels(&mut buf, Rect::new(0, 0, 0, 0), &[0; 64], 4, 4, GraphicsBackend::HalfBlock);
    }

    #[test]
    fn blit_clips_at_edges() {
        let mut canvas = Canvas::new(4, 4);
        canvas.blit(&solid(3, 3, [1, 2, 3, 255]), -1, 2);
        assert_eq!(canvas.pixel(0, 2), Some((1, 2, 3, 255)));
        assert_eq!(canvas.pixel(1, 3), Some((1, 2, 3, 255)));
        assert_eq!(canvas.pixel(2, 2), Some((0, 0, 0, 0)));
        assert_eq!(canvas.pixel(0, 1), Some((0, 0, 0, 0)));
    }

    #[test]
    fn compose_layers_in_order() {
        let bank = placeholder_bank();
        let mut list = DrawList::new(16, 8);
        list.push(DrawCommand::Background { index: 0 });
        list.push(DrawCommand::Creature {
            catalog_index: 0,
            sprite: SpriteRef {
                index: 0,
                mirrored: true,
            },
            x: 2.0,
            y: 3.0,
        });
        list.push(DrawCommand::Food {
            rect: SceneRect::new(12.0, 6.0, 2.0, 2.0),
        });
        let canvas = compose(&list, &bank);

        let [r, g, b, a] = PLACEHOLDER_BACKGROUND;
        assert_eq!(canvas.pixel(0, 0), Some((r, g, b, a)));
        let [r, g, b, _] = PLACEHOLDER_CREATURE;
        assert_eq!(canvas.pixel(3, 4), Some((r, g, b, 255)));
        assert_ne!(canvas.pixel(12, 6), Some((r, g, b, 255)));
        assert_ne!(canvas.pixel(12, 6), canvas.pixel(0, 0));
    }

    #[test]
    fn missing_sprite_index_falls_back() {
        let bank = placeholder_bank();
        let sprite = SpriteRef {
            index: 11,
            mirrored: false,
        };
        assert!(bank.sprite(0, sprite).is_some());
        assert!(bank.sprite(9, sprite).is_none());
    }
}

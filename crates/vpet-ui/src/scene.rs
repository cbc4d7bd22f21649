use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;
use vpet_sim::overlay::{ButtonView, OverlayView, TileView};
use vpet_sim::{DrawCommand, DrawList, Emotion};

use crate::canvas::{compose, render_pixels};
use crate::graphics::GraphicsBackend;
use crate::layout::SceneMapping;
use crate::sprites::SpriteBank;

/// Emotions at or below this opacity are drawn dimmed.
const DIM_ALPHA: f32 = 0.5;

fn emotion_color(emotion: Emotion) -> Color {
    match emotion {
        Emotion::Happy => Color::Yellow,
        Emotion::Love => Color::LightRed,
        Emotion::Surprise => Color::White,
        Emotion::Yum => Color::LightGreen,
    }
}

/// Draws one [`DrawList`] into a scene rect: pixels first, then emotion
/// glyphs, then the selection overlay if present.
pub struct SceneWidget<'a> {
    pub list: &'a DrawList,
    pub bank: &'a SpriteBank,
    pub backend: GraphicsBackend,
}

impl Widget for SceneWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let canvas = compose(self.list, self.bank);
        render_pixels(
            buf,
            area,
            &canvas.data,
            canvas.width,
            canvas.height,
            self.backend,
        );

        let mapping = SceneMapping::new(area, self.list.width, self.list.height);
        for command in &self.list.commands {
            match command {
                DrawCommand::Emotion {
                    emotion,
                    x,
                    y,
                    alpha,
                } => {
                    let mut style = Style::default()
                        .fg(emotion_color(*emotion))
                        .add_modifier(Modifier::BOLD);
                    if *alpha <= DIM_ALPHA {
                        style = style.add_modifier(Modifier::DIM);
                    }
                    let (col, row) = mapping.to_cell(*x, *y);
                    if let Some(cell) = buf.cell_mut((col, row)) {
                        cell.set_char(emotion.glyph());
                        cell.set_style(style);
                    }
                }
                DrawCommand::Overlay(view) => render_overlay(buf, &mapping, view),
                _ => {}
            }
        }
    }
}

/// Cut `text` to at most `max` display columns.
pub fn fit_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    if max > 0 {
        out.push('…');
    }
    out
}

fn render_overlay(buf: &mut Buffer, mapping: &SceneMapping, view: &OverlayView) {
    Clear.render(mapping.area, buf);
    Block::default()
        .style(Style::default().bg(Color::Black))
        .render(mapping.area, buf);

    let title = mapping.rect_to_cells(view.title_rect);
    Paragraph::new(Line::from(view.title.as_str()))
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .render(Rect { height: 1, ..title }, buf);

    for tile in &view.tiles {
        render_tile(buf, mapping.rect_to_cells(tile.rect), tile);
    }
    for button in &view.buttons {
        render_button(buf, mapping.rect_to_cells(button.rect), button);
    }
}

fn render_tile(buf: &mut Buffer, area: Rect, tile: &TileView) {
    let (border, label) = match tile.pick {
        Some(n) => (Style::default().fg(Color::LightGreen), format!("#{n}")),
        None => (Style::default().fg(Color::DarkGray), String::new()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(label);
    let inner = block.inner(area);
    block.render(area, buf);
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let name = fit_width(&tile.name, inner.width as usize);
    let text_area = Rect {
        y: inner.y + inner.height / 2,
        height: 1,
        ..inner
    };
    Paragraph::new(Line::from(name))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White))
        .render(text_area, buf);
}

fn render_button(buf: &mut Buffer, area: Rect, button: &ButtonView) {
    let style = if button.enabled {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray).bg(Color::Black)
    };
    let label = fit_width(button.button.label(), area.width as usize);
    let text_area = Rect {
        y: area.y + area.height / 2,
        height: 1,
        ..area
    };
    Block::default().style(style).render(area, buf);
    Paragraph::new(Line::from(label))
        .alignment(Alignment::Center)
        .style(style)
        .render(text_area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use vpet_sim::assets::AssetSizes;
    use vpet_sim::{Catalog, SelectionOverlay};

    fn bank() -> SpriteBank {
        SpriteBank::new(&Catalog::load(
            Path::new("/nonexistent/vpet-assets"),
            AssetSizes {
                sprite: 48,
                food: 12,
                screen_width: 480,
                screen_height: 320,
            },
        ))
    }

    fn render(list: &DrawList) -> Buffer {
        let area = Rect::new(0, 0, 120, 40);
        let mut buf = Buffer::empty(area);
        SceneWidget {
            list,
            bank: &bank(),
            backend: GraphicsBackend::HalfBlock,
        }
        .render(area, &mut buf);
        buf
    }

    fn row_text(buf: &Buffer, row: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, row)).map(|c| c.symbol()).unwrap_or(""))
            .collect()
    }

    #[test]
    fn emotion_glyph_lands_on_mapped_cell() {
        let mut list = DrawList::new(480, 320);
        list.push(DrawCommand::Background { index: 0 });
        list.push(DrawCommand::Emotion {
            emotion: Emotion::Love,
            x: 100.0,
            y: 80.0,
            alpha: 1.0,
        });
        let buf = render(&list);
        let cell = buf.cell((25, 10)).unwrap();
        assert_eq!(cell.symbol(), "♥");
        assert_eq!(cell.fg, Color::LightRed);
        assert!(!cell.modifier.contains(Modifier::DIM));
    }

    #[test]
    fn fading_emotion_is_dimmed() {
        let mut list = DrawList::new(480, 320);
        list.push(DrawCommand::Emotion {
            emotion: Emotion::Yum,
            x: 0.0,
            y: 0.0,
            alpha: 0.2,
        });
        let buf = render(&list);
        assert!(buf.cell((0, 0)).unwrap().modifier.contains(Modifier::DIM));
    }

    #[test]
    fn overlay_shows_title_and_names() {
        let names: Vec<String> = ["Agumon", "Gabumon", "Patamon"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut overlay = SelectionOverlay::new(names, 6, 480.0, 320.0);
        overlay.open([0, 2]);
        let mut list = DrawList::new(480, 320);
        list.push(DrawCommand::Background { index: 0 });
        list.push(DrawCommand::Overlay(overlay.view()));
        let buf = render(&list);

        assert!(row_text(&buf, 0).contains("Pick two"));
        let all: String = (0..40).map(|r| row_text(&buf, r)).collect();
        assert!(all.contains("Agumon"));
        assert!(all.contains("Patamon"));
        assert!(all.contains("#2"));
        assert!(all.contains("OK"));
    }

    #[test]
    fn fit_width_truncates_with_ellipsis() {
        assert_eq!(fit_width("Agumon", 10), "Agumon");
        assert_eq!(fit_width("MetalGreymon", 6), "Metal…");
        assert_eq!(fit_width("ab", 0), "");
    }
}

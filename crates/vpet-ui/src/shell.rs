use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use vpet_core::logging::{LogEntry, LogLevel};
use vpet_sim::{CreatureStatus, Status};

use crate::layout::PetRects;
use crate::scene::fit_width;

const HUNGER_BAR_CELLS: usize = 10;

pub struct ShellView<'a> {
    pub status: &'a Status,
    pub tick_rate: f64,
    pub lagging: bool,
    pub last_log: Option<LogEntry>,
}

/// `[######----] 60` style meter for a hunger value in `[0, 100]`.
pub fn hunger_bar(hunger: f32, cells: usize) -> String {
    let filled = ((hunger.clamp(0.0, 100.0) / 100.0) * cells as f32).round() as usize;
    format!(
        "[{}{}] {:>3.0}",
        "#".repeat(filled),
        "-".repeat(cells - filled.min(cells)),
        hunger
    )
}

fn creature_lines(status: &CreatureStatus, width: usize) -> Vec<Line<'static>> {
    let hunger_color = if status.hunger < 20.0 {
        Color::Red
    } else {
        Color::Green
    };
    vec![
        Line::from(fit_width(&status.name, width)),
        Line::from(Span::styled(
            status.state.to_string(),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            hunger_bar(status.hunger, HUNGER_BAR_CELLS),
            Style::default().fg(hunger_color),
        )),
    ]
}

fn log_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Error => Color::Red,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Info => Color::Green,
        LogLevel::Debug => Color::Cyan,
        LogLevel::Trace => Color::DarkGray,
    }
}

/// Draw the top bar, the HUD, and hand the scene rect to `scene`.
pub fn render_shell(
    f: &mut Frame,
    rects: PetRects,
    view: ShellView<'_>,
    scene: impl FnOnce(&mut Frame, Rect),
) {
    let mut top = vec![Span::raw("VPET")];
    if view.status.paused {
        top.push(Span::styled(" | PAUSED", Style::default().fg(Color::Yellow)));
    }
    if let Some(entry) = &view.last_log {
        let room = (rects.top.width as usize).saturating_sub(20);
        top.push(Span::raw(" | "));
        top.push(Span::styled(
            fit_width(&entry.message, room),
            Style::default().fg(log_color(entry.level)),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(top)), rects.top);

    scene(f, rects.scene);

    for (i, area) in [rects.hud_left, rects.hud_right].into_iter().enumerate() {
        let creature = &view.status.creatures[i];
        let title = if i == 0 { "A" } else { "B" };
        let width = area.width.saturating_sub(2) as usize;
        let panel = Paragraph::new(Text::from(creature_lines(creature, width)))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(panel, area);
    }

    let rate_style = if view.lagging {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let mid = Text::from(vec![
        Line::from(Span::styled(
            format!("{:.1} ticks/s", view.tick_rate),
            rate_style,
        )),
        Line::from(format!("tick {}", view.status.ticks)),
        Line::from(format!(
            "food {}  bg {}",
            view.status.foods, view.status.background
        )),
    ]);
    f.render_widget(
        Paragraph::new(mid).block(Block::default().borders(Borders::ALL).title("WORLD")),
        rects.hud_mid,
    );
}

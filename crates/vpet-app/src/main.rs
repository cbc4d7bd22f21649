use std::env;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode, KeyEvent,
        KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};

use vpet_config::{SelectionStore, Settings};
use vpet_core::{
    bus::EventBus,
    event::{Action, Event, PointerEvent},
    fps::TickCounter,
    logging::{self, LogLevel, RecentLogs},
};
use vpet_sim::{AssetSizes, Catalog, CreatureId, Game};
use vpet_ui::{
    graphics::{Capabilities, GraphicsBackend},
    layout::{fit_scene, pet_layout, SceneMapping},
    scene::SceneWidget,
    shell::{render_shell, ShellView},
    sprites::SpriteBank,
};

const DEFAULT_HEADLESS_TICKS: u64 = 600;
const HUD_HEIGHT: u16 = 5;
const POLL_TIMEOUT: Duration = Duration::from_millis(16);

struct App {
    game: Game,
    bank: SpriteBank,
    bus: EventBus,
    tick_counter: TickCounter,
    logs: RecentLogs,
    backend: GraphicsBackend,
    mapping: Option<SceneMapping>,
    started_at: Instant,
}

impl App {
    fn new(game: Game, logs: RecentLogs, backend: GraphicsBackend) -> Self {
        Self {
            bank: SpriteBank::new(game.catalog()),
            game,
            bus: EventBus::new(),
            tick_counter: TickCounter::default(),
            logs,
            backend,
            mapping: None,
            started_at: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let event = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Event::Quit,
            KeyCode::Char('s') => Event::Action(Action::ToggleSelection),
            KeyCode::Char('f') => Event::Action(Action::DropFood),
            KeyCode::Tab => Event::Action(Action::NextBackground),
            KeyCode::BackTab => Event::Action(Action::PrevBackground),
            _ => return,
        };
        self.bus.publish(event);
    }

    /// Map a left-button mouse event into scene coordinates. Presses outside
    /// the scene are dropped; releases and drags are clamped onto its edge so
    /// a gesture that leaves the scene still completes.
    fn on_mouse(&mut self, mouse: MouseEvent) {
        let Some(mapping) = self.mapping else {
            return;
        };
        let at = self.now_ms();
        let clamped = || {
            let a = mapping.area;
            let col = mouse
                .column
                .clamp(a.x, a.x + a.width.saturating_sub(1));
            let row = mouse.row.clamp(a.y, a.y + a.height.saturating_sub(1));
            mapping.to_scene(col, row)
        };
        let pointer = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => mapping
                .to_scene(mouse.column, mouse.row)
                .map(|(x, y)| PointerEvent::press(x, y, at)),
            MouseEventKind::Drag(MouseButton::Left) => {
                clamped().map(|(x, y)| PointerEvent::moved(x, y, at))
            }
            MouseEventKind::Up(MouseButton::Left) => {
                clamped().map(|(x, y)| PointerEvent::release(x, y, at))
            }
            _ => None,
        };
        if let Some(pointer) = pointer {
            self.bus.publish(Event::Pointer(pointer));
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// `VPET_SEED` makes a run reproducible; otherwise seed from the OS.
fn seeded_rng() -> StdRng {
    match env::var("VPET_SEED").ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(seed) => {
            tracing::info!(seed, "using fixed seed");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}

fn headless_ticks() -> u64 {
    env::var("VPET_HEADLESS_TICKS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_HEADLESS_TICKS)
}

fn main() -> Result<()> {
    let logs = logging::init();
    tracing::info!("vpet starting up");

    let settings = Settings::load();
    let catalog = Catalog::load(&settings.paths.assets, AssetSizes::from_settings(&settings));
    let store = SelectionStore::new(settings.selection_path());
    let caps = Capabilities::detect();
    tracing::info!(
        interactive = caps.interactive,
        backend = ?caps.backend,
        "output capabilities"
    );
    let game = Game::new(settings, catalog, store, seeded_rng());

    let res = if caps.interactive {
        let mut terminal = setup_terminal().context("failed to set up terminal")?;
        let res = run(&mut terminal, App::new(game, logs, caps.backend));
        restore_terminal(terminal)?;
        res
    } else {
        run_headless(game, headless_ticks());
        Ok(())
    };
    tracing::info!("vpet shutting down");
    res
}

/// Run the simulation without a terminal: wake both creatures, feed them
/// now and then, and log where everything ended up.
fn run_headless(mut game: Game, ticks: u64) {
    tracing::info!(ticks, "running headless");
    let mut at_ms = 0;
    for id in CreatureId::BOTH {
        let rect = game.world().creature(id).rect();
        let (x, y) = (rect.center_x(), rect.center_y());
        game.handle(&Event::Pointer(PointerEvent::press(x, y, at_ms)));
        game.handle(&Event::Pointer(PointerEvent::release(x, y, at_ms + 10)));
        at_ms += 1000;
    }

    for i in 0..ticks {
        if i % 100 == 50 {
            game.handle_action(Action::DropFood);
        }
        game.tick();
    }

    let status = game.status();
    for (id, creature) in CreatureId::BOTH.iter().zip(game.world().creatures()) {
        tracing::info!(
            creature = %creature.name(),
            slot = %id,
            x = creature.x(),
            state = %creature.state_kind(),
            hunger = creature.hunger(),
            "final state"
        );
    }
    tracing::info!(
        ticks = status.ticks,
        foods = status.foods,
        "headless run finished"
    );
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, mut app: App) -> Result<()> {
    let tick_hz = app.game.world().settings().screen.tick_hz.max(1);
    let tick_interval = Duration::from_millis(1000 / u64::from(tick_hz));
    let mut last_tick = Instant::now();

    loop {
        // ── Render ──
        let status = app.game.status();
        let list = app.game.draw_list();
        let mut mapping = None;
        terminal.draw(|f| {
            let rects = pet_layout(f.area(), HUD_HEIGHT);
            let scene_area = fit_scene(rects.scene, list.width, list.height);
            mapping = Some(SceneMapping::new(scene_area, list.width, list.height));
            let view = ShellView {
                status: &status,
                tick_rate: app.tick_counter.rate(),
                lagging: app.tick_counter.is_lagging(tick_hz),
                last_log: app.logs.latest(LogLevel::Info),
            };
            render_shell(f, rects, view, |f, _| {
                f.render_widget(
                    SceneWidget {
                        list: &list,
                        bank: &app.bank,
                        backend: app.backend,
                    },
                    scene_area,
                );
            });
        })?;
        app.mapping = mapping;

        // ── Poll → Publish ──
        if event::poll(POLL_TIMEOUT)? {
            match event::read()? {
                CEvent::Key(key) => app.on_key(key),
                CEvent::Mouse(mouse) => app.on_mouse(mouse),
                CEvent::Resize(cols, rows) => app.bus.publish(Event::Resize { cols, rows }),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_interval {
            last_tick = Instant::now();
            app.tick_counter.record(last_tick);
            app.bus.publish(Event::Tick { now: last_tick });
        }

        // ── Drain → Game ──
        for ev in app.bus.drain() {
            if !app.game.handle(&ev) {
                return Ok(());
            }
        }
    }
}

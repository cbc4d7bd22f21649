use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Settings schema loaded from `vpet.toml`.
///
/// Every section is optional; absent keys take the defaults below, which
/// reproduce the classic 480×320 screen running at 10 ticks per second.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub screen: ScreenSettings,
    pub creature: CreatureSettings,
    pub food: FoodSettings,
    pub input: InputSettings,
    pub ui: UiSettings,
    pub paths: PathSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenSettings {
    pub width: u32,
    pub height: u32,
    /// Distance from the bottom edge to the invisible ground line.
    pub ground_margin: u32,
    pub tick_hz: u32,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            width: 480,
            height: 320,
            ground_margin: 30,
            tick_hz: 10,
        }
    }
}

/// Inclusive range of ticks for randomized timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TickRange {
    pub min: u32,
    pub max: u32,
}

impl TickRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreatureSettings {
    /// Horizontal speed in pixels per tick.
    pub speed: f32,
    pub sprite_size: u32,
    /// Ticks each animation frame is held.
    pub frame_delay: u32,
    /// Delay before a spontaneous turn while walking.
    pub turn_interval: TickRange,
    /// Shorter delay re-rolled after bouncing off an edge or a greeting.
    pub bounce_interval: TickRange,
    pub min_separation: f32,
    pub collision_nudge: f32,
    pub jump_impulse: f32,
    pub gravity: f32,
    pub hunger_start: f32,
    pub hunger_decay: f32,
    pub hunger_decay_period: u32,
    pub feed_amount: f32,
    pub emotion_ticks: u32,
    /// Fraction of the emotion display spent fading out.
    pub emotion_fade: f32,
}

impl Default for CreatureSettings {
    fn default() -> Self {
        Self {
            speed: 2.0,
            sprite_size: 48,
            frame_delay: 5,
            turn_interval: TickRange::new(60, 300),
            bounce_interval: TickRange::new(30, 120),
            min_separation: 100.0,
            collision_nudge: 5.0,
            jump_impulse: 12.0,
            gravity: 2.0,
            hunger_start: 50.0,
            hunger_decay: 1.0,
            hunger_decay_period: 50,
            feed_amount: 20.0,
            emotion_ticks: 20,
            emotion_fade: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FoodSettings {
    pub lifetime: u32,
    pub gravity: f32,
    pub size: u32,
    pub engagement_radius: f32,
    pub eat_distance: f32,
}

impl Default for FoodSettings {
    fn default() -> Self {
        Self {
            lifetime: 300,
            gravity: 1.0,
            size: 12,
            engagement_radius: 150.0,
            eat_distance: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputSettings {
    pub swipe_distance: f32,
    pub swipe_max_ms: u64,
    pub tap_slop: f32,
    pub double_tap_ms: u64,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            swipe_distance: 80.0,
            swipe_max_ms: 600,
            tap_slop: 10.0,
            double_tap_ms: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiSettings {
    pub page_size: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { page_size: 6 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathSettings {
    pub assets: PathBuf,
    pub selection_file: Option<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("assets"),
            selection_file: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings TOML.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let settings: Self = toml::from_str(input).context("failed to parse settings TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("invalid settings at {}", path.display()))
    }

    /// Load from the default location, falling back to defaults.
    ///
    /// A missing file is normal; an unreadable or invalid one is logged.
    /// `VPET_ASSETS` and `VPET_SELECTION_FILE` override the `[paths]` section.
    pub fn load() -> Self {
        let path = config_path();
        let mut settings = if path.exists() {
            match Self::from_path(&path) {
                Ok(s) => {
                    tracing::info!(path = %path.display(), "loaded settings");
                    s
                }
                Err(err) => {
                    tracing::warn!(error = %format!("{err:#}"), "using default settings");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        settings.apply_env_overrides();
        settings
    }

    fn apply_env_overrides(&mut self) {
        if let Some(dir) = std::env::var_os("VPET_ASSETS") {
            self.paths.assets = PathBuf::from(dir);
        }
        if let Some(file) = std::env::var_os("VPET_SELECTION_FILE") {
            self.paths.selection_file = Some(PathBuf::from(file));
        }
    }

    /// Where the selection record lives: `[paths] selection_file` or the
    /// platform data directory.
    pub fn selection_path(&self) -> PathBuf {
        if let Some(p) = &self.paths.selection_file {
            return p.clone();
        }
        dirs::data_dir()
            .map(|d| d.join("vpet").join("selection.json"))
            .unwrap_or_else(|| PathBuf::from("selection.json"))
    }

    /// Y coordinate of a sprite's top edge when standing on the ground.
    pub fn ground_y(&self, sprite_height: u32) -> f32 {
        self.screen
            .height
            .saturating_sub(self.screen.ground_margin)
            .saturating_sub(sprite_height) as f32
    }

    pub fn validate(&self) -> Result<()> {
        let screen = &self.screen;
        if screen.width == 0 || screen.height == 0 {
            bail!("screen.width and screen.height must be positive");
        }
        if screen.tick_hz == 0 {
            bail!("screen.tick_hz must be positive");
        }

        let c = &self.creature;
        if c.sprite_size == 0 {
            bail!("creature.sprite_size must be positive");
        }
        if c.sprite_size + screen.ground_margin > screen.height || c.sprite_size > screen.width {
            bail!(
                "creature.sprite_size {} does not fit a {}x{} screen with ground_margin {}",
                c.sprite_size,
                screen.width,
                screen.height,
                screen.ground_margin
            );
        }
        if c.speed <= 0.0 {
            bail!("creature.speed must be positive");
        }
        if c.frame_delay == 0 || c.hunger_decay_period == 0 {
            bail!("creature.frame_delay and creature.hunger_decay_period must be positive");
        }
        validate_range("creature.turn_interval", c.turn_interval)?;
        validate_range("creature.bounce_interval", c.bounce_interval)?;
        if !(0.0..=1.0).contains(&c.emotion_fade) {
            bail!("creature.emotion_fade must be within [0, 1]");
        }
        if c.min_separation + c.sprite_size as f32 > screen.width as f32 {
            bail!("creature.min_separation leaves no room for two creatures");
        }

        let f = &self.food;
        if f.lifetime == 0 || f.size == 0 {
            bail!("food.lifetime and food.size must be positive");
        }
        if f.engagement_radius < 0.0 || f.eat_distance < 0.0 {
            bail!("food distances must not be negative");
        }

        if self.ui.page_size == 0 {
            bail!("ui.page_size must be at least 1");
        }
        Ok(())
    }
}

fn validate_range(field: &str, range: TickRange) -> Result<()> {
    if range.min == 0 || range.min > range.max {
        bail!(
            "{field} must satisfy 0 < min <= max (got {}..={})",
            range.min,
            range.max
        );
    }
    Ok(())
}

/// Settings file location: `VPET_CONFIG` or `<config dir>/vpet/vpet.toml`.
pub fn config_path() -> PathBuf {
    if let Some(p) = std::env::var_os("VPET_CONFIG") {
        return PathBuf::from(p);
    }
    dirs::config_dir()
        .map(|d| d.join("vpet").join("vpet.toml"))
        .unwrap_or_else(|| PathBuf::from("vpet.toml"))
}

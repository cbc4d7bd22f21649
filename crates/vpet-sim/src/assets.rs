use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::imageops::FilterType;
use rand::seq::index;
use rand::Rng;

use crate::animation::{AnimationSet, MAX_FRAME_INDEX, WALK_FRAMES};

pub const PLACEHOLDER_CREATURE: [u8; 4] = [255, 165, 0, 255];
pub const PLACEHOLDER_BACKGROUND: [u8; 4] = [135, 206, 235, 255];
pub const PLACEHOLDER_FOOD: [u8; 4] = [200, 60, 40, 255];

const BACKGROUND_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A decoded image: raw RGBA pixels at a known resolution.
///
/// Stored as a flat `Vec<u8>` in row-major RGBA order (4 bytes per pixel)
/// so the renderer doesn't need to depend on the `image` crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    /// A flat square or rectangle of one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        Self {
            data,
            width,
            height,
        }
    }

    /// RGBA at `(x, y)`, or transparent outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Horizontally flipped copy.
    pub fn mirrored(&self) -> Frame {
        let row_len = (self.width * 4) as usize;
        let mut data = Vec::with_capacity(self.data.len());
        for row in self.data.chunks_exact(row_len.max(1)) {
            for px in row.chunks_exact(4).rev() {
                data.extend_from_slice(px);
            }
        }
        Frame {
            data,
            width: self.width,
            height: self.height,
        }
    }
}

/// Decode an image file and scale it to `width`×`height`.
pub fn load_frame(path: &Path, width: u32, height: u32) -> Result<Frame> {
    let rgba = image::open(path)
        .with_context(|| format!("failed to decode {}", path.display()))?
        .to_rgba8();
    let img = if rgba.width() == width && rgba.height() == height {
        rgba
    } else {
        image::imageops::resize(&rgba, width, height, FilterType::Nearest)
    };
    Ok(Frame {
        data: img.into_raw(),
        width,
        height,
    })
}

/// The frames one creature folder provides, keyed by sprite index.
#[derive(Debug, Clone)]
pub struct CreatureSprites {
    /// Folder name, e.g. `Agumon_dmc`. This is what the selection record
    /// stores.
    pub id: String,
    /// Name shown on screen, e.g. `Agumon`.
    pub name: String,
    pub frames: BTreeMap<usize, Frame>,
    pub placeholder: bool,
}

impl CreatureSprites {
    fn placeholder(name: String, size: u32) -> Self {
        let square = Frame::solid(size, size, PLACEHOLDER_CREATURE);
        Self {
            id: name.clone(),
            name,
            frames: WALK_FRAMES.iter().map(|&i| (i, square.clone())).collect(),
            placeholder: true,
        }
    }

    pub fn available(&self) -> BTreeSet<usize> {
        self.frames.keys().copied().collect()
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(&index)
    }

    pub fn animations(&self, hold: u32) -> AnimationSet {
        AnimationSet::for_frames(&self.available(), hold)
    }
}

#[derive(Debug, Clone)]
pub struct Background {
    pub name: String,
    pub frame: Frame,
}

/// Sizes the catalog scales images to.
#[derive(Debug, Clone, Copy)]
pub struct AssetSizes {
    pub sprite: u32,
    pub food: u32,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl AssetSizes {
    pub fn from_settings(settings: &vpet_config::Settings) -> Self {
        Self {
            sprite: settings.creature.sprite_size,
            food: settings.food.size,
            screen_width: settings.screen.width,
            screen_height: settings.screen.height,
        }
    }
}

/// Everything loaded from the assets directory.
///
/// Layout:
///
/// ```text
/// assets/
///   sprites/<name>/0.png .. 14.png
///   backgrounds/*.png|jpg
///   food.png
/// ```
///
/// Loading never fails. Anything missing or broken is logged and replaced by
/// a flat placeholder so there are always at least two creatures and one
/// background.
#[derive(Debug, Clone)]
pub struct Catalog {
    creatures: Vec<CreatureSprites>,
    backgrounds: Vec<Background>,
    food: Frame,
}

impl Catalog {
    pub fn load(root: &Path, sizes: AssetSizes) -> Self {
        let mut creatures = load_creatures(&root.join("sprites"), sizes.sprite);
        let found = creatures.len();
        let mut n = 1;
        while creatures.len() < 2 {
            creatures.push(CreatureSprites::placeholder(format!("Placeholder {n}"), sizes.sprite));
            n += 1;
        }
        if found < 2 {
            tracing::warn!(
                found,
                dir = %root.display(),
                "not enough creatures, using placeholders"
            );
        }

        let mut backgrounds = load_backgrounds(
            &root.join("backgrounds"),
            sizes.screen_width,
            sizes.screen_height,
        );
        if backgrounds.is_empty() {
            tracing::warn!(dir = %root.display(), "no backgrounds, using flat sky");
            backgrounds.push(Background {
                name: "sky".into(),
                frame: Frame::solid(
                    sizes.screen_width,
                    sizes.screen_height,
                    PLACEHOLDER_BACKGROUND,
                ),
            });
        }

        let food_path = root.join("food.png");
        let food = match load_frame(&food_path, sizes.food, sizes.food) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("food image unavailable: {e:#}");
                Frame::solid(sizes.food, sizes.food, PLACEHOLDER_FOOD)
            }
        };

        tracing::info!(
            creatures = creatures.len(),
            backgrounds = backgrounds.len(),
            "asset catalog loaded"
        );
        Self {
            creatures,
            backgrounds,
            food,
        }
    }

    pub fn creatures(&self) -> &[CreatureSprites] {
        &self.creatures
    }

    pub fn creature(&self, index: usize) -> Option<&CreatureSprites> {
        self.creatures.get(index)
    }

    pub fn names(&self) -> Vec<String> {
        self.creatures.iter().map(|c| c.name.clone()).collect()
    }

    /// Folder names, in catalog order.
    pub fn ids(&self) -> Vec<String> {
        self.creatures.iter().map(|c| c.id.clone()).collect()
    }

    /// Look a creature up by folder name, falling back to its display name.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.creatures
            .iter()
            .position(|c| c.id == id)
            .or_else(|| self.creatures.iter().position(|c| c.name == id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    /// Two distinct catalog indices chosen uniformly.
    pub fn random_pair(&self, rng: &mut impl Rng) -> [usize; 2] {
        let picked = index::sample(rng, self.creatures.len(), 2);
        [picked.index(0), picked.index(1)]
    }

    pub fn backgrounds(&self) -> &[Background] {
        &self.backgrounds
    }

    pub fn food(&self) -> &Frame {
        &self.food
    }
}

/// Display name for a sprite folder: the `_dmc` variant suffix is dropped.
fn display_name(folder: &str) -> &str {
    folder.strip_suffix("_dmc").unwrap_or(folder)
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok().map(|e| e.path())).collect(),
        Err(e) => {
            tracing::warn!(dir = %dir.display(), "cannot read asset directory: {e}");
            return Vec::new();
        }
    };
    entries.sort();
    entries
}

fn load_creatures(dir: &Path, size: u32) -> Vec<CreatureSprites> {
    let mut creatures: Vec<CreatureSprites> = Vec::new();
    for path in sorted_entries(dir) {
        if !path.is_dir() {
            continue;
        }
        let Some(folder) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let name = display_name(folder).to_string();
        if creatures.iter().any(|c| c.name == name) {
            tracing::warn!(creature = %name, "duplicate creature folder skipped");
            continue;
        }

        let mut frames = BTreeMap::new();
        for i in 0..=MAX_FRAME_INDEX {
            let file = path.join(format!("{i}.png"));
            if !file.exists() {
                continue;
            }
            match load_frame(&file, size, size) {
                Ok(frame) => {
                    frames.insert(i, frame);
                }
                Err(e) => tracing::warn!(creature = %name, "{e:#}"),
            }
        }

        if !WALK_FRAMES.iter().all(|i| frames.contains_key(i)) {
            tracing::warn!(creature = %name, "missing walk frames, excluded from catalog");
            continue;
        }
        tracing::debug!(creature = %name, frames = frames.len(), "creature loaded");
        creatures.push(CreatureSprites {
            id: folder.to_string(),
            name,
            frames,
            placeholder: false,
        });
    }
    creatures.sort_by(|a, b| a.name.cmp(&b.name));
    creatures
}

fn load_backgrounds(dir: &Path, width: u32, height: u32) -> Vec<Background> {
    sorted_entries(dir)
        .into_iter()
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| BACKGROUND_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        })
        .filter_map(|path| {
            let name = path.file_stem()?.to_string_lossy().into_owned();
            match load_frame(&path, width, height) {
                Ok(frame) => Some(Background { name, frame }),
                Err(e) => {
                    tracing::warn!("{e:#}");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SIZES: AssetSizes = AssetSizes {
        sprite: 8,
        food: 4,
        screen_width: 16,
        screen_height: 12,
    };

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vpet-assets-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path, w: u32, h: u32, rgba: [u8; 4]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        image::RgbaImage::from_pixel(w, h, image::Rgba(rgba))
            .save(path)
            .unwrap();
    }

    fn creature(root: &Path, folder: &str, frames: &[usize]) {
        for i in frames {
            let path = root.join("sprites").join(folder).join(format!("{i}.png"));
            write_png(&path, 4, 4, [10, 20, 30, 255]);
        }
    }

    #[test]
    fn empty_dir_gives_placeholders() {
        let root = temp_dir("empty");
        let catalog = Catalog::load(&root, SIZES);
        assert_eq!(catalog.creatures().len(), 2);
        assert!(catalog.creatures().iter().all(|c| c.placeholder));
        assert_eq!(catalog.creatures()[0].frame(0).unwrap().pixel(0, 0), PLACEHOLDER_CREATURE);
        assert_eq!(catalog.backgrounds().len(), 1);
        assert_eq!(catalog.backgrounds()[0].frame.pixel(3, 3), PLACEHOLDER_BACKGROUND);
        assert_eq!(catalog.food().width, 4);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn scans_sorted_strips_suffix_and_skips_incomplete() {
        let root = temp_dir("scan");
        creature(&root, "Gabumon_dmc", &[0, 1, 2]);
        creature(&root, "Agumon", &[0, 1, 5, 6, 11, 12]);
        creature(&root, "Broken", &[0, 2]);
        let catalog = Catalog::load(&root, SIZES);

        assert_eq!(catalog.names(), vec!["Agumon", "Gabumon"]);
        assert_eq!(catalog.ids(), vec!["Agumon", "Gabumon_dmc"]);
        assert_eq!(catalog.index_of("Gabumon_dmc"), Some(1));
        assert_eq!(catalog.index_of("Gabumon"), Some(1));
        assert!(!catalog.contains("Broken"));
        let agumon = catalog.creature(0).unwrap();
        assert_eq!(agumon.available(), [0, 1, 5, 6, 11, 12].into_iter().collect());
        assert_eq!(agumon.frame(0).unwrap().width, 8);
        assert_eq!(agumon.frame(0).unwrap().pixel(7, 7), [10, 20, 30, 255]);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn one_creature_is_padded_with_placeholder() {
        let root = temp_dir("single");
        creature(&root, "Agumon", &[0, 1]);
        let catalog = Catalog::load(&root, SIZES);
        assert_eq!(catalog.names(), vec!["Agumon", "Placeholder 1"]);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn backgrounds_and_food_load_and_scale() {
        let root = temp_dir("bg");
        write_png(&root.join("backgrounds/b.png"), 2, 2, [1, 2, 3, 255]);
        write_png(&root.join("backgrounds/a.png"), 2, 2, [4, 5, 6, 255]);
        fs::write(root.join("backgrounds/notes.txt"), "x").unwrap();
        write_png(&root.join("food.png"), 2, 2, [9, 9, 9, 255]);
        let catalog = Catalog::load(&root, SIZES);

        let names: Vec<&str> = catalog.backgrounds().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(catalog.backgrounds()[0].frame.width, 16);
        assert_eq!(catalog.food().pixel(3, 3), [9, 9, 9, 255]);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn corrupt_background_is_skipped() {
        let root = temp_dir("corrupt");
        fs::create_dir_all(root.join("backgrounds")).unwrap();
        fs::write(root.join("backgrounds/bad.png"), b"not a png").unwrap();
        let catalog = Catalog::load(&root, SIZES);
        assert_eq!(catalog.backgrounds()[0].name, "sky");
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn mirrored_frame_flips_columns() {
        let mut frame = Frame::solid(2, 1, [0, 0, 0, 255]);
        frame.data[0..4].copy_from_slice(&[255, 0, 0, 255]);
        let flipped = frame.mirrored();
        assert_eq!(flipped.pixel(1, 0), [255, 0, 0, 255]);
        assert_eq!(flipped.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(flipped.mirrored(), frame);
    }

    #[test]
    fn random_pair_is_distinct() {
        let root = temp_dir("pair");
        let catalog = Catalog::load(&root, SIZES);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let [a, b] = catalog.random_pair(&mut rng);
            assert_ne!(a, b);
        }
        let _ = fs::remove_dir_all(&root);
    }
}

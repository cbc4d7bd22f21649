use std::cell::OnceCell;
use std::collections::BTreeSet;

/// Sprite indices for the walk pair. A creature without both is unusable.
pub const WALK_FRAMES: [usize; 2] = [0, 1];
pub const GREET_FRAMES: [usize; 2] = [2, 0];
pub const FEED_FRAMES: [usize; 2] = [5, 6];
pub const SLEEP_FRAMES: [usize; 2] = [11, 12];

/// Highest sprite index a creature folder may provide.
pub const MAX_FRAME_INDEX: usize = 14;

/// The behaviors that have their own animation.
///
/// Variant order is the index into [`AnimationSet`]'s sequence table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    Walk = 0,
    Greet = 1,
    Sleep = 2,
    Feed = 3,
}

impl AnimationKind {
    pub const COUNT: usize = 4;

    pub const ALL: [AnimationKind; Self::COUNT] = [
        AnimationKind::Walk,
        AnimationKind::Greet,
        AnimationKind::Sleep,
        AnimationKind::Feed,
    ];
}

/// One sprite to draw: an index into the creature's frames plus whether it
/// is drawn horizontally mirrored.
///
/// Source sprites face left, so a right-facing creature draws mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteRef {
    pub index: usize,
    pub mirrored: bool,
}

/// An ordered run of sprite indices.
///
/// Looping sequences cycle forever; one-shot sequences report
/// [`finished`](Cursor::finished) once every frame has been shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    frames: Vec<SpriteRef>,
    looping: bool,
}

impl Sequence {
    pub fn looping(indices: &[usize]) -> Self {
        Self::build(indices, true)
    }

    pub fn once(indices: &[usize]) -> Self {
        Self::build(indices, false)
    }

    fn build(indices: &[usize], looping: bool) -> Self {
        let frames = indices
            .iter()
            .map(|&index| SpriteRef {
                index,
                mirrored: false,
            })
            .collect();
        Self { frames, looping }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[SpriteRef] {
        &self.frames
    }

    /// A new sequence with every frame's mirror flag inverted.
    fn mirrored(&self) -> Sequence {
        Sequence {
            frames: self
                .frames
                .iter()
                .map(|f| SpriteRef {
                    index: f.index,
                    mirrored: !f.mirrored,
                })
                .collect(),
            looping: self.looping,
        }
    }
}

/// Playback position inside the active sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    step: usize,
    timer: u32,
    hold: u32,
}

impl Cursor {
    fn new(hold: u32) -> Self {
        Self {
            step: 0,
            timer: 0,
            hold: hold.max(1),
        }
    }

    /// Number of frame advances since the sequence started.
    pub fn steps(&self) -> usize {
        self.step
    }

    /// True once a one-shot sequence has advanced past its last frame.
    pub fn finished(&self, seq: &Sequence) -> bool {
        !seq.looping && self.step >= seq.len()
    }

    fn index_in(&self, seq: &Sequence) -> usize {
        if seq.is_empty() {
            return 0;
        }
        if seq.looping {
            self.step % seq.len()
        } else {
            self.step.min(seq.len() - 1)
        }
    }
}

/// All of a creature's animations plus a single facing flag.
///
/// The original sequences are never modified. Mirrored variants are built
/// on first use and cached, so flipping back and forth always returns the
/// same frames.
#[derive(Debug, Clone)]
pub struct AnimationSet {
    originals: [Sequence; AnimationKind::COUNT],
    mirrored_cache: [OnceCell<Sequence>; AnimationKind::COUNT],
    mirrored: bool,
    active: AnimationKind,
    cursor: Cursor,
    hold: u32,
}

impl AnimationSet {
    /// Build the standard set for a creature whose folder provides the
    /// sprite indices in `available`.
    ///
    /// Greet, feed and sleep pairs that are incomplete fall back to the walk
    /// pair. Greeting plays its pair twice; feeding plays a five-step chew
    /// (open, close, open, close, open).
    pub fn for_frames(available: &BTreeSet<usize>, hold: u32) -> Self {
        let pair = |wanted: [usize; 2]| {
            if wanted.iter().all(|i| available.contains(i)) {
                wanted
            } else {
                WALK_FRAMES
            }
        };
        let [g0, g1] = pair(GREET_FRAMES);
        let [f0, f1] = pair(FEED_FRAMES);

        Self::from_sequences(
            [
                Sequence::looping(&WALK_FRAMES),
                Sequence::once(&[g0, g1, g0, g1]),
                Sequence::looping(&pair(SLEEP_FRAMES)),
                Sequence::once(&[f0, f1, f0, f1, f0]),
            ],
            hold,
        )
    }

    pub fn from_sequences(originals: [Sequence; AnimationKind::COUNT], hold: u32) -> Self {
        Self {
            originals,
            mirrored_cache: Default::default(),
            mirrored: false,
            active: AnimationKind::Walk,
            cursor: Cursor::new(hold),
            hold,
        }
    }

    /// Switch to `kind` from its first frame. Replaying the active kind
    /// also restarts it.
    pub fn play(&mut self, kind: AnimationKind) {
        self.active = kind;
        self.cursor = Cursor::new(self.hold);
    }

    pub fn set_mirrored(&mut self, mirrored: bool) {
        self.mirrored = mirrored;
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// Frames of `kind` as currently oriented.
    pub fn frames(&self, kind: AnimationKind) -> &[SpriteRef] {
        self.sequence(kind).frames()
    }

    pub fn original(&self, kind: AnimationKind) -> &Sequence {
        &self.originals[kind as usize]
    }

    fn sequence(&self, kind: AnimationKind) -> &Sequence {
        let original = &self.originals[kind as usize];
        if self.mirrored {
            self.mirrored_cache[kind as usize].get_or_init(|| original.mirrored())
        } else {
            original
        }
    }

    /// Run the clock forward `elapsed_ticks` and return the sprite to draw.
    ///
    /// One-shot sequences stop advancing once finished.
    pub fn advance(&mut self, elapsed_ticks: u32) -> SpriteRef {
        let seq = &self.originals[self.active as usize];
        for _ in 0..elapsed_ticks {
            if self.cursor.finished(seq) {
                break;
            }
            self.cursor.timer += 1;
            if self.cursor.timer >= self.cursor.hold {
                self.cursor.timer = 0;
                self.cursor.step += 1;
            }
        }
        self.current()
    }

    pub fn current(&self) -> SpriteRef {
        let seq = self.sequence(self.active);
        seq.frames()
            .get(self.cursor.index_in(seq))
            .copied()
            .unwrap_or(SpriteRef {
                index: WALK_FRAMES[0],
                mirrored: self.mirrored,
            })
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// True when the active one-shot sequence has completed.
    pub fn finished(&self) -> bool {
        self.cursor.finished(&self.originals[self.active as usize])
    }
}

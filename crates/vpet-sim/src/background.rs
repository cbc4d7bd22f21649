/// Which background image is showing. Wraps in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundCycler {
    count: usize,
    index: usize,
}

impl BackgroundCycler {
    /// `count` of zero is treated as one (the flat placeholder).
    pub fn new(count: usize) -> Self {
        Self {
            count: count.max(1),
            index: 0,
        }
    }

    pub fn current(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) -> usize {
        self.index = (self.index + 1) % self.count;
        self.index
    }

    pub fn prev(&mut self) -> usize {
        self.index = (self.index + self.count - 1) % self.count;
        self.index
    }
}

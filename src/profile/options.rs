//! Profile construction options.

/// Options controlling how a [`Profile`](super::Profile) is built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileOptions {
    /// Keep native frames in the tree instead of folding them into their
    /// callers
    pub include_natives: bool,
}

impl ProfileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_natives(mut self, include_natives: bool) -> Self {
        self.include_natives = include_natives;
        self
    }
}

//! When a filter output must be cleared before it is drawn into

/// Clear policy for a filter pass output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClearMode {
    /// Never clear; the pass draws over whatever the target holds
    #[default]
    Blend,
    /// Always clear
    Clear,
    /// Clear only when the system's force-clear override is set
    Auto,
}

impl ClearMode {
    /// Whether an explicit clear must be issued before drawing
    ///
    /// `force_clear` only matters for [`ClearMode::Auto`].
    pub fn needs_clear(self, force_clear: bool) -> bool {
        match self {
            ClearMode::Clear => true,
            ClearMode::Blend => false,
            ClearMode::Auto => force_clear,
        }
    }
}

impl From<bool> for ClearMode {
    fn from(clear: bool) -> Self {
        if clear {
            ClearMode::Clear
        } else {
            ClearMode::Blend
        }
    }
}

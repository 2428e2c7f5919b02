use bitflags::bitflags;
use derive_new::new;

/// Number of context lines shown around a change when none is configured.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

bitflags! {
    /// Line comparison options
    ///
    /// Controls how two lines are considered equal when computing the diff.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct CompareFlags: u32 {
        /// Fold upper case to lower case before comparing
        const IGNORE_CASE = 0b00001;
        /// Collapse each whitespace run to a single space, drop trailing whitespace
        const IGNORE_SPACE_CHANGE = 0b00010;
        /// Drop every whitespace character before comparing
        const IGNORE_ALL_SPACE = 0b00100;
        /// Do not report change regions made up entirely of blank lines
        const IGNORE_BLANK_LINES = 0b01000;
        /// Apply Unicode rules for whitespace and case instead of ASCII rules
        const UNICODE = 0b10000;
    }
}

impl CompareFlags {
    /// True when some folding (case or whitespace) applies before compare/hash.
    /// Without any of these the exact byte-wise fast path is used; `UNICODE`
    /// on its own changes nothing and is simply ignored.
    pub fn folds(self) -> bool {
        self.intersects(
            Self::IGNORE_CASE | Self::IGNORE_SPACE_CHANGE | Self::IGNORE_ALL_SPACE,
        )
    }
}

/// Full diff configuration: comparison flags plus the number of unchanged
/// context lines to attach before and after each hunk. Hunks whose unchanged
/// gap is at most twice `context_lines` are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct DiffConfig {
    pub flags: CompareFlags,
    pub context_lines: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        DiffConfig {
            flags: CompareFlags::empty(),
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

impl DiffConfig {
    pub fn with_flags(flags: CompareFlags) -> Self {
        DiffConfig {
            flags,
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

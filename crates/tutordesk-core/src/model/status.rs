use std::fmt;

/// Display status derived from the paid/done flags of a lesson.
///
/// Every combination of the two flags maps to exactly one variant, so the
/// derivation is exhaustive and has no fallback case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGlyph {
    /// Paid and done.
    Both,
    /// Paid, not yet held.
    PaidOnly,
    /// Held, payment outstanding.
    DoneOnly,
    /// Neither paid nor held.
    Neither,
}

impl StatusGlyph {
    pub fn from_flags(is_paid: bool, is_done: bool) -> Self {
        match (is_paid, is_done) {
            (true, true) => StatusGlyph::Both,
            (true, false) => StatusGlyph::PaidOnly,
            (false, true) => StatusGlyph::DoneOnly,
            (false, false) => StatusGlyph::Neither,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusGlyph::Both => "\u{2705}",
            StatusGlyph::PaidOnly => "\u{23f3}",
            StatusGlyph::DoneOnly => "\u{1f504}\u{2705}",
            StatusGlyph::Neither => "\u{1f504}",
        }
    }
}

impl fmt::Display for StatusGlyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

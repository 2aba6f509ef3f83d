use serde::{Deserialize, Serialize};

/// Source region attached to every syntax tree node, as zero-based
/// `(line, column)` pairs produced by the parser.
#[derive(Default, Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: (usize, usize),
    pub end: (usize, usize),
}

impl Span {
    /// Render a message with the (one-based) coordinates of this span
    /// appended, the way type errors are surfaced to the user.
    pub fn to_string(&self, msg: impl ToString) -> String {
        format!(
            "{} at {}:{}",
            msg.to_string(),
            self.start.0 + 1,
            self.start.1 + 1
        )
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }
}

// Spans compare equal regardless of position so node comparisons in tests
// can use Span::default() throughout.
impl PartialEq for Span {
    fn eq(&self, _other: &Span) -> bool {
        true
    }
}

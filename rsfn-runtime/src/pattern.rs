//! Field patterns for generated matchers

/// Pattern for one field of a match clause
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Pattern<T> {
    /// Matches a field equal to the value
    Exact(T),
    /// Never matches
    Absent,
    /// Matches any field
    #[default]
    Wildcard,
}

impl<T: PartialEq> Pattern<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Pattern::Exact(expected) => expected == value,
            Pattern::Absent => false,
            Pattern::Wildcard => true,
        }
    }
}

impl<T> From<Option<T>> for Pattern<T> {
    /// `Some(v)` is `Exact(v)`, `None` is `Absent`
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Pattern::Exact(v),
            None => Pattern::Absent,
        }
    }
}

use std::collections::BTreeSet;

/// Tokens and phrases that must never be accepted as part of a person name.
/// Matching is case-sensitive whole-token equality, so multi-word entries
/// only suppress a candidate when a single token equals the entire phrase.
pub const DEFAULT_EXCLUDE: &[&str] = &[
    "Google Account",
    "Ampitheatre Parkway",
    "St",
    "Rd",
    "Dr",
    "Android",
    "Google",
    "Mountain",
    "Discover",
];

#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    entries: BTreeSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn default_list() -> Self {
        Self::new(DEFAULT_EXCLUDE.iter().copied())
    }

    pub fn contains_token(&self, token: &str) -> bool {
        self.entries.contains(token)
    }
}

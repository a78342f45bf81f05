//! Exclude-list value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Ordered, immutable list of exclude entries.
///
/// Entries are stored as given; whether an entry is acceptable depends on the
/// [`ExcludeMatchMode`] it is compiled with, so validation happens when a
/// matcher is built rather than here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExcludeList {
    entries: Arc<[Box<str>]>,
}

impl ExcludeList {
    /// Build an exclude list, preserving entry order.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Box<str>>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// An empty exclude list.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Borrow the entries in configured order.
    #[must_use]
    pub fn entries(&self) -> &[Box<str>] {
        &self.entries
    }

    /// Iterate entries as string slices.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(AsRef::as_ref)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&[&str]> for ExcludeList {
    fn from(entries: &[&str]) -> Self {
        Self::new(entries.iter().copied())
    }
}

impl From<Vec<Box<str>>> for ExcludeList {
    fn from(entries: Vec<Box<str>>) -> Self {
        Self {
            entries: entries.into(),
        }
    }
}

/// How exclude entries are compared against instance type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExcludeMatchMode {
    /// Entries are literal names; a name is excluded iff it equals an entry.
    #[default]
    Exact,
    /// Entries are regular expressions, joined by alternation and anchored
    /// as `^(?:e1|e2|...)$`. A name is excluded iff the whole name matches.
    Pattern,
}

impl ExcludeMatchMode {
    /// Stable identifier used in config and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Pattern => "pattern",
        }
    }
}

impl fmt::Display for ExcludeMatchMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// What "is excluded" answers when the exclude list is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyExcludePolicy {
    /// Every name counts as excluded, so nothing is returned.
    ///
    /// This is the long-standing behavior of the tool. It is almost certainly
    /// an inversion (an empty list reads as "exclude nothing"), but changing
    /// it alters reported counts, so it stays the default until product
    /// owners sign off on [`EmptyExcludePolicy::ExcludeNone`].
    ExcludeAll,
    /// No name is excluded, so the whole catalog is returned.
    ExcludeNone,
}

/// Policy applied when no policy is configured explicitly.
pub const DEFAULT_EMPTY_EXCLUDE_POLICY: EmptyExcludePolicy = EmptyExcludePolicy::ExcludeAll;

impl EmptyExcludePolicy {
    /// Predicate result for every name when the exclude list is empty.
    #[must_use]
    pub const fn excludes_everything(self) -> bool {
        matches!(self, Self::ExcludeAll)
    }

    /// Stable identifier used in config and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExcludeAll => "excludeAll",
            Self::ExcludeNone => "excludeNone",
        }
    }
}

impl Default for EmptyExcludePolicy {
    fn default() -> Self {
        DEFAULT_EMPTY_EXCLUDE_POLICY
    }
}

impl fmt::Display for EmptyExcludePolicy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

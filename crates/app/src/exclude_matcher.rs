//! Compiled exclude-list matcher.
//!
//! Two matching modes are supported:
//!
//! - `exact`: entries are literal instance type names held in a hash set.
//!   Entries must be non-empty and contain no whitespace.
//! - `pattern`: entries are regular expressions. They are combined into
//!   `^(?:(?:e1)|(?:e2)|...)$`, so a name is excluded only when one entry
//!   matches the whole name. `a1\.large` excludes `a1.large` but neither
//!   `a1.large2` nor `xa1.large`.
//!
//! An empty list compiles to no matcher at all and the answer comes from
//! [`EmptyExcludePolicy`].

use crate::CatalogFilterError;
use instance_catalog_domain::{
    EmptyExcludePolicy, ExcludeList, ExcludeMatchMode, InstanceTypeName,
};
use regex::Regex;
use rustc_hash::FxHashSet;

/// Options controlling how an exclude list is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExcludeMatcherOptions {
    /// Entry comparison mode.
    pub mode: ExcludeMatchMode,
    /// Answer used when the exclude list is empty.
    pub empty_policy: EmptyExcludePolicy,
}

#[derive(Debug, Clone)]
enum CompiledExclude {
    Exact(FxHashSet<Box<str>>),
    Pattern(Regex),
}

/// Immutable matcher built once from an [`ExcludeList`].
#[derive(Debug, Clone)]
pub struct ExcludeMatcher {
    compiled: Option<CompiledExclude>,
    empty_policy: EmptyExcludePolicy,
}

impl ExcludeMatcher {
    /// Compile `list` according to `options`.
    ///
    /// Fails with [`CatalogFilterError::Configuration`] naming the first
    /// offending entry.
    pub fn compile(
        list: &ExcludeList,
        options: ExcludeMatcherOptions,
    ) -> Result<Self, CatalogFilterError> {
        let compiled = if list.is_empty() {
            None
        } else {
            Some(match options.mode {
                ExcludeMatchMode::Exact => compile_exact(list)?,
                ExcludeMatchMode::Pattern => compile_pattern(list)?,
            })
        };

        Ok(Self {
            compiled,
            empty_policy: options.empty_policy,
        })
    }

    /// Returns true when `name` must be dropped from results.
    pub fn is_excluded(&self, name: &str) -> bool {
        match &self.compiled {
            None => self.empty_policy.excludes_everything(),
            Some(CompiledExclude::Exact(names)) => names.contains(name),
            Some(CompiledExclude::Pattern(pattern)) => pattern.is_match(name),
        }
    }

    /// Mode of the compiled matcher, or `None` when the list was empty.
    pub const fn mode(&self) -> Option<ExcludeMatchMode> {
        match &self.compiled {
            None => None,
            Some(CompiledExclude::Exact(_)) => Some(ExcludeMatchMode::Exact),
            Some(CompiledExclude::Pattern(_)) => Some(ExcludeMatchMode::Pattern),
        }
    }

    /// Policy applied when no matcher was compiled.
    pub const fn empty_policy(&self) -> EmptyExcludePolicy {
        self.empty_policy
    }
}

fn compile_exact(list: &ExcludeList) -> Result<CompiledExclude, CatalogFilterError> {
    let mut names = FxHashSet::default();
    for entry in list.iter() {
        if entry.chars().any(char::is_whitespace) {
            return Err(CatalogFilterError::configuration(
                entry,
                "exact entries must not contain whitespace",
            ));
        }
        let name = InstanceTypeName::parse(entry)
            .map_err(|error| CatalogFilterError::configuration(entry, error.to_string()))?;
        names.insert(Box::<str>::from(name.as_str()));
    }
    Ok(CompiledExclude::Exact(names))
}

fn compile_pattern(list: &ExcludeList) -> Result<CompiledExclude, CatalogFilterError> {
    let mut alternatives = Vec::with_capacity(list.len());
    for entry in list.iter() {
        if entry.is_empty() {
            return Err(CatalogFilterError::configuration(
                entry,
                "pattern entries must be non-empty",
            ));
        }
        // Checked one by one so the error names the entry, not the alternation.
        Regex::new(entry)
            .map_err(|error| CatalogFilterError::configuration(entry, error.to_string()))?;
        alternatives.push(format!("(?:{entry})"));
    }

    let source = format!("^(?:{})$", alternatives.join("|"));
    let pattern = Regex::new(&source)
        .map_err(|error| CatalogFilterError::configuration(&source, error.to_string()))?;
    Ok(CompiledExclude::Pattern(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(entries: &[&str]) -> Result<ExcludeMatcher, CatalogFilterError> {
        ExcludeMatcher::compile(&ExcludeList::from(entries), ExcludeMatcherOptions::default())
    }

    fn pattern(entries: &[&str]) -> Result<ExcludeMatcher, CatalogFilterError> {
        ExcludeMatcher::compile(
            &ExcludeList::from(entries),
            ExcludeMatcherOptions {
                mode: ExcludeMatchMode::Pattern,
                ..ExcludeMatcherOptions::default()
            },
        )
    }

    #[test]
    fn exact_mode_matches_listed_names_only() -> Result<(), CatalogFilterError> {
        let matcher = exact(&["a1.metal", "a1.medium"])?;
        assert!(matcher.is_excluded("a1.metal"));
        assert!(matcher.is_excluded("a1.medium"));
        assert!(!matcher.is_excluded("a1.large"));
        assert!(!matcher.is_excluded("a1.metal2"));
        assert!(!matcher.is_excluded("A1.METAL"));
        assert_eq!(matcher.mode(), Some(ExcludeMatchMode::Exact));
        Ok(())
    }

    #[test]
    fn exact_mode_treats_regex_syntax_literally() -> Result<(), CatalogFilterError> {
        let matcher = exact(&["a1.*"])?;
        assert!(matcher.is_excluded("a1.*"));
        assert!(!matcher.is_excluded("a1.large"));
        Ok(())
    }

    #[test]
    fn exact_mode_rejects_blank_and_spaced_entries() {
        assert!(matches!(
            exact(&["a1.metal", ""]),
            Err(CatalogFilterError::Configuration { ref entry, .. }) if entry.is_empty()
        ));
        assert!(matches!(
            exact(&[" a1.metal"]),
            Err(CatalogFilterError::Configuration { .. })
        ));
    }

    #[test]
    fn pattern_mode_is_anchored() -> Result<(), CatalogFilterError> {
        let matcher = pattern(&[r"a1\.large", r"t2\..*"])?;
        assert!(matcher.is_excluded("a1.large"));
        assert!(!matcher.is_excluded("a1.large2"));
        assert!(!matcher.is_excluded("xa1.large"));
        assert!(matcher.is_excluded("t2.micro"));
        assert!(!matcher.is_excluded("t3.micro"));
        assert_eq!(matcher.mode(), Some(ExcludeMatchMode::Pattern));
        Ok(())
    }

    #[test]
    fn pattern_mode_keeps_alternation_inside_an_entry_anchored() -> Result<(), CatalogFilterError> {
        let matcher = pattern(&["a1.metal|m5.large"])?;
        assert!(matcher.is_excluded("m5.large"));
        assert!(!matcher.is_excluded("m5.large.extra"));
        Ok(())
    }

    #[test]
    fn pattern_mode_reports_the_invalid_entry() {
        let result = pattern(&["a1.metal", "a1.(large"]);
        assert!(matches!(
            result,
            Err(CatalogFilterError::Configuration { ref entry, .. }) if entry == "a1.(large"
        ));
    }

    #[test]
    fn empty_list_uses_exclude_all_by_default() -> Result<(), CatalogFilterError> {
        let matcher = exact(&[])?;
        assert_eq!(matcher.mode(), None);
        assert_eq!(matcher.empty_policy(), EmptyExcludePolicy::ExcludeAll);
        assert!(matcher.is_excluded("t3.micro"));
        assert!(matcher.is_excluded(""));
        Ok(())
    }

    #[test]
    fn empty_list_with_exclude_none_keeps_everything() -> Result<(), CatalogFilterError> {
        let matcher = ExcludeMatcher::compile(
            &ExcludeList::empty(),
            ExcludeMatcherOptions {
                empty_policy: EmptyExcludePolicy::ExcludeNone,
                ..ExcludeMatcherOptions::default()
            },
        )?;
        assert!(!matcher.is_excluded("t3.micro"));
        Ok(())
    }
}

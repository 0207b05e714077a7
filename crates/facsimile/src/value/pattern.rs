//! Regular-expression values.
//!
//! The pattern source uses the `regex` crate syntax. Flags follow the usual
//! script-runtime letters; `g` and `y` make matching stateful through the
//! last-match position, which is measured in bytes.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use regex::{Regex, RegexBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid pattern: {0}")]
    Syntax(#[from] regex::Error),
    #[error("unknown pattern flag `{0}`")]
    UnknownFlag(char),
    #[error("duplicate pattern flag `{0}`")]
    DuplicateFlag(char),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PatternFlags {
    pub has_indices: bool,
    pub global: bool,
    pub ignore_case: bool,
    pub multiline: bool,
    pub dot_all: bool,
    pub unicode: bool,
    pub unicode_sets: bool,
    pub sticky: bool,
}

impl PatternFlags {
    pub fn parse(flags: &str) -> Result<Self, PatternError> {
        let mut parsed = PatternFlags::default();
        for letter in flags.chars() {
            let slot = match letter {
                'd' => &mut parsed.has_indices,
                'g' => &mut parsed.global,
                'i' => &mut parsed.ignore_case,
                'm' => &mut parsed.multiline,
                's' => &mut parsed.dot_all,
                'u' => &mut parsed.unicode,
                'v' => &mut parsed.unicode_sets,
                'y' => &mut parsed.sticky,
                other => return Err(PatternError::UnknownFlag(other)),
            };
            if *slot {
                return Err(PatternError::DuplicateFlag(letter));
            }
            *slot = true;
        }
        Ok(parsed)
    }

    /// Whether matching resumes from the last-match position.
    pub fn is_stateful(&self) -> bool {
        self.global || self.sticky
    }
}

impl fmt::Display for PatternFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters = [
            (self.has_indices, 'd'),
            (self.global, 'g'),
            (self.ignore_case, 'i'),
            (self.multiline, 'm'),
            (self.dot_all, 's'),
            (self.unicode, 'u'),
            (self.unicode_sets, 'v'),
            (self.sticky, 'y'),
        ];
        for (set, letter) in letters {
            if set {
                write!(f, "{}", letter)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct Pattern(Arc<PatternInner>);

struct PatternInner {
    source: Arc<str>,
    flags: PatternFlags,
    regex: Regex,
    last_index: AtomicUsize,
}

heap_handle!(Pattern);

impl Pattern {
    pub fn new(source: &str, flags: &str) -> Result<Self, PatternError> {
        Self::with_flags(source, PatternFlags::parse(flags)?)
    }

    pub fn with_flags(source: &str, flags: PatternFlags) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(flags.ignore_case)
            .multi_line(flags.multiline)
            .dot_matches_new_line(flags.dot_all)
            .build()?;
        Ok(Self::from_parts(source.into(), flags, regex))
    }

    fn from_parts(source: Arc<str>, flags: PatternFlags, regex: Regex) -> Self {
        Self(Arc::new(PatternInner {
            source,
            flags,
            regex,
            last_index: AtomicUsize::new(0),
        }))
    }

    /// A new pattern over the same source and flags, with the last-match
    /// position back at zero. The compiled program is reused.
    pub(crate) fn recompiled(&self) -> Pattern {
        Self::from_parts(self.0.source.clone(), self.0.flags, self.0.regex.clone())
    }

    pub fn source(&self) -> &str {
        &self.0.source
    }

    pub fn flags(&self) -> PatternFlags {
        self.0.flags
    }

    pub fn last_index(&self) -> usize {
        self.0.last_index.load(Ordering::Relaxed)
    }

    pub fn set_last_index(&self, index: usize) {
        self.0.last_index.store(index, Ordering::Relaxed);
    }

    /// Test for a match. Stateful patterns search from (sticky: exactly at)
    /// the last-match position and advance it on success, resetting it on
    /// failure.
    pub fn test(&self, haystack: &str) -> bool {
        if !self.0.flags.is_stateful() {
            return self.0.regex.is_match(haystack);
        }

        let start = self.last_index();
        if start > haystack.len() || !haystack.is_char_boundary(start) {
            self.set_last_index(0);
            return false;
        }
        match self.0.regex.find_at(haystack, start) {
            Some(found) if !self.0.flags.sticky || found.start() == start => {
                self.set_last_index(found.end());
                true
            }
            _ => {
                self.set_last_index(0);
                false
            }
        }
    }

    /// Replace the first match, or every match for global patterns.
    /// `$name` / `$1` references in `replacement` are expanded.
    pub fn replace(&self, haystack: &str, replacement: &str) -> String {
        if self.0.flags.global {
            self.set_last_index(0);
            self.0.regex.replace_all(haystack, replacement).into_owned()
        } else {
            self.0.regex.replace(haystack, replacement).into_owned()
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.0.source, self.0.flags)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_print_in_canonical_order() {
        let flags = PatternFlags::parse("yig").unwrap();
        assert_eq!(flags.to_string(), "giy");
    }

    #[test]
    fn rejects_unknown_and_repeated_flags() {
        assert!(matches!(PatternFlags::parse("q"), Err(PatternError::UnknownFlag('q'))));
        assert!(matches!(PatternFlags::parse("gg"), Err(PatternError::DuplicateFlag('g'))));
    }

    #[test]
    fn global_test_advances_and_resets() {
        let pattern = Pattern::new("De[1-9]", "g").unwrap();
        assert!(pattern.test("De1De2"));
        assert_eq!(pattern.last_index(), 3);
        assert!(pattern.test("De1De2"));
        assert_eq!(pattern.last_index(), 6);
        assert!(!pattern.test("De1De2"));
        assert_eq!(pattern.last_index(), 0);
    }

    #[test]
    fn sticky_requires_match_at_position() {
        let pattern = Pattern::new("b", "y").unwrap();
        assert!(!pattern.test("ab"));
        pattern.set_last_index(1);
        assert!(pattern.test("ab"));
    }

    #[test]
    fn replace_respects_global_flag() {
        let once = Pattern::new("De[1-9]+", "").unwrap();
        let every = Pattern::new("De[1-9]+", "g").unwrap();
        assert_eq!(once.replace("De1De2", ""), "De2");
        assert_eq!(every.replace("De1De2", ""), "");
    }
}

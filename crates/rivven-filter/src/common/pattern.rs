//! # Pattern Matching for Replication Filtering
//!
//! A filter pattern is either a literal schema/table name or, when prefixed
//! with [`REGEX_MARKER`] (`~`), a regular expression. The choice is made once
//! when the pattern is compiled; evaluation never re-inspects the marker.
//!
//! Regular expressions are always tested against the *whole* candidate, so
//! `~^b.*` matches `btest` but not `abtest`, and `~log` matches only `log`.
//!
//! ## Example
//!
//! ```rust
//! use rivven_filter::common::pattern::{PatternMatcher, PatternSet};
//!
//! let literal = PatternMatcher::new("stest").unwrap();
//! assert!(literal.matches("stest"));
//! assert!(!literal.matches("stest2"));
//!
//! let regex = PatternMatcher::new("~^b.*").unwrap();
//! assert!(regex.matches("btest"));
//! assert!(!regex.matches("abtest"));
//!
//! let set = PatternSet::from_patterns(&["s1".to_string(), "~^b.*".to_string()], true).unwrap();
//! assert!(set.matches("b1"));
//! assert!(!set.matches("s2"));
//! ```

use regex::{Regex, RegexBuilder};

/// Prefix that marks a pattern as a regular expression.
pub const REGEX_MARKER: char = '~';

/// Error type for pattern operations
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Empty pattern")]
    EmptyPattern,
}

/// A compiled filter pattern.
#[derive(Debug, Clone)]
pub enum PatternMatcher {
    /// Exact name comparison
    Literal {
        name: String,
        case_sensitive: bool,
    },
    /// Anchored regular expression
    Regex {
        /// Pattern as configured, including the marker
        source: String,
        regex: Regex,
    },
}

impl PatternMatcher {
    /// Compile a case-sensitive pattern.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Self::with_case_sensitivity(pattern, true)
    }

    /// Compile a pattern with explicit case sensitivity.
    ///
    /// With `case_sensitive == false`, literals compare ASCII
    /// case-insensitively and regexes are built with the `i` flag.
    pub fn with_case_sensitivity(pattern: &str, case_sensitive: bool) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::EmptyPattern);
        }

        let Some(body) = pattern.strip_prefix(REGEX_MARKER) else {
            return Ok(Self::Literal {
                name: pattern.to_string(),
                case_sensitive,
            });
        };

        if body.is_empty() {
            return Err(PatternError::EmptyPattern);
        }

        let regex = RegexBuilder::new(&format!("^(?:{})$", body))
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|source| PatternError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self::Regex {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Check whether `candidate` matches this pattern.
    #[inline]
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Literal {
                name,
                case_sensitive: true,
            } => name == candidate,
            Self::Literal {
                name,
                case_sensitive: false,
            } => name.eq_ignore_ascii_case(candidate),
            Self::Regex { regex, .. } => regex.is_match(candidate),
        }
    }

    /// The pattern as it was configured.
    pub fn pattern(&self) -> &str {
        match self {
            Self::Literal { name, .. } => name,
            Self::Regex { source, .. } => source,
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Self::Regex { .. })
    }
}

/// An ordered list of patterns; matches when any member matches.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<PatternMatcher>,
}

impl PatternSet {
    /// Create an empty pattern set
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every pattern in `patterns`, failing on the first bad one.
    pub fn from_patterns(patterns: &[String], case_sensitive: bool) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| PatternMatcher::with_case_sensitivity(p, case_sensitive))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Add an already compiled pattern
    pub fn push(&mut self, matcher: PatternMatcher) {
        self.patterns.push(matcher);
    }

    /// Check if `candidate` matches any pattern in the set
    #[inline]
    pub fn matches(&self, candidate: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(candidate))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternMatcher> {
        self.patterns.iter()
    }
}

//! Route matching logic.
//!
//! # Responsibilities
//! - Match exact paths, path prefixes and path suffixes
//! - Match framework-internal query markers
//! - Recognise the catch-all section item shape (`/section/` or `/section/<digits>`)
//! - Combine conditions with OR semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Matchers are pure: no I/O, no shared state
//! - No regex to guarantee O(n) matching

use std::collections::HashSet;

/// The parts of an inbound request the classifier looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTarget<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
}

impl<'a> RequestTarget<'a> {
    pub fn new(path: &'a str, query: Option<&'a str>) -> Self {
        Self { path, query }
    }
}

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, target: &RequestTarget<'_>) -> bool;
}

/// Matches any of a fixed set of paths exactly.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    paths: HashSet<String>,
}

impl ExactPathMatcher {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, target: &RequestTarget<'_>) -> bool {
        self.paths.contains(target.path)
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, target: &RequestTarget<'_>) -> bool {
        target.path.starts_with(&self.prefix)
    }
}

/// Matches the request path suffix (e.g. `.txt`).
#[derive(Debug, Clone)]
pub struct PathSuffixMatcher {
    suffix: String,
}

impl PathSuffixMatcher {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Matcher for PathSuffixMatcher {
    fn matches(&self, target: &RequestTarget<'_>) -> bool {
        target.path.ends_with(&self.suffix)
    }
}

/// Matches when the query string carries a given parameter name,
/// with or without a value (`?_rsc`, `?_rsc=abc`, `?a=1&_rsc=2`).
#[derive(Debug, Clone)]
pub struct QueryParamMatcher {
    name: String,
}

impl QueryParamMatcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Matcher for QueryParamMatcher {
    fn matches(&self, target: &RequestTarget<'_>) -> bool {
        let Some(query) = target.query else {
            return false;
        };
        query
            .split('&')
            .map(|pair| pair.split_once('=').map_or(pair, |(name, _)| name))
            .any(|name| name == self.name)
    }
}

/// Matches the catch-all section: the root with a trailing slash, or the
/// root followed by exactly one all-digit segment (optional trailing slash).
#[derive(Debug, Clone)]
pub struct SectionItemMatcher {
    root: String,
}

impl SectionItemMatcher {
    /// `root` is the section path without trailing slash, e.g. `/public/pats`.
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}

impl Matcher for SectionItemMatcher {
    fn matches(&self, target: &RequestTarget<'_>) -> bool {
        let Some(rest) = target
            .path
            .strip_prefix(self.root.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return false;
        };
        if rest.is_empty() {
            return true;
        }
        let segment = rest.strip_suffix('/').unwrap_or(rest);
        !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, target: &RequestTarget<'_>) -> bool {
        self.matchers.iter().any(|m| m.matches(target))
    }
}

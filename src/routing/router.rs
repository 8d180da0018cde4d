//! Route lookup and dispatch planning.
//!
//! # Responsibilities
//! - Store the ordered classification rules
//! - Map (path, query) to exactly one routing category
//! - Compute the redirect location or upstream URL for that category
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) rule scan, first match wins
//! - Legacy origin is the catch-all, so classification is total

use std::fmt;

use crate::config::{OriginsConfig, RoutingConfig};
use crate::routing::matcher::{
    AnyMatcher, ExactPathMatcher, Matcher, PathPrefixMatcher, PathSuffixMatcher,
    QueryParamMatcher, RequestTarget, SectionItemMatcher,
};

/// Routing categories, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteCategory {
    /// Section root without trailing slash: 301 to the slash form.
    CanonicalRedirect,
    /// Section root or item page: one fixed HTML file from the static origin.
    Shell,
    /// Root files, framework and static assets from the static origin.
    StaticAsset,
    /// Everything else, passed through to the legacy origin.
    Legacy,
}

impl RouteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteCategory::CanonicalRedirect => "redirect",
            RouteCategory::Shell => "shell",
            RouteCategory::StaticAsset => "static",
            RouteCategory::Legacy => "legacy",
        }
    }
}

impl fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a request goes. Derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    Redirect { location: String },
    Shell { upstream: String },
    StaticAsset { upstream: String },
    Legacy { upstream: String },
}

impl RoutingDecision {
    pub fn category(&self) -> RouteCategory {
        match self {
            RoutingDecision::Redirect { .. } => RouteCategory::CanonicalRedirect,
            RoutingDecision::Shell { .. } => RouteCategory::Shell,
            RoutingDecision::StaticAsset { .. } => RouteCategory::StaticAsset,
            RoutingDecision::Legacy { .. } => RouteCategory::Legacy,
        }
    }

    /// Upstream URL, `None` for redirects.
    pub fn upstream(&self) -> Option<&str> {
        match self {
            RoutingDecision::Redirect { .. } => None,
            RoutingDecision::Shell { upstream }
            | RoutingDecision::StaticAsset { upstream }
            | RoutingDecision::Legacy { upstream } => Some(upstream),
        }
    }
}

/// Compiled request classifier.
#[derive(Debug)]
pub struct Router {
    rules: Vec<(Box<dyn Matcher>, RouteCategory)>,
    static_origin: String,
    legacy_origin: String,
    shell_html_path: String,
}

impl Router {
    /// Compile the ordered rule list from configuration.
    pub fn from_config(routing: &RoutingConfig, origins: &OriginsConfig) -> Self {
        let mut static_matchers: Vec<Box<dyn Matcher>> = Vec::new();
        static_matchers.push(Box::new(ExactPathMatcher::new(routing.root_files.iter().cloned())));
        for prefix in routing.framework_prefixes.iter().chain(&routing.static_prefixes) {
            static_matchers.push(Box::new(PathPrefixMatcher::new(prefix.clone())));
        }
        if !routing.text_suffix.is_empty() {
            static_matchers.push(Box::new(PathSuffixMatcher::new(routing.text_suffix.clone())));
        }
        if !routing.internal_query_marker.is_empty() {
            static_matchers.push(Box::new(QueryParamMatcher::new(
                routing.internal_query_marker.clone(),
            )));
        }

        let mut rules: Vec<(Box<dyn Matcher>, RouteCategory)> = Vec::with_capacity(3);
        rules.push((
            Box::new(ExactPathMatcher::new([routing.section_root.clone()])),
            RouteCategory::CanonicalRedirect,
        ));
        rules.push((
            Box::new(SectionItemMatcher::new(routing.section_root.clone())),
            RouteCategory::Shell,
        ));
        rules.push((Box::new(AnyMatcher::new(static_matchers)), RouteCategory::StaticAsset));

        Self {
            rules,
            static_origin: origins.static_origin.trim_end_matches('/').to_string(),
            legacy_origin: origins.legacy_origin.trim_end_matches('/').to_string(),
            shell_html_path: routing.shell_html_path.clone(),
        }
    }

    /// First matching category, `Legacy` when nothing matches.
    pub fn category(&self, path: &str, query: Option<&str>) -> RouteCategory {
        let target = RequestTarget::new(path, query);
        self.rules
            .iter()
            .find(|(matcher, _)| matcher.matches(&target))
            .map_or(RouteCategory::Legacy, |(_, category)| *category)
    }

    /// Classify a request and compute its target.
    pub fn classify(&self, path: &str, query: Option<&str>) -> RoutingDecision {
        match self.category(path, query) {
            RouteCategory::CanonicalRedirect => RoutingDecision::Redirect {
                location: format!("{path}/"),
            },
            RouteCategory::Shell => RoutingDecision::Shell {
                upstream: join_url(&self.static_origin, &self.shell_html_path, query),
            },
            RouteCategory::StaticAsset => RoutingDecision::StaticAsset {
                upstream: join_url(&self.static_origin, path, query),
            },
            RouteCategory::Legacy => RoutingDecision::Legacy {
                upstream: join_url(&self.legacy_origin, path, query),
            },
        }
    }
}

fn join_url(origin: &str, path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{origin}{path}?{q}"),
        _ => format!("{origin}{path}"),
    }
}

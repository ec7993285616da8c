//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile configured path patterns once at startup
//! - Match a request path against a single pattern or an ordered set
//!
//! # Design Decisions
//! - Patterns use regex syntax and are anchored at both ends, so
//!   `/sign-in(.*)` matches `/sign-in` and `/sign-in/sso` but not `/x/sign-in`
//! - Path matching is case-sensitive
//! - Empty set never matches

use regex::Regex;

/// Trait for matching a request path against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// A single compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    /// Compile a pattern. The whole path must match.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Matcher for PathPattern {
    fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// An ordered list of patterns with any-match semantics.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<PathPattern>,
}

impl PatternSet {
    /// Compile every pattern, failing on the first invalid one.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| PathPattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// First pattern (in configuration order) matching the path.
    pub fn first_match(&self, path: &str) -> Option<&PathPattern> {
        self.patterns.iter().find(|p| p.matches(path))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Matcher for PatternSet {
    fn matches(&self, path: &str) -> bool {
        self.first_match(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_anchored() {
        let matcher = PathPattern::new("/sign-in(.*)").unwrap();

        assert!(matcher.matches("/sign-in"));
        assert!(matcher.matches("/sign-in/factor-one"));
        assert!(!matcher.matches("/app/sign-in"));
        assert!(!matcher.matches("/SIGN-IN")); // Case sensitive
    }

    #[test]
    fn test_alternation_is_grouped() {
        // Without the outer group, `^/api|/trpc$` would match "/apix/anything/trpc".
        let matcher = PathPattern::new("/(api|trpc)(.*)").unwrap();

        assert!(matcher.matches("/api/user"));
        assert!(matcher.matches("/trpc"));
        assert!(!matcher.matches("/gallery/trpc/x"));
    }

    #[test]
    fn test_static_file_pattern() {
        let matcher = PathPattern::new("(.*)/[^/]*\\.[^/]*").unwrap();

        assert!(matcher.matches("/favicon.ico"));
        assert!(matcher.matches("/assets/app.min.js"));
        assert!(matcher.matches("/.well-known"));
        assert!(!matcher.matches("/v1.2/gallery"));
        assert!(!matcher.matches("/gallery"));
    }

    #[test]
    fn test_set_first_match_order() {
        let set = PatternSet::compile(&["/sign-in(.*)", "/(.*)"]).unwrap();

        assert_eq!(set.first_match("/sign-in").unwrap().as_str(), "/sign-in(.*)");
        assert_eq!(set.first_match("/pricing").unwrap().as_str(), "/(.*)");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_empty_set_never_matches() {
        let set = PatternSet::compile::<&str>(&[]).unwrap();
        assert!(set.is_empty());
        assert!(!set.matches("/"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PathPattern::new("/broken(").is_err());
        assert!(PatternSet::compile(&["/ok", "/broken("]).is_err());
    }
}

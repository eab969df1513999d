//! Route matching logic.
//!
//! # Responsibilities
//! - Compile path patterns once at startup
//! - Decide whether a non-API path goes through the auth gate at all
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Patterns are segment based; wildcards only in the last segment
//! - Exclusions are an explicit ordered list checked before the catch-all
//! - No regex to guarantee O(n) matching

use thiserror::Error;

/// Errors raised while compiling a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern `{0}` must start with '/'")]
    MissingLeadingSlash(String),

    #[error("pattern `{0}` has a wildcard before its last segment")]
    WildcardNotLast(String),

    #[error("pattern `{0}` has an unnamed parameter")]
    UnnamedParam(String),
}

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Exact segment text.
    Literal(String),
    /// `:name`, exactly one non-empty segment.
    Param,
    /// `:name*` (min 0) or `:name+` (min 1), the rest of the path.
    Rest { min: usize },
    /// `text*`, a segment starting with `text`, then anything.
    Prefix(String),
}

/// A compiled path pattern.
///
/// ```text
/// /home/:path*     /home, /home/, /home/a/b
/// /users/:id       /users/42
/// /_next/static*   /_next/static, /_next/staticx, /_next/static/a.js
/// /                exactly the root path
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let body = pattern
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(pattern.to_string()))?;

        let raw: Vec<&str> = if body.is_empty() {
            Vec::new()
        } else {
            body.split('/').collect()
        };

        let mut segments = Vec::with_capacity(raw.len());
        for (i, part) in raw.iter().enumerate() {
            let last = i + 1 == raw.len();
            let segment = if let Some(name) = part.strip_prefix(':') {
                if let Some(name) = name.strip_suffix('*') {
                    Self::named(pattern, name)?;
                    Segment::Rest { min: 0 }
                } else if let Some(name) = name.strip_suffix('+') {
                    Self::named(pattern, name)?;
                    Segment::Rest { min: 1 }
                } else {
                    Self::named(pattern, name)?;
                    Segment::Param
                }
            } else if let Some(text) = part.strip_suffix('*') {
                Segment::Prefix(text.to_string())
            } else {
                Segment::Literal(part.to_string())
            };

            if !last && matches!(segment, Segment::Rest { .. } | Segment::Prefix(_)) {
                return Err(PatternError::WildcardNotLast(pattern.to_string()));
            }
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    fn named(pattern: &str, name: &str) -> Result<(), PatternError> {
        if name.is_empty() {
            Err(PatternError::UnnamedParam(pattern.to_string()))
        } else {
            Ok(())
        }
    }

    /// The pattern text this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the path matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let Some(body) = path.strip_prefix('/') else {
            return false;
        };
        let parts: Vec<&str> = if body.is_empty() {
            Vec::new()
        } else {
            body.split('/').collect()
        };

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => {
                    if parts.get(i) != Some(&text.as_str()) {
                        return false;
                    }
                }
                Segment::Param => {
                    if parts.get(i).map_or(true, |p| p.is_empty()) {
                        return false;
                    }
                }
                Segment::Rest { min } => return parts.len() - i >= *min,
                Segment::Prefix(text) => {
                    return parts.get(i).is_some_and(|p| p.starts_with(text.as_str()));
                }
            }
        }

        parts.len() == self.segments.len()
    }
}

/// Compiled protected/excluded pattern set.
///
/// A path is routed through the auth gate iff it matches a protected pattern,
/// or the catch-all is enabled and no exclusion matches.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    protected: Vec<PathPattern>,
    excluded: Vec<PathPattern>,
    catch_all: bool,
}

impl RouteMatcher {
    /// Compile the matcher from pattern strings.
    pub fn new<P, E>(protected: P, excluded: E, catch_all: bool) -> Result<Self, PatternError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let protected = protected
            .into_iter()
            .map(|p| PathPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let excluded = excluded
            .into_iter()
            .map(|p| PathPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            protected,
            excluded,
            catch_all,
        })
    }

    /// Returns true if the path is subject to the auth gate.
    pub fn matches(&self, path: &str) -> bool {
        if self.protected.iter().any(|p| p.matches(path)) {
            return true;
        }
        self.catch_all && !self.excluded.iter().any(|p| p.matches(path))
    }

    /// The first exclusion matching the path, if any.
    pub fn excluded_by(&self, path: &str) -> Option<&PathPattern> {
        self.excluded.iter().find(|p| p.matches(path))
    }
}

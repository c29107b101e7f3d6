//! Route patterns deciding which paths are cacheable.
//!
//! A pattern is a path template. Segments starting with `:` match any
//! non-empty run of characters (slashes included), every other segment is
//! used as regular expression source verbatim, so `/static/.*` works as a
//! prefix wildcard. The whole pattern is anchored at both ends.
//!
//! | Pattern | Matches | Does not match |
//! |---------|---------|----------------|
//! | `/test` | `/test` | `/test/1` |
//! | `/users/:id` | `/users/42`, `/users/42/posts` | `/users/` |
//! | `/.*` | everything | |
//! | (empty) | `/` | `/a` |

use regex::Regex;

use crate::error::ConfigError;

const VARIABLE_MARKER: char = ':';
const VARIABLE_SOURCE: &str = ".+";

/// A single compiled path pattern.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    regex: Regex,
}

impl Route {
    /// Compile a pattern.
    ///
    /// Missing leading slash is added and an empty pattern means `/`.
    pub fn compile(pattern: &str) -> Result<Self, ConfigError> {
        let source = to_regex_source(pattern);
        let regex = Regex::new(&source).map_err(|source| ConfigError::InvalidRoute {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self {
            pattern: pattern.to_owned(),
            regex,
        })
    }

    /// Pattern as it was configured.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check the path (without query) against the pattern.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

fn to_regex_source(pattern: &str) -> String {
    let normalized = if pattern.starts_with('/') {
        pattern.to_owned()
    } else {
        format!("/{pattern}")
    };
    let body = normalized
        .split('/')
        .map(|segment| {
            if segment.starts_with(VARIABLE_MARKER) {
                VARIABLE_SOURCE
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/");
    format!("^{body}$")
}

/// Inclusion and exclusion lists for request paths.
///
/// Exclusions always win: a path matching any excluded pattern is not
/// cacheable even if an included pattern matches it too.
#[derive(Debug, Clone, Default)]
pub struct RouteMatcher {
    included: Vec<Route>,
    excluded: Vec<Route>,
}

impl RouteMatcher {
    /// Compile both lists. The first malformed pattern aborts construction.
    pub fn new<I, E>(included: I, excluded: E) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Ok(Self {
            included: compile_all(included)?,
            excluded: compile_all(excluded)?,
        })
    }

    /// Whether responses for this path may be cached.
    pub fn is_cacheable(&self, path: &str) -> bool {
        if self.excluded.iter().any(|route| route.is_match(path)) {
            return false;
        }
        self.included.iter().any(|route| route.is_match(path))
    }

    /// Compiled inclusion list.
    pub fn included(&self) -> &[Route] {
        &self.included
    }

    /// Compiled exclusion list.
    pub fn excluded(&self) -> &[Route] {
        &self.excluded
    }
}

fn compile_all<I>(patterns: I) -> Result<Vec<Route>, ConfigError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|pattern| Route::compile(pattern.as_ref()))
        .collect()
}

//! Semantic version ranges
//!
//! Handles range expressions made of comparator clauses:
//! - `>=1.1.0 <5.0.0` (whitespace separated)
//! - `>=1.1.0,<5.0.0` (comma separated, as registries store them)
//! - `1.2.3` / `=1.2.3` / `==1.2.3` (exact match)
//! - `!=1.2.3`
//! - `*` (any version)
//!
//! All clauses of a range must hold for a version to satisfy it.

use crate::error::VersionError;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Parse a version string, zero-padding partial versions like `1` or `1.2`
pub fn parse_version(input: &str) -> Result<Version, VersionError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(VersionError::malformed_version(input, "empty version"));
    }

    // Pad only the release part; prerelease/build suffixes stay as written
    let split_at = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (release, suffix) = trimmed.split_at(split_at);
    let normalized = match release.split('.').count() {
        1 => format!("{}.0.0{}", release, suffix),
        2 => format!("{}.0{}", release, suffix),
        _ => trimmed.to_string(),
    };

    Version::parse(&normalized)
        .map_err(|e| VersionError::malformed_version(input, e.to_string()))
}

/// Comparison operator of a single clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// `=` or a bare version
    Exact,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
}

impl Op {
    /// Returns the canonical operator symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Exact => "=",
            Op::NotEqual => "!=",
            Op::Greater => ">",
            Op::GreaterOrEqual => ">=",
            Op::Less => "<",
            Op::LessOrEqual => "<=",
        }
    }

    /// Splits a token into its operator and the remaining version text.
    ///
    /// Two-character operators must be tried before their one-character prefixes.
    fn split_token(token: &str) -> Option<(Op, &str)> {
        const OPERATORS: [(&str, Op); 7] = [
            (">=", Op::GreaterOrEqual),
            ("<=", Op::LessOrEqual),
            ("==", Op::Exact),
            ("!=", Op::NotEqual),
            (">", Op::Greater),
            ("<", Op::Less),
            ("=", Op::Exact),
        ];

        for (symbol, op) in OPERATORS {
            if let Some(rest) = token.strip_prefix(symbol) {
                return Some((op, rest));
            }
        }

        // A bare version means exact match
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            return Some((Op::Exact, token));
        }

        None
    }
}

/// A single comparator clause, e.g. `>=1.1.0`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comparator {
    /// Comparison operator
    pub op: Op,
    /// Version operand
    pub version: Version,
}

impl Comparator {
    /// Creates a new comparator
    pub fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    /// Returns true if the version satisfies this clause
    ///
    /// Build metadata has no precedence and is ignored on both sides.
    pub fn matches(&self, version: &Version) -> bool {
        let ordering = cmp_precedence(version, &self.version);
        match self.op {
            Op::Exact => ordering == Ordering::Equal,
            Op::NotEqual => ordering != Ordering::Equal,
            Op::Greater => ordering == Ordering::Greater,
            Op::GreaterOrEqual => ordering != Ordering::Less,
            Op::Less => ordering == Ordering::Less,
            Op::LessOrEqual => ordering != Ordering::Greater,
        }
    }
}

fn cmp_precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.symbol(), self.version)
    }
}

/// An immutable predicate over versions built from AND-ed comparator clauses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    comparators: Vec<Comparator>,
}

impl VersionRange {
    /// Range that accepts every version
    pub fn any() -> Self {
        Self {
            comparators: Vec::new(),
        }
    }

    /// Parses a range expression.
    ///
    /// Tokens are separated by whitespace and/or commas. Each token is an
    /// operator prefix followed by a version, or a bare version.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let tokens: Vec<&str> = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.is_empty() {
            return Err(VersionError::malformed_range(text, "empty range"));
        }

        if tokens == ["*"] {
            return Ok(Self::any());
        }

        let mut comparators = Vec::with_capacity(tokens.len());
        for token in tokens {
            let (op, rest) = Op::split_token(token).ok_or_else(|| {
                VersionError::malformed_range(text, format!("unknown operator in '{}'", token))
            })?;
            // `>= 1.0.0` with a space is not a single token; the operand must be attached
            if rest.is_empty() {
                return Err(VersionError::malformed_range(
                    text,
                    format!("operator '{}' has no version", token),
                ));
            }
            let version = parse_version(rest).map_err(|e| {
                VersionError::malformed_range(text, format!("invalid version in '{}': {}", token, e))
            })?;
            comparators.push(Comparator::new(op, version));
        }

        Ok(Self { comparators })
    }

    /// Returns true iff the version satisfies every clause
    pub fn satisfies(&self, version: &Version) -> bool {
        self.comparators.iter().all(|c| c.matches(version))
    }

    /// Returns the comparator clauses
    pub fn comparators(&self) -> &[Comparator] {
        &self.comparators
    }

    /// Returns true if this range accepts any version
    pub fn is_any(&self) -> bool {
        self.comparators.is_empty()
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.comparators.is_empty() {
            return write!(f, "*");
        }
        let parts: Vec<String> = self.comparators.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(" "))
    }
}

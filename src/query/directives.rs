//! Sort and populate directives that travel next to the filter tree

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction, upper-case on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Parse a direction, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single active sort key of a list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Parse the `field:DIRECTION` form of the `sort` parameter
    ///
    /// Returns `None` unless the token holds exactly one colon, a non-empty
    /// field and a recognised direction.
    pub fn parse(token: &str) -> Option<Self> {
        let mut parts = token.split(':');
        let field = parts.next()?.trim();
        let direction = SortDirection::parse(parts.next()?.trim())?;
        if parts.next().is_some() || field.is_empty() {
            return None;
        }
        Some(Self::new(field, direction))
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction)
    }
}

/// Relation population directive
///
/// `deep` populates every relation of the related entity through the `*`
/// wildcard and implies `enabled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulateField {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub deep: bool,
}

impl PopulateField {
    pub fn new(name: impl Into<String>, enabled: bool, deep: bool) -> Self {
        Self {
            name: name.into(),
            enabled: enabled || deep,
            deep,
        }
    }

    pub fn shallow(name: impl Into<String>) -> Self {
        Self::new(name, true, false)
    }

    pub fn deep(name: impl Into<String>) -> Self {
        Self::new(name, true, true)
    }

    /// Whether the directive produces any output
    pub fn is_active(&self) -> bool {
        self.enabled || self.deep
    }
}

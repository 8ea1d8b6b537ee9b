use arbor_content::ContentPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};

/// Depth limit used when the caller does not pick one.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Configuration for a [`Mapper`](crate::Mapper).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Default traversal depth for [`MapOptions`].
    pub max_depth: usize,
    /// How content metadata failures are handled when writing binaries.
    pub content_policy: ContentPolicy,
    /// Absolute path of the node under which unsaved reference targets are
    /// persisted. `None` persists them next to the node holding the
    /// reference.
    pub reference_parent: Option<String>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            content_policy: ContentPolicy::default(),
            reference_parent: None,
        }
    }
}

impl MapperConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> MapResult<Self> {
        toml::from_str(s).map_err(|e| MapError::InvalidConfig(e.to_string()))
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> MapResult<String> {
        toml::to_string(self).map_err(|e| MapError::InvalidConfig(e.to_string()))
    }
}

/// Selects which fields a mapping call touches.
///
/// An empty include list means every field. Exclusions win over inclusions.
/// Identifier, name and path fields are mapped regardless.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl FieldFilter {
    /// Map every field.
    pub fn all() -> Self {
        Self::default()
    }

    /// Map only the named fields.
    pub fn only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: fields.into_iter().map(Into::into).collect(),
            exclude: Vec::new(),
        }
    }

    /// Map every field except the named ones.
    pub fn excluding<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: Vec::new(),
            exclude: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated filter such as `"title,body"` or
    /// `"*,-secret"`. `*` includes everything; a leading `-` excludes.
    pub fn parse(spec: &str) -> Self {
        let mut filter = Self::default();
        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if part == "*" {
                continue;
            }
            match part.strip_prefix('-') {
                Some(name) => filter.exclude.push(name.to_string()),
                None => filter.include.push(part.to_string()),
            }
        }
        filter
    }

    pub fn allows(&self, field: &str) -> bool {
        if self.exclude.iter().any(|f| f == field) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|f| f == field)
    }
}

/// Per-call mapping options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapOptions {
    /// Child-node and reference fields of an object at depth `d` are only
    /// followed while `d < max_depth`. The root object is depth 0.
    pub max_depth: usize,
    pub filter: FieldFilter,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            filter: FieldFilter::all(),
        }
    }
}

impl MapOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_filter(mut self, filter: FieldFilter) -> Self {
        self.filter = filter;
        self
    }
}

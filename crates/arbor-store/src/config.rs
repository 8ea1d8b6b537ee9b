use serde::{Deserialize, Serialize};

/// Behaviour switches for [`InMemoryTreeStore`](crate::InMemoryTreeStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Refuse to remove nodes that are targets of strong references.
    ///
    /// Turning this off simulates a backend whose data has become
    /// inconsistent, which is useful for exercising read-side error paths.
    pub enforce_integrity: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enforce_integrity: true,
        }
    }
}

impl StoreConfig {
    /// A configuration that allows removal of strongly referenced nodes.
    pub fn without_integrity() -> Self {
        Self {
            enforce_integrity: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enforces_integrity() {
        assert!(StoreConfig::default().enforce_integrity);
        assert!(!StoreConfig::without_integrity().enforce_integrity);
    }
}

use serde::{Deserialize, Serialize};

/// How content metadata failures are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPolicy {
    /// Log the failure and substitute an empty stream or a length of -1.
    #[default]
    BestEffort,
    /// Report the failure to the caller.
    Strict,
}

impl ContentPolicy {
    /// Returns `true` for [`ContentPolicy::Strict`].
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Strict)
    }
}

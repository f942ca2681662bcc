//! Substitution options.

use serde::{Deserialize, Serialize};

/// How a region is rewritten after substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewritePolicy {
    /// Keep run boundaries outside the replaced tokens. Falls back to
    /// `Collapse` for a region where a token spans runs with different
    /// formatting.
    #[default]
    PreserveRuns,
    /// Move the whole region text into its first text run.
    Collapse,
}

/// Options for filling a document.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Region rewrite policy
    pub policy: RewritePolicy,
}

impl FillOptions {
    /// Create fill options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rewrite policy.
    pub fn with_policy(mut self, policy: RewritePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use the collapsing rewrite policy.
    pub fn collapse(self) -> Self {
        self.with_policy(RewritePolicy::Collapse)
    }
}

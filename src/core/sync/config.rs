/*!
 * Lock Configuration
 *
 * Runtime configuration for the writer-priority lock
 */

use serde::{Deserialize, Serialize};

/// What `release()` does when the caller holds no access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Report `LockError::NotHeld` and leave the state untouched
    #[default]
    Strict,
    /// Legacy contract: silently ignore the call
    Lenient,
}

/// Lock configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockConfig {
    /// Handling of release-without-acquire
    pub release_policy: ReleasePolicy,
}

impl LockConfig {
    /// Double release and release-without-acquire are reported as errors
    pub const fn strict() -> Self {
        Self {
            release_policy: ReleasePolicy::Strict,
        }
    }

    /// Unheld release is an inert no-op, matching the legacy harness
    pub const fn legacy() -> Self {
        Self {
            release_policy: ReleasePolicy::Lenient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_strict() {
        assert_eq!(LockConfig::default(), LockConfig::strict());
        assert_eq!(LockConfig::legacy().release_policy, ReleasePolicy::Lenient);
    }
}

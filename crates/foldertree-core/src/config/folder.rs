//! Folder tree configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default maximum nesting depth below the virtual root.
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// Structural limits of the folder tree.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FolderConfig {
    /// Maximum number of edges between the virtual root and any folder.
    ///
    /// Also bounds every traversal, so corrupted cyclic rows are detected
    /// instead of walked forever.
    #[serde(default = "default_max_depth")]
    #[validate(range(min = 1, max = 64))]
    pub max_depth: u32,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

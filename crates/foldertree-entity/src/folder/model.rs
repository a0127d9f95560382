//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use foldertree_core::types::{FolderId, OrgId};

/// UID of the virtual root every tenant has. Never persisted.
pub const GENERAL_FOLDER_UID: &str = "general";

/// Whether `uid` designates the virtual root rather than a stored folder.
pub fn is_root_uid(uid: &str) -> bool {
    uid.is_empty() || uid == GENERAL_FOLDER_UID
}

/// A folder in a tenant's tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Store-assigned identifier.
    pub id: FolderId,
    /// Tenant-unique external identifier.
    pub uid: String,
    /// Owning tenant.
    pub org_id: OrgId,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// UID of the parent folder (`None` for top-level folders).
    pub parent_uid: Option<String>,
    /// When the folder was created.
    pub created: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated: DateTime<Utc>,
}

impl Folder {
    /// Check if this folder hangs directly off the virtual root.
    pub fn is_top_level(&self) -> bool {
        self.parent_uid.as_deref().is_none_or(is_root_uid)
    }

    /// The parent UID, with root sentinels folded into `None`.
    pub fn parent(&self) -> Option<&str> {
        self.parent_uid.as_deref().filter(|uid| !is_root_uid(uid))
    }
}

//! Commands and queries accepted by the folder store.
//!
//! Each type validates its own structure (required identifiers, field
//! lengths, lookup ambiguity) so the store can reject bad input before it
//! opens a transaction. Existence and tree-shape rules are checked by the
//! store itself.

use serde::{Deserialize, Serialize};
use validator::Validate;

use foldertree_core::error::AppError;
use foldertree_core::result::AppResult;
use foldertree_core::types::{FolderId, OrgId, PageRequest};

use super::model::{Folder, GENERAL_FOLDER_UID, is_root_uid};

/// Request to create a new folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateFolderCommand {
    /// Caller-supplied UID; the store never generates one.
    #[validate(length(min = 1, max = 40, message = "uid must be 1 to 40 characters"))]
    pub uid: String,
    /// Folder title.
    #[validate(length(min = 1, max = 189, message = "title must be 1 to 189 characters"))]
    pub title: String,
    /// Folder description.
    #[serde(default)]
    pub description: String,
    /// Owning tenant.
    pub org_id: OrgId,
    /// Parent folder UID (`None`, empty or `"general"` for the virtual root).
    #[serde(default)]
    pub parent_uid: Option<String>,
}

impl CreateFolderCommand {
    /// Reject structurally invalid commands.
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        check_uid(&self.uid)?;
        check_org(self.org_id)
    }

    /// The parent UID, with root sentinels folded into `None`.
    pub fn parent(&self) -> Option<&str> {
        self.parent_uid.as_deref().filter(|uid| !is_root_uid(uid))
    }
}

/// Query for a single folder by exactly one key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetFolderQuery {
    /// Look up by UID.
    pub uid: Option<String>,
    /// Look up by title.
    pub title: Option<String>,
    /// Look up by internal id.
    pub id: Option<FolderId>,
    /// Tenant scope; optional only for lookups by id.
    pub org_id: Option<OrgId>,
}

/// A validated single-folder lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderLookup {
    /// By internal id, optionally restricted to one tenant.
    Id {
        /// Folder id.
        id: FolderId,
        /// Tenant restriction.
        org_id: Option<OrgId>,
    },
    /// By UID within a tenant.
    Uid {
        /// Tenant.
        org_id: OrgId,
        /// Folder UID.
        uid: String,
    },
    /// By title within a tenant; the oldest match wins.
    Title {
        /// Tenant.
        org_id: OrgId,
        /// Folder title.
        title: String,
    },
}

impl GetFolderQuery {
    /// Query by UID.
    pub fn by_uid(org_id: OrgId, uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            org_id: Some(org_id),
            ..Self::default()
        }
    }

    /// Query by title.
    pub fn by_title(org_id: OrgId, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            org_id: Some(org_id),
            ..Self::default()
        }
    }

    /// Query by internal id.
    pub fn by_id(id: FolderId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Resolve the query into exactly one lookup key.
    pub fn lookup(&self) -> AppResult<FolderLookup> {
        let keys = [
            self.uid.is_some(),
            self.title.is_some(),
            self.id.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();

        if keys != 1 {
            return Err(AppError::validation(format!(
                "exactly one of uid, title or id is required, got {keys}"
            )));
        }

        if let Some(id) = self.id {
            if !id.is_set() {
                return Err(AppError::validation(format!("invalid folder id {id}")));
            }
            let org_id = self.org_id.filter(|org| org.is_set());
            return Ok(FolderLookup::Id { id, org_id });
        }

        let org_id = self
            .org_id
            .ok_or_else(|| AppError::validation("org_id is required unless looking up by id"))?;
        check_org(org_id)?;

        match (&self.uid, &self.title) {
            (Some(uid), None) => {
                if uid.trim().is_empty() {
                    return Err(AppError::validation("uid must not be empty"));
                }
                Ok(FolderLookup::Uid {
                    org_id,
                    uid: uid.clone(),
                })
            }
            (None, Some(title)) => {
                if title.is_empty() {
                    return Err(AppError::validation("title must not be empty"));
                }
                Ok(FolderLookup::Title {
                    org_id,
                    title: title.clone(),
                })
            }
            _ => Err(AppError::internal("lookup key count mismatch")),
        }
    }
}

/// Request to change an existing folder's title, description or UID.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateFolderCommand {
    /// The folder being updated; its id, or its uid and org, identify the row.
    pub folder: Option<Folder>,
    /// New UID.
    #[validate(length(min = 1, max = 40, message = "new uid must be 1 to 40 characters"))]
    pub new_uid: Option<String>,
    /// New title.
    #[validate(length(min = 1, max = 189, message = "new title must be 1 to 189 characters"))]
    pub new_title: Option<String>,
    /// New description.
    pub new_description: Option<String>,
}

/// A validated reference to one stored folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderRef {
    /// By internal id, optionally restricted to one tenant.
    Id {
        /// Folder id.
        id: FolderId,
        /// Tenant restriction.
        org_id: Option<OrgId>,
    },
    /// By UID within a tenant.
    Uid {
        /// Tenant.
        org_id: OrgId,
        /// Folder UID.
        uid: String,
    },
}

impl UpdateFolderCommand {
    /// Reject structurally invalid commands and resolve the target folder.
    pub fn check(&self) -> AppResult<FolderRef> {
        let folder = self
            .folder
            .as_ref()
            .ok_or_else(|| AppError::validation("update requires a folder reference"))?;

        let target = if folder.id.is_set() {
            FolderRef::Id {
                id: folder.id,
                org_id: Some(folder.org_id).filter(|org| org.is_set()),
            }
        } else if !folder.uid.trim().is_empty() && folder.org_id.is_set() {
            FolderRef::Uid {
                org_id: folder.org_id,
                uid: folder.uid.clone(),
            }
        } else {
            return Err(AppError::validation(
                "update requires a folder id, or a uid with an org_id",
            ));
        };

        self.validate()?;
        if let Some(uid) = &self.new_uid {
            check_uid(uid)?;
        }
        Ok(target)
    }

    /// Whether the command changes nothing but the `updated` timestamp.
    pub fn is_noop(&self) -> bool {
        self.new_uid.is_none() && self.new_title.is_none() && self.new_description.is_none()
    }
}

/// Query for a folder's ancestor chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetParentsQuery {
    /// Folder whose ancestors are requested.
    pub uid: String,
    /// Tenant scope.
    pub org_id: OrgId,
}

impl GetParentsQuery {
    /// Build a query.
    pub fn new(org_id: OrgId, uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            org_id,
        }
    }
}

/// Query for the direct children of a folder (or of the virtual root).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetChildrenQuery {
    /// Parent UID; empty or `"general"` means the virtual root.
    #[serde(default)]
    pub uid: String,
    /// Tenant scope.
    pub org_id: OrgId,
    /// Page size; unset or zero returns every child.
    #[serde(default)]
    pub limit: Option<u64>,
    /// 1-based page; unset or below 1 means the first page.
    #[serde(default)]
    pub page: Option<u64>,
}

impl GetChildrenQuery {
    /// Build an unpaginated query.
    pub fn new(org_id: OrgId, uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            org_id,
            ..Self::default()
        }
    }

    /// Restrict the query to one page.
    pub fn paged(mut self, limit: u64, page: u64) -> Self {
        self.limit = Some(limit);
        self.page = Some(page);
        self
    }

    /// The parent UID, with root sentinels folded into `None`.
    pub fn parent(&self) -> Option<&str> {
        Some(self.uid.as_str()).filter(|uid| !is_root_uid(uid))
    }

    /// The page window, or `None` for every child.
    pub fn page_request(&self) -> Option<PageRequest> {
        PageRequest::from_query(self.limit, self.page)
    }
}

fn check_uid(uid: &str) -> AppResult<()> {
    if uid.trim().is_empty() {
        return Err(AppError::validation("uid must not be blank"));
    }
    if uid == GENERAL_FOLDER_UID {
        return Err(AppError::validation(format!(
            "uid '{GENERAL_FOLDER_UID}' is reserved for the root folder"
        )));
    }
    Ok(())
}

fn check_org(org_id: OrgId) -> AppResult<()> {
    if !org_id.is_set() {
        return Err(AppError::validation(format!("invalid org_id {org_id}")));
    }
    Ok(())
}

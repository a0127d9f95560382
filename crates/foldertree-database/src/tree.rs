//! Tree integrity checks over flat parent-pointer rows.
//!
//! The walker computes ancestor chains, insertion depths and subtree
//! heights on demand. Every walk is bounded by the configured nesting limit
//! and tracks visited UIDs, so corrupted rows that form a cycle produce a
//! `CircularReference` error instead of an endless loop.
//!
//! Orphans (rows whose `parent_uid` no longer resolves) are treated as if
//! they were attached to the virtual root.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::warn;

use foldertree_core::error::AppError;
use foldertree_core::result::AppResult;
use foldertree_core::types::OrgId;
use foldertree_entity::folder::{Folder, GENERAL_FOLDER_UID};

use crate::error::map_sqlx;

/// Select list shared by every folder query.
pub(crate) const FOLDER_COLUMNS: &str =
    "f.id, f.uid, f.org_id, f.title, f.description, f.parent_uid, f.created, f.updated";

/// Read access to the rows a traversal needs.
#[async_trait]
pub trait TreeSource: Send {
    /// Find a folder by UID within a tenant.
    async fn folder(&mut self, org_id: OrgId, uid: &str) -> AppResult<Option<Folder>>;

    /// List direct children ordered by title then id.
    ///
    /// `None` lists the virtual root's children: top-level folders plus
    /// orphans.
    async fn children(&mut self, org_id: OrgId, parent: Option<&str>) -> AppResult<Vec<Folder>>;
}

#[async_trait]
impl TreeSource for SqliteConnection {
    async fn folder(&mut self, org_id: OrgId, uid: &str) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folder f WHERE f.org_id = ? AND f.uid = ?"
        ))
        .bind(org_id)
        .bind(uid)
        .fetch_optional(&mut *self)
        .await
        .map_err(|e| map_sqlx("Failed to find folder", e))
    }

    async fn children(&mut self, org_id: OrgId, parent: Option<&str>) -> AppResult<Vec<Folder>> {
        let sql = children_sql(parent.is_none());
        let mut query = sqlx::query_as::<_, Folder>(&sql).bind(org_id);
        if let Some(parent_uid) = parent {
            query = query.bind(parent_uid.to_string());
        }
        query
            .fetch_all(&mut *self)
            .await
            .map_err(|e| map_sqlx("Failed to list children", e))
    }
}

/// `WHERE` fragment selecting the children of a folder, or of the virtual
/// root when `root` is set. Binds the parent UID unless `root` is set.
pub(crate) fn parent_filter(root: bool) -> &'static str {
    if root {
        "(f.parent_uid IS NULL OR f.parent_uid IN ('', 'general') \
         OR NOT EXISTS (SELECT 1 FROM folder p WHERE p.org_id = f.org_id AND p.uid = f.parent_uid))"
    } else {
        "f.parent_uid = ?"
    }
}

/// SQL listing children in their stable order.
///
/// Binds `org_id`, then the parent UID unless `root` is set.
pub(crate) fn children_sql(root: bool) -> String {
    format!(
        "SELECT {FOLDER_COLUMNS} FROM folder f WHERE f.org_id = ? AND {} \
         ORDER BY f.title ASC, f.id ASC",
        parent_filter(root)
    )
}

/// Bounded traversals over a [`TreeSource`].
#[derive(Debug, Clone, Copy)]
pub struct TreeWalker {
    max_depth: u32,
}

impl TreeWalker {
    /// Create a walker bounded by `max_depth` levels.
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// The configured nesting limit.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Ancestors of `folder`, top-most first, immediate parent last.
    pub async fn ancestors<S>(&self, source: &mut S, folder: &Folder) -> AppResult<Vec<Folder>>
    where
        S: TreeSource + ?Sized,
    {
        let mut chain: Vec<Folder> = Vec::new();
        let mut seen = HashSet::from([folder.uid.clone()]);
        let mut next = folder.parent().map(str::to_owned);

        while let Some(uid) = next {
            if chain.len() as u32 >= self.max_depth {
                warn!(org_id = %folder.org_id, uid = %folder.uid, "Ancestor walk exceeded max depth");
                return Err(AppError::circular_reference(format!(
                    "ancestors of '{}' in org {} exceed {} levels",
                    folder.uid, folder.org_id, self.max_depth
                )));
            }

            let Some(parent) = source.folder(folder.org_id, &uid).await? else {
                warn!(
                    org_id = %folder.org_id,
                    missing_parent = %uid,
                    "Treating orphaned folder as top-level"
                );
                break;
            };

            if !seen.insert(parent.uid.clone()) {
                warn!(org_id = %folder.org_id, uid = %parent.uid, "Cycle in folder ancestry");
                return Err(AppError::circular_reference(format!(
                    "folder '{}' in org {} is its own ancestor",
                    parent.uid, folder.org_id
                )));
            }

            next = parent.parent().map(str::to_owned);
            chain.push(parent);
        }

        chain.reverse();
        Ok(chain)
    }

    /// Depth of `folder` below the virtual root (a top-level folder is 1).
    pub async fn depth<S>(&self, source: &mut S, folder: &Folder) -> AppResult<u32>
    where
        S: TreeSource + ?Sized,
    {
        let ancestors = self.ancestors(source, folder).await?;
        Ok(ancestors.len() as u32 + 1)
    }

    /// Height of the subtree under `start` (`None` for the virtual root).
    ///
    /// Fails with `CircularReference` if `must_not_contain` occurs anywhere
    /// in the subtree, the starting folder included.
    pub async fn height<S>(
        &self,
        source: &mut S,
        org_id: OrgId,
        start: Option<&str>,
        must_not_contain: Option<&str>,
    ) -> AppResult<u32>
    where
        S: TreeSource + ?Sized,
    {
        self.height_avoiding(source, org_id, start, must_not_contain.as_slice())
            .await
    }

    /// Like [`TreeWalker::height`], failing if any of `forbidden` occurs in
    /// the subtree.
    ///
    /// `start` does not have to be stored yet: the walk only follows
    /// `parent_uid` links, so it also measures the rows that would hang
    /// under a UID that is about to be created.
    pub async fn height_avoiding<S>(
        &self,
        source: &mut S,
        org_id: OrgId,
        start: Option<&str>,
        forbidden: &[&str],
    ) -> AppResult<u32>
    where
        S: TreeSource + ?Sized,
    {
        let is_forbidden = |uid: &str| forbidden.iter().any(|f| *f == uid);
        let mut seen: HashSet<String> = HashSet::new();

        if let Some(uid) = start {
            if is_forbidden(uid) {
                return Err(contains_error(org_id, uid, uid));
            }
            seen.insert(uid.to_owned());
        }

        let mut frontier: Vec<Option<String>> = vec![start.map(str::to_owned)];
        let mut height = 0u32;

        loop {
            let mut next = Vec::new();
            for parent in &frontier {
                for child in source.children(org_id, parent.as_deref()).await? {
                    if is_forbidden(&child.uid) {
                        return Err(contains_error(org_id, start.unwrap_or(GENERAL_FOLDER_UID), &child.uid));
                    }
                    if !seen.insert(child.uid.clone()) {
                        warn!(%org_id, uid = %child.uid, "Cycle in folder subtree");
                        return Err(AppError::circular_reference(format!(
                            "folder '{}' in org {} is reachable twice",
                            child.uid, org_id
                        )));
                    }
                    next.push(Some(child.uid));
                }
            }

            if next.is_empty() {
                return Ok(height);
            }

            height += 1;
            if height > self.max_depth {
                warn!(%org_id, start = ?start, "Subtree walk exceeded max depth");
                return Err(AppError::circular_reference(format!(
                    "subtree of '{}' in org {} exceeds {} levels",
                    start.unwrap_or(GENERAL_FOLDER_UID),
                    org_id,
                    self.max_depth
                )));
            }
            frontier = next;
        }
    }
}

fn contains_error(org_id: OrgId, root: &str, uid: &str) -> AppError {
    AppError::circular_reference(format!(
        "folder '{uid}' is inside the subtree of '{root}' in org {org_id}"
    ))
}

//! Transactional folder store.
//!
//! Every operation runs in its own transaction: mutations observe their
//! existence, uniqueness and depth checks together with the write, and
//! reads see one consistent snapshot. Dropping an in-flight operation drops
//! its transaction, which rolls back any partial write.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use foldertree_core::config::FolderConfig;
use foldertree_core::error::AppError;
use foldertree_core::result::AppResult;
use foldertree_core::types::{FolderId, OrgId};
use foldertree_entity::folder::{
    CreateFolderCommand, Folder, FolderLookup, FolderRef, GetChildrenQuery, GetFolderQuery,
    GetParentsQuery, UpdateFolderCommand, is_root_uid,
};

use crate::error::map_sqlx;
use crate::tree::{FOLDER_COLUMNS, TreeSource, TreeWalker, children_sql, parent_filter};

/// Store for tenant-scoped folder trees.
#[derive(Debug, Clone)]
pub struct FolderStore {
    pool: SqlitePool,
    walker: TreeWalker,
}

impl FolderStore {
    /// Create a new folder store.
    pub fn new(pool: SqlitePool, config: &FolderConfig) -> Self {
        Self {
            pool,
            walker: TreeWalker::new(config.max_depth),
        }
    }

    /// The configured nesting limit.
    pub fn max_depth(&self) -> u32 {
        self.walker.max_depth()
    }

    /// Create a folder under an existing parent or the virtual root.
    pub async fn create(&self, cmd: &CreateFolderCommand) -> AppResult<Folder> {
        cmd.check()?;
        let mut tx = self.begin().await?;

        if TreeSource::folder(&mut *tx, cmd.org_id, &cmd.uid).await?.is_some() {
            return Err(AppError::conflict(format!(
                "folder '{}' already exists in org {}",
                cmd.uid, cmd.org_id
            )));
        }

        // Ancestors of the new row, top-most first, parent included.
        let lineage = match cmd.parent() {
            Some(parent_uid) => {
                let parent = TreeSource::folder(&mut *tx, cmd.org_id, parent_uid)
                    .await?
                    .ok_or_else(|| {
                        AppError::parent_not_found(format!(
                            "parent folder '{}' not found in org {}",
                            parent_uid, cmd.org_id
                        ))
                    })?;
                let mut lineage = self.walker.ancestors(&mut *tx, &parent).await?;
                lineage.push(parent);
                lineage
            }
            None => Vec::new(),
        };

        let depth = lineage.len() as u32 + 1;
        let parent_uid = lineage.last().map(|parent| parent.uid.clone());
        if depth > self.walker.max_depth() {
            return Err(AppError::max_depth_exceeded(format!(
                "folder '{}' would be at depth {depth} under '{}' in org {}, limit is {}",
                cmd.uid,
                parent_uid.as_deref().unwrap_or_default(),
                cmd.org_id,
                self.walker.max_depth()
            )));
        }

        if count_children_of(&mut tx, cmd.org_id, &cmd.uid).await? > 0 {
            let forbidden: Vec<&str> = lineage.iter().map(|f| f.uid.as_str()).collect();
            self.check_adoption(&mut tx, cmd.org_id, &cmd.uid, depth, &forbidden)
                .await?;
        }

        let now = Utc::now();
        let folder = sqlx::query_as::<_, Folder>(
            "INSERT INTO folder (uid, org_id, title, description, parent_uid, created, updated) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&cmd.uid)
        .bind(cmd.org_id)
        .bind(&cmd.title)
        .bind(&cmd.description)
        .bind(&parent_uid)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx("Failed to create folder", e))?;

        self.commit(tx).await?;

        info!(
            org_id = %folder.org_id,
            folder_id = %folder.id,
            uid = %folder.uid,
            parent_uid = ?folder.parent_uid,
            "Folder created"
        );
        Ok(folder)
    }

    /// Get a single folder by id, UID or title.
    pub async fn get(&self, query: &GetFolderQuery) -> AppResult<Folder> {
        let lookup = query.lookup()?;
        debug!(?lookup, "Getting folder");

        let mut tx = self.begin().await?;
        let found = match &lookup {
            FolderLookup::Id { id, org_id } => find_by_id(&mut tx, *id, *org_id).await?,
            FolderLookup::Uid { org_id, uid } => {
                TreeSource::folder(&mut *tx, *org_id, uid).await?
            }
            FolderLookup::Title { org_id, title } => {
                sqlx::query_as::<_, Folder>(&format!(
                    "SELECT {FOLDER_COLUMNS} FROM folder f WHERE f.org_id = ? AND f.title = ? \
                     ORDER BY f.id ASC LIMIT 1"
                ))
                .bind(*org_id)
                .bind(title)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx("Failed to find folder by title", e))?
            }
        };
        self.commit(tx).await?;

        found.ok_or_else(|| AppError::not_found(describe_lookup(&lookup)))
    }

    /// Update title, description and/or UID of an existing folder.
    ///
    /// A UID rename also rewrites the `parent_uid` of every child in the
    /// same transaction, so the children stay attached.
    pub async fn update(&self, cmd: &UpdateFolderCommand) -> AppResult<Folder> {
        let target = cmd.check()?;
        let mut tx = self.begin().await?;

        let existing = match &target {
            FolderRef::Id { id, org_id } => find_by_id(&mut tx, *id, *org_id).await?,
            FolderRef::Uid { org_id, uid } => TreeSource::folder(&mut *tx, *org_id, uid).await?,
        }
        .ok_or_else(|| AppError::not_found(describe_ref(&target)))?;

        let new_uid = cmd
            .new_uid
            .as_deref()
            .filter(|uid| *uid != existing.uid);

        if let Some(new_uid) = new_uid {
            if TreeSource::folder(&mut *tx, existing.org_id, new_uid)
                .await?
                .is_some()
            {
                return Err(AppError::conflict(format!(
                    "folder '{new_uid}' already exists in org {}",
                    existing.org_id
                )));
            }

            if count_children_of(&mut tx, existing.org_id, new_uid).await? > 0 {
                let lineage = self.walker.ancestors(&mut *tx, &existing).await?;
                let mut forbidden: Vec<&str> = lineage.iter().map(|f| f.uid.as_str()).collect();
                forbidden.push(&existing.uid);
                let depth = lineage.len() as u32 + 1;
                self.check_adoption(&mut tx, existing.org_id, new_uid, depth, &forbidden)
                    .await?;
            }

            let moved = sqlx::query(
                "UPDATE folder SET parent_uid = ? WHERE org_id = ? AND parent_uid = ?",
            )
            .bind(new_uid)
            .bind(existing.org_id)
            .bind(&existing.uid)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx("Failed to re-point children", e))?;

            debug!(
                org_id = %existing.org_id,
                old_uid = %existing.uid,
                new_uid,
                children = moved.rows_affected(),
                "Re-pointed children to renamed folder"
            );
        }

        let folder = sqlx::query_as::<_, Folder>(
            "UPDATE folder SET uid = ?, title = ?, description = ?, updated = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(new_uid.unwrap_or(&existing.uid))
        .bind(cmd.new_title.as_ref().unwrap_or(&existing.title))
        .bind(cmd.new_description.as_ref().unwrap_or(&existing.description))
        .bind(Utc::now())
        .bind(existing.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx("Failed to update folder", e))?;

        self.commit(tx).await?;

        info!(
            org_id = %folder.org_id,
            folder_id = %folder.id,
            uid = %folder.uid,
            renamed = new_uid.is_some(),
            "Folder updated"
        );
        Ok(folder)
    }

    /// Delete exactly one folder. Children are left in place as orphans.
    pub async fn delete(&self, uid: &str, org_id: OrgId) -> AppResult<()> {
        if is_root_uid(uid) {
            return Err(AppError::validation("delete requires a folder uid"));
        }
        let mut tx = self.begin().await?;

        let orphaned = count_children_of(&mut tx, org_id, uid).await?;

        let result = sqlx::query("DELETE FROM folder WHERE org_id = ? AND uid = ?")
            .bind(org_id)
            .bind(uid)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx("Failed to delete folder", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "folder '{uid}' not found in org {org_id}"
            )));
        }

        self.commit(tx).await?;

        info!(%org_id, uid, orphaned, "Folder deleted");
        Ok(())
    }

    /// Ancestors of a folder, top-most first and immediate parent last.
    pub async fn get_parents(&self, query: &GetParentsQuery) -> AppResult<Vec<Folder>> {
        debug!(org_id = %query.org_id, uid = %query.uid, "Getting parents");
        if is_root_uid(&query.uid) {
            return Err(AppError::not_found("the root folder is not a stored folder"));
        }

        let mut tx = self.begin().await?;
        let folder = self.require(&mut tx, query.org_id, &query.uid).await?;
        let parents = self.walker.ancestors(&mut *tx, &folder).await?;
        self.commit(tx).await?;
        Ok(parents)
    }

    /// Direct children of a folder (or of the virtual root), optionally
    /// paginated.
    pub async fn get_children(&self, query: &GetChildrenQuery) -> AppResult<Vec<Folder>> {
        let parent = query.parent();
        let page = query.page_request();
        debug!(org_id = %query.org_id, ?parent, ?page, "Getting children");

        let mut tx = self.begin().await?;
        if let Some(parent_uid) = parent {
            self.require(&mut tx, query.org_id, parent_uid).await?;
        }

        let mut sql = children_sql(parent.is_none());
        if page.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
        }

        let mut rows = sqlx::query_as::<_, Folder>(&sql).bind(query.org_id);
        if let Some(parent_uid) = parent {
            rows = rows.bind(parent_uid);
        }
        if let Some(page) = page {
            rows = rows
                .bind(i64::try_from(page.limit()).unwrap_or(i64::MAX))
                .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
        }

        let children = rows
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx("Failed to list children", e))?;
        self.commit(tx).await?;
        Ok(children)
    }

    /// Number of edges on the longest downward path below a folder.
    ///
    /// An empty or `"general"` UID measures from the virtual root. Fails
    /// with `CircularReference` if `must_not_contain` is inside the subtree.
    pub async fn get_height(
        &self,
        uid: &str,
        org_id: OrgId,
        must_not_contain: Option<&str>,
    ) -> AppResult<u32> {
        let start = Some(uid).filter(|uid| !is_root_uid(uid));
        debug!(%org_id, ?start, ?must_not_contain, "Getting height");

        let mut tx = self.begin().await?;
        if let Some(uid) = start {
            self.require(&mut tx, org_id, uid).await?;
        }
        let height = self
            .walker
            .height(&mut *tx, org_id, start, must_not_contain)
            .await?;
        self.commit(tx).await?;
        Ok(height)
    }

    /// Count direct children of a folder (or of the virtual root).
    pub async fn count_children(&self, uid: &str, org_id: OrgId) -> AppResult<u64> {
        let parent = Some(uid).filter(|uid| !is_root_uid(uid));
        let sql = format!(
            "SELECT COUNT(*) FROM folder f WHERE f.org_id = ? AND {}",
            parent_filter(parent.is_none())
        );
        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(org_id);
        if let Some(parent_uid) = parent {
            query = query.bind(parent_uid.to_string());
        }
        let count = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to count children", e))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn begin(&self) -> AppResult<sqlx::Transaction<'static, sqlx::Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx("Failed to begin transaction", e))
    }

    async fn commit(&self, tx: sqlx::Transaction<'static, sqlx::Sqlite>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(|e| map_sqlx("Failed to commit transaction", e))
    }

    /// Reject taking over the rows whose `parent_uid` already names `uid`
    /// when they would close a cycle or nest deeper than the limit.
    ///
    /// `depth` is where `uid` will sit; `forbidden` holds its ancestors (and,
    /// for a rename, the renamed folder itself).
    async fn check_adoption(
        &self,
        conn: &mut SqliteConnection,
        org_id: OrgId,
        uid: &str,
        depth: u32,
        forbidden: &[&str],
    ) -> AppResult<()> {
        let height = self
            .walker
            .height_avoiding(conn, org_id, Some(uid), forbidden)
            .await?;

        if depth + height > self.walker.max_depth() {
            return Err(AppError::max_depth_exceeded(format!(
                "folder '{uid}' at depth {depth} would adopt a subtree of height {height} \
                 in org {org_id}, limit is {}",
                self.walker.max_depth()
            )));
        }

        debug!(%org_id, uid, depth, height, "Adopting folders left by an earlier delete");
        Ok(())
    }

    async fn require(
        &self,
        conn: &mut SqliteConnection,
        org_id: OrgId,
        uid: &str,
    ) -> AppResult<Folder> {
        TreeSource::folder(conn, org_id, uid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("folder '{uid}' not found in org {org_id}")))
    }
}

async fn find_by_id(
    conn: &mut SqliteConnection,
    id: FolderId,
    org_id: Option<OrgId>,
) -> AppResult<Option<Folder>> {
    let folder = sqlx::query_as::<_, Folder>(&format!(
        "SELECT {FOLDER_COLUMNS} FROM folder f WHERE f.id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(|e| map_sqlx("Failed to find folder", e))?;

    Ok(folder.filter(|f| org_id.is_none_or(|org| org == f.org_id)))
}

/// Rows whose `parent_uid` names `uid`, whether or not `uid` is stored.
async fn count_children_of(
    conn: &mut SqliteConnection,
    org_id: OrgId,
    uid: &str,
) -> AppResult<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM folder WHERE org_id = ? AND parent_uid = ?")
        .bind(org_id)
        .bind(uid)
        .fetch_one(conn)
        .await
        .map_err(|e| map_sqlx("Failed to count children", e))
}

fn describe_lookup(lookup: &FolderLookup) -> String {
    match lookup {
        FolderLookup::Id { id, .. } => format!("folder with id {id} not found"),
        FolderLookup::Uid { org_id, uid } => format!("folder '{uid}' not found in org {org_id}"),
        FolderLookup::Title { org_id, title } => {
            format!("folder titled '{title}' not found in org {org_id}")
        }
    }
}

fn describe_ref(target: &FolderRef) -> String {
    match target {
        FolderRef::Id { id, .. } => format!("folder with id {id} not found"),
        FolderRef::Uid { org_id, uid } => format!("folder '{uid}' not found in org {org_id}"),
    }
}

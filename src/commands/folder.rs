//! Folder management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use foldertree_core::config::AppConfig;
use foldertree_core::error::AppError;
use foldertree_core::types::{FolderId, OrgId};
use foldertree_entity::folder::{
    CreateFolderCommand, Folder, GetChildrenQuery, GetFolderQuery, GetParentsQuery,
    UpdateFolderCommand,
};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Create a new folder
    Create {
        /// Folder title
        #[arg(short, long)]
        title: String,
        /// Folder UID (generated when omitted)
        #[arg(short, long)]
        uid: Option<String>,
        /// Folder description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Parent folder UID (omit for the root)
        #[arg(short, long)]
        parent_uid: Option<String>,
    },
    /// Show a single folder
    Get {
        /// Look up by UID
        #[arg(long, conflicts_with_all = ["title", "id"])]
        uid: Option<String>,
        /// Look up by title
        #[arg(long, conflicts_with = "id")]
        title: Option<String>,
        /// Look up by internal id
        #[arg(long)]
        id: Option<i64>,
    },
    /// Change a folder's title, description or UID
    Update {
        /// UID of the folder to update
        uid: String,
        /// New UID
        #[arg(long)]
        new_uid: Option<String>,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a single folder (children become top-level)
    Delete {
        /// UID of the folder to delete
        uid: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// List the ancestors of a folder, top-most first
    Parents {
        /// Folder UID
        uid: String,
    },
    /// List the direct children of a folder
    Children {
        /// Parent UID (omit for the root)
        #[arg(default_value = "")]
        uid: String,
        /// Page size (0 lists every child)
        #[arg(short, long)]
        limit: Option<u64>,
        /// Page number, starting at 1
        #[arg(long)]
        page: Option<u64>,
    },
    /// Show the height of the subtree below a folder
    Height {
        /// Folder UID (omit for the root)
        #[arg(default_value = "")]
        uid: String,
        /// Fail if this UID is inside the subtree
        #[arg(long)]
        must_not_contain: Option<String>,
    },
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: i64,
    /// UID
    uid: String,
    /// Title
    title: String,
    /// Parent UID
    parent: String,
    /// Description
    description: String,
    /// Last update
    updated: String,
}

impl From<&Folder> for FolderRow {
    fn from(f: &Folder) -> Self {
        Self {
            id: f.id.get(),
            uid: f.uid.clone(),
            title: f.title.clone(),
            parent: f.parent().unwrap_or("-").to_string(),
            description: f.description.clone(),
            updated: f.updated.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn rows(folders: &[Folder]) -> Vec<FolderRow> {
    folders.iter().map(FolderRow::from).collect()
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    config: &AppConfig,
    org_id: OrgId,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::open_store(config).await?;

    match &args.command {
        FolderCommand::Create {
            title,
            uid,
            description,
            parent_uid,
        } => {
            let uid = uid
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
            let folder = store
                .create(&CreateFolderCommand {
                    uid,
                    title: title.clone(),
                    description: description.clone(),
                    org_id,
                    parent_uid: parent_uid.clone(),
                })
                .await?;

            output::print_success(&format!(
                "Folder '{}' created (uid: {}, id: {})",
                folder.title, folder.uid, folder.id
            ));
        }
        FolderCommand::Get { uid, title, id } => {
            let query = GetFolderQuery {
                uid: uid.clone(),
                title: title.clone(),
                id: id.map(FolderId),
                org_id: Some(org_id),
            };
            let folder = store.get(&query).await?;
            output::print_item(&FolderRow::from(&folder), format);
        }
        FolderCommand::Update {
            uid,
            new_uid,
            title,
            description,
        } => {
            let cmd = UpdateFolderCommand {
                folder: Some(Folder {
                    uid: uid.clone(),
                    org_id,
                    ..Folder::default()
                }),
                new_uid: new_uid.clone(),
                new_title: title.clone(),
                new_description: description.clone(),
            };
            if cmd.is_noop() {
                output::print_warning("Nothing to change; only the update time will move.");
            }
            let folder = store.update(&cmd).await?;
            output::print_success(&format!("Folder '{}' updated", folder.uid));
        }
        FolderCommand::Delete { uid, force } => {
            if !force {
                let children = store.count_children(uid, org_id).await?;
                let prompt = if children > 0 {
                    format!(
                        "Delete folder '{uid}'? Its {children} child folder(s) will become top-level."
                    )
                } else {
                    format!("Delete folder '{uid}'?")
                };
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(prompt)
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            store.delete(uid, org_id).await?;
            output::print_success(&format!("Folder '{}' deleted", uid));
        }
        FolderCommand::Parents { uid } => {
            let parents = store.get_parents(&GetParentsQuery::new(org_id, uid)).await?;
            output::print_list(&rows(&parents), format);
        }
        FolderCommand::Children { uid, limit, page } => {
            let query = GetChildrenQuery {
                uid: uid.clone(),
                org_id,
                limit: *limit,
                page: *page,
            };
            let children = store.get_children(&query).await?;
            output::print_list(&rows(&children), format);
        }
        FolderCommand::Height {
            uid,
            must_not_contain,
        } => {
            let height = store
                .get_height(uid, org_id, must_not_contain.as_deref())
                .await?;
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "uid": uid,
                    "height": height,
                    "max_depth": store.max_depth(),
                })),
                OutputFormat::Table => {
                    output::print_kv("height", &height.to_string());
                    output::print_kv("max_depth", &store.max_depth().to_string());
                }
            }
        }
    }

    Ok(())
}

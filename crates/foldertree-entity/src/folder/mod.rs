//! Folder domain entities.

pub mod command;
pub mod model;

pub use command::{
    CreateFolderCommand, FolderLookup, FolderRef, GetChildrenQuery, GetFolderQuery,
    GetParentsQuery, UpdateFolderCommand,
};
pub use model::{Folder, GENERAL_FOLDER_UID, is_root_uid};

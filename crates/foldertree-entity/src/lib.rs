//! # foldertree-entity
//!
//! Domain entity models for FolderTree. [`folder::Folder`] maps one
//! database row; the command and query types describe every store
//! operation and know how to reject structurally invalid input.

pub mod folder;

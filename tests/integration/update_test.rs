//! Integration tests for folder updates.

mod helpers;

use foldertree_core::error::ErrorKind;
use foldertree_core::types::FolderId;
use foldertree_entity::folder::{
    Folder, GetChildrenQuery, GetFolderQuery, GetParentsQuery, UpdateFolderCommand,
};
use helpers::{ORG, TestApp, uids};

fn by_uid(uid: &str) -> Option<Folder> {
    Some(Folder {
        uid: uid.to_string(),
        org_id: ORG,
        ..Folder::default()
    })
}

#[tokio::test]
async fn test_update_title_and_description() {
    let app = TestApp::new().await;
    let original = app.create_folder("abc", None).await;

    let updated = app
        .store
        .update(&UpdateFolderCommand {
            folder: by_uid("abc"),
            new_title: Some("new title".into()),
            new_description: Some("new desc".into()),
            ..UpdateFolderCommand::default()
        })
        .await
        .expect("update");

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.uid, "abc");
    assert_eq!(updated.title, "new title");
    assert_eq!(updated.description, "new desc");
    assert_eq!(updated.created, original.created);
    assert!(updated.updated >= original.updated);
}

#[tokio::test]
async fn test_update_by_id_keeps_unset_fields() {
    let app = TestApp::new().await;
    let original = app.create_folder("abc", None).await;

    let updated = app
        .store
        .update(&UpdateFolderCommand {
            folder: Some(Folder {
                id: original.id,
                ..Folder::default()
            }),
            new_description: Some("only this".into()),
            ..UpdateFolderCommand::default()
        })
        .await
        .expect("update");

    assert_eq!(updated.title, original.title);
    assert_eq!(updated.description, "only this");
}

#[tokio::test]
async fn test_noop_update_only_moves_timestamp() {
    let app = TestApp::new().await;
    let original = app.create_folder("abc", None).await;

    let cmd = UpdateFolderCommand {
        folder: by_uid("abc"),
        ..UpdateFolderCommand::default()
    };
    assert!(cmd.is_noop());
    let updated = app.store.update(&cmd).await.expect("update");

    assert_eq!(updated.title, original.title);
    assert_eq!(updated.description, original.description);
    assert!(updated.updated >= original.updated);
}

#[tokio::test]
async fn test_rename_uid_keeps_children_attached() {
    let app = TestApp::new().await;
    app.create_sub_tree(&["parent", "child", "grandchild"], None).await;
    app.create_folder("sibling", Some("parent")).await;

    let renamed = app
        .store
        .update(&UpdateFolderCommand {
            folder: by_uid("parent"),
            new_uid: Some("renamed".into()),
            ..UpdateFolderCommand::default()
        })
        .await
        .expect("rename");
    assert_eq!(renamed.uid, "renamed");

    let err = app
        .store
        .get(&GetFolderQuery::by_uid(ORG, "parent"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let children = app
        .store
        .get_children(&GetChildrenQuery::new(ORG, "renamed"))
        .await
        .expect("children");
    assert_eq!(uids(&children), vec!["child", "sibling"]);

    let parents = app
        .store
        .get_parents(&GetParentsQuery::new(ORG, "grandchild"))
        .await
        .expect("parents");
    assert_eq!(uids(&parents), vec!["renamed", "child"]);
}

#[tokio::test]
async fn test_rename_to_existing_uid_conflicts() {
    let app = TestApp::new().await;
    app.create_folder("a", None).await;
    app.create_folder("b", None).await;
    app.create_folder("a-child", Some("a")).await;

    let err = app
        .store
        .update(&UpdateFolderCommand {
            folder: by_uid("a"),
            new_uid: Some("b".into()),
            new_title: Some("changed".into()),
            ..UpdateFolderCommand::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    // Nothing from the failed update is visible.
    let a = app.store.get(&GetFolderQuery::by_uid(ORG, "a")).await.expect("a");
    assert_eq!(a.title, "a");
    let children = app
        .store
        .get_children(&GetChildrenQuery::new(ORG, "a"))
        .await
        .expect("children");
    assert_eq!(uids(&children), vec!["a-child"]);
}

#[tokio::test]
async fn test_rename_to_same_uid_is_allowed() {
    let app = TestApp::new().await;
    app.create_folder("same", None).await;

    let updated = app
        .store
        .update(&UpdateFolderCommand {
            folder: by_uid("same"),
            new_uid: Some("same".into()),
            ..UpdateFolderCommand::default()
        })
        .await
        .expect("update");
    assert_eq!(updated.uid, "same");
}

#[tokio::test]
async fn test_update_missing_folder() {
    let app = TestApp::new().await;

    let err = app
        .store
        .update(&UpdateFolderCommand {
            folder: by_uid("nope"),
            new_title: Some("t".into()),
            ..UpdateFolderCommand::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .store
        .update(&UpdateFolderCommand {
            folder: Some(Folder {
                id: FolderId(999),
                ..Folder::default()
            }),
            new_title: Some("t".into()),
            ..UpdateFolderCommand::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_update_validation() {
    let app = TestApp::new().await;
    app.create_folder("abc", None).await;

    for cmd in [
        UpdateFolderCommand::default(),
        UpdateFolderCommand {
            folder: by_uid("abc"),
            new_title: Some(String::new()),
            ..UpdateFolderCommand::default()
        },
        UpdateFolderCommand {
            folder: by_uid("abc"),
            new_uid: Some("general".into()),
            ..UpdateFolderCommand::default()
        },
        UpdateFolderCommand {
            folder: by_uid("abc"),
            new_uid: Some("x".repeat(41)),
            ..UpdateFolderCommand::default()
        },
    ] {
        let err = app.store.update(&cmd).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}

//! Integration tests for ancestor, children and height queries.

mod helpers;

use foldertree_core::error::ErrorKind;
use foldertree_entity::folder::{GENERAL_FOLDER_UID, GetChildrenQuery, GetParentsQuery};
use helpers::{ORG, OTHER_ORG, TestApp, uids};

#[tokio::test]
async fn test_get_parents_top_first() {
    let app = TestApp::new().await;
    app.create_sub_tree(&["a", "b", "c", "d"], None).await;

    let parents = app
        .store
        .get_parents(&GetParentsQuery::new(ORG, "d"))
        .await
        .expect("parents");
    assert_eq!(uids(&parents), vec!["a", "b", "c"]);

    let parents = app
        .store
        .get_parents(&GetParentsQuery::new(ORG, "a"))
        .await
        .expect("parents");
    assert!(parents.is_empty());
}

#[tokio::test]
async fn test_get_parents_missing_or_root() {
    let app = TestApp::new().await;
    app.create_folder("a", None).await;

    for uid in ["nope", GENERAL_FOLDER_UID, ""] {
        let err = app
            .store
            .get_parents(&GetParentsQuery::new(ORG, uid))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound, "uid={uid:?}");
    }

    let err = app
        .store
        .get_parents(&GetParentsQuery::new(OTHER_ORG, "a"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_get_children_ordered_by_title_then_id() {
    let app = TestApp::new().await;
    app.create_folder("parent", None).await;
    for (uid, title) in [("z", "beta"), ("y", "alpha"), ("x", "beta")] {
        app.store
            .create(&TestApp::create_cmd(uid, title, Some("parent")))
            .await
            .expect("create");
    }
    app.create_folder("nested", Some("y")).await;

    let children = app
        .store
        .get_children(&GetChildrenQuery::new(ORG, "parent"))
        .await
        .expect("children");
    assert_eq!(uids(&children), vec!["y", "z", "x"]);
}

#[tokio::test]
async fn test_get_children_of_root() {
    let app = TestApp::new().await;
    app.create_sub_tree(&["a", "a1"], None).await;
    app.create_folder("b", Some(GENERAL_FOLDER_UID)).await;

    let mut other = TestApp::create_cmd("c", "c", None);
    other.org_id = OTHER_ORG;
    app.store.create(&other).await.expect("create");

    for uid in ["", GENERAL_FOLDER_UID] {
        let roots = app
            .store
            .get_children(&GetChildrenQuery::new(ORG, uid))
            .await
            .expect("roots");
        assert_eq!(uids(&roots), vec!["a", "b"]);
    }
}

#[tokio::test]
async fn test_get_children_pagination() {
    let app = TestApp::new().await;
    app.create_folder("parent", None).await;
    app.create_leaves("leaf", 5, Some("parent")).await;

    let page = |limit, page| GetChildrenQuery::new(ORG, "parent").paged(limit, page);

    let first = app.store.get_children(&page(2, 1)).await.expect("page 1");
    let second = app.store.get_children(&page(2, 2)).await.expect("page 2");
    let third = app.store.get_children(&page(2, 3)).await.expect("page 3");
    let beyond = app.store.get_children(&page(2, 4)).await.expect("page 4");
    assert_eq!(uids(&first), vec!["leaf-0", "leaf-1"]);
    assert_eq!(uids(&second), vec!["leaf-2", "leaf-3"]);
    assert_eq!(uids(&third), vec!["leaf-4"]);
    assert!(beyond.is_empty());

    // Page 0 is the first page; limit 0 disables pagination.
    let zero = app.store.get_children(&page(2, 0)).await.expect("page 0");
    assert_eq!(uids(&zero), uids(&first));
    let all = app.store.get_children(&page(0, 3)).await.expect("all");
    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn test_single_item_pages_follow_unpaginated_order() {
    let app = TestApp::new().await;
    app.create_folder("parent", None).await;
    for (uid, title) in [("p1", "d"), ("p2", "b"), ("p3", "c"), ("p4", "a")] {
        app.store
            .create(&TestApp::create_cmd(uid, title, Some("parent")))
            .await
            .expect("create");
    }

    let all = app
        .store
        .get_children(&GetChildrenQuery::new(ORG, "parent"))
        .await
        .expect("all");
    assert_eq!(uids(&all), vec!["p4", "p2", "p3", "p1"]);

    for page in 1..=2u64 {
        let slice = app
            .store
            .get_children(&GetChildrenQuery::new(ORG, "parent").paged(1, page))
            .await
            .expect("page");
        let idx = (page - 1) as usize;
        assert_eq!(uids(&slice), uids(&all[idx..idx + 1]));
    }
}

#[tokio::test]
async fn test_parents_and_children_agree() {
    let app = TestApp::new().await;
    let chain = app.create_sub_tree(&["a", "b", "c"], None).await;

    for (depth, folder) in chain.iter().enumerate() {
        let parents = app
            .store
            .get_parents(&GetParentsQuery::new(ORG, folder.uid.as_str()))
            .await
            .expect("parents");
        assert_eq!(parents.len(), depth);
        assert_eq!(uids(&parents), uids(&chain[..depth]));
    }

    let children = app
        .store
        .get_children(&GetChildrenQuery::new(ORG, "a"))
        .await
        .expect("children");
    assert_eq!(uids(&children), vec!["b"]);
}

#[tokio::test]
async fn test_get_children_unknown_parent() {
    let app = TestApp::new().await;

    let err = app
        .store
        .get_children(&GetChildrenQuery::new(ORG, "nope"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let empty = app
        .store
        .get_children(&GetChildrenQuery::new(ORG, GENERAL_FOLDER_UID))
        .await
        .expect("empty root");
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_get_height() {
    let app = TestApp::new().await;
    app.create_sub_tree(&["a", "b", "c"], None).await;
    app.create_folder("a2", Some("a")).await;
    app.create_folder("solo", None).await;

    assert_eq!(app.store.get_height("a", ORG, None).await.expect("a"), 2);
    assert_eq!(app.store.get_height("b", ORG, None).await.expect("b"), 1);
    assert_eq!(app.store.get_height("c", ORG, None).await.expect("c"), 0);
    assert_eq!(app.store.get_height("solo", ORG, None).await.expect("solo"), 0);
    assert_eq!(app.store.get_height("", ORG, None).await.expect("root"), 3);
    assert_eq!(
        app.store.get_height(GENERAL_FOLDER_UID, OTHER_ORG, None).await.expect("empty org"),
        0
    );

    let err = app.store.get_height("nope", ORG, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_get_height_must_not_contain() {
    let app = TestApp::new().await;
    app.create_sub_tree(&["a", "b", "c"], None).await;
    app.create_folder("other", None).await;

    for forbidden in ["a", "b", "c"] {
        let err = app
            .store
            .get_height("a", ORG, Some(forbidden))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CircularReference, "forbidden={forbidden}");
    }

    assert_eq!(app.store.get_height("b", ORG, Some("a")).await.expect("b"), 1);
    assert_eq!(app.store.get_height("a", ORG, Some("other")).await.expect("a"), 2);
}

#[tokio::test]
async fn test_corrupted_cycle_is_detected() {
    let app = TestApp::new().await;
    app.create_sub_tree(&["a", "b", "c"], None).await;

    sqlx::query("UPDATE folder SET parent_uid = 'c' WHERE org_id = ? AND uid = 'a'")
        .bind(ORG.get())
        .execute(&app.pool)
        .await
        .expect("corrupt");

    let err = app
        .store
        .get_parents(&GetParentsQuery::new(ORG, "c"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::CircularReference);

    let err = app.store.get_height("a", ORG, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::CircularReference);

    // The cycle is unreachable from the root, which stays empty.
    let roots = app
        .store
        .get_children(&GetChildrenQuery::new(ORG, ""))
        .await
        .expect("roots");
    assert!(roots.is_empty());

    let err = app
        .store
        .create(&TestApp::create_cmd("d", "d", Some("b")))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::CircularReference);
}

#[tokio::test]
async fn test_walks_are_bounded_by_max_depth() {
    let app = TestApp::new().await;
    app.create_sub_tree(&["l1", "l2", "l3", "l4", "l5"], None).await;
    let shallow = app.store_with_max_depth(2);

    let err = shallow
        .get_parents(&GetParentsQuery::new(ORG, "l5"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::CircularReference);

    let err = shallow.get_height("l1", ORG, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::CircularReference);

    assert_eq!(shallow.get_height("l3", ORG, None).await.expect("l3"), 2);
}

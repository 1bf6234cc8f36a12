//! Integration tests for the persisted display flags.
//!
//! Each test creates its own in-memory SQLite database for isolation.

use cyberhound::storage::{Database, CLEARANCE_KEY};

async fn test_db() -> Database {
    Database::open(":memory:").await.unwrap()
}

#[tokio::test]
async fn test_clearance_defaults_to_restricted() {
    let db = test_db().await;
    assert!(!db.clearance_granted().await.unwrap());
    assert_eq!(db.get_preference(CLEARANCE_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_clearance_grant_is_idempotent() {
    let db = test_db().await;

    db.set_clearance(true).await.unwrap();
    db.set_clearance(true).await.unwrap();
    assert!(db.clearance_granted().await.unwrap());

    db.set_clearance(false).await.unwrap();
    db.set_clearance(false).await.unwrap();
    assert!(!db.clearance_granted().await.unwrap());
}

#[tokio::test]
async fn test_unrecognised_clearance_value_is_restricted() {
    let db = test_db().await;
    db.set_preference(CLEARANCE_KEY, "HOUND-7").await.unwrap();
    assert!(!db.clearance_granted().await.unwrap());
}

#[tokio::test]
async fn test_clearance_survives_reopen() {
    let dir = std::env::temp_dir().join("cyberhound_prefs_reopen");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("state.db");
    let _ = std::fs::remove_file(&path);
    let path_str = path.to_str().unwrap();

    {
        let db = Database::open(path_str).await.unwrap();
        db.set_clearance(true).await.unwrap();
        db.close().await;
    }

    let db = Database::open(path_str).await.unwrap();
    assert!(db.clearance_granted().await.unwrap());

    std::fs::remove_dir_all(&dir).ok();
}

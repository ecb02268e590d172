use ballot_bootstrap::BootstrapError;
use ballot_bootstrap::db::schema::CONSTITUENCIES;
use ballot_bootstrap::db::{SchemaState, SchemaStore, SeedPlan, StoreTarget, hash_password};
use tempfile::TempDir;

async fn open_store(dir: &TempDir) -> SchemaStore {
    let url = format!("sqlite://{}", dir.path().join("votes.db").display());
    let target = StoreTarget::from_url(&url).expect("valid sqlite url");
    SchemaStore::connect(&target)
        .await
        .expect("failed to open sqlite store")
}

fn default_seed() -> SeedPlan {
    SeedPlan {
        admin_username: "admin".to_string(),
        admin_password: "admin123".to_string(),
    }
}

async fn count(store: &SchemaStore, sql: &str) -> i64 {
    sqlx::query_scalar(sql)
        .fetch_one(store.pool())
        .await
        .expect("count query failed")
}

#[tokio::test]
async fn fresh_store_becomes_ready_with_seed_data() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    assert_eq!(store.state().await.unwrap(), SchemaState::Uninitialized);

    let outcome = store.initialize(Some(&default_seed())).await.unwrap();
    assert_eq!(outcome.previous, SchemaState::Uninitialized);
    assert_eq!(outcome.constituencies_added, CONSTITUENCIES.len() as u64);
    assert!(outcome.admin_created);
    assert_eq!(store.state().await.unwrap(), SchemaState::Ready);

    let listed = store.constituencies().await.unwrap();
    assert_eq!(listed.len(), 25);
    let names: Vec<_> = listed.iter().map(|c| c.name.clone()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert!(listed.iter().all(|c| c.state == "Andhra Pradesh"));
}

#[tokio::test]
async fn reinitializing_a_ready_store_keeps_existing_rows() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store.initialize(Some(&default_seed())).await.unwrap();

    sqlx::query("INSERT INTO voters (name, email, password, constituency) VALUES (?, ?, ?, ?)")
        .bind("Asha")
        .bind("asha@example.com")
        .bind("hash")
        .bind("Guntur")
        .execute(store.pool())
        .await
        .unwrap();

    let again = store.initialize(Some(&default_seed())).await.unwrap();
    assert_eq!(again.previous, SchemaState::Ready);
    assert_eq!(again.constituencies_added, 0);
    assert!(!again.admin_created);

    assert_eq!(count(&store, "SELECT COUNT(*) FROM voters").await, 1);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM admins").await, 1);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM constituencies").await, 25);
    assert_eq!(store.state().await.unwrap(), SchemaState::Ready);
}

#[tokio::test]
async fn default_admin_password_is_sha256_hex() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store.initialize(Some(&default_seed())).await.unwrap();

    let stored: String = sqlx::query_scalar("SELECT password FROM admins WHERE username = ?")
        .bind("admin")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(stored, hash_password("admin123"));
    assert_eq!(
        stored,
        "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
    );
}

#[tokio::test]
async fn existing_admin_is_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store.initialize(Some(&default_seed())).await.unwrap();

    sqlx::query("UPDATE admins SET password = ? WHERE username = ?")
        .bind("rotated")
        .bind("admin")
        .execute(store.pool())
        .await
        .unwrap();

    store.initialize(Some(&default_seed())).await.unwrap();

    let stored: String = sqlx::query_scalar("SELECT password FROM admins WHERE username = ?")
        .bind("admin")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(stored, "rotated");
}

#[tokio::test]
async fn seeding_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let outcome = store.initialize(None).await.unwrap();
    assert_eq!(outcome.constituencies_added, 0);
    assert!(!outcome.admin_created);
    assert_eq!(store.state().await.unwrap(), SchemaState::Ready);
    assert!(store.constituencies().await.unwrap().is_empty());
    assert_eq!(count(&store, "SELECT COUNT(*) FROM admins").await, 0);
}

#[tokio::test]
async fn partially_initialized_store_is_completed() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    sqlx::query(
        "CREATE TABLE constituencies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            state TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(store.pool())
    .await
    .unwrap();
    sqlx::query("INSERT INTO constituencies (name, state) VALUES (?, ?)")
        .bind("Hyderabad")
        .bind("Telangana")
        .execute(store.pool())
        .await
        .unwrap();

    assert_eq!(store.state().await.unwrap(), SchemaState::Uninitialized);
    let outcome = store.initialize(Some(&default_seed())).await.unwrap();
    assert_eq!(outcome.previous, SchemaState::Uninitialized);
    assert_eq!(outcome.constituencies_added, 25);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM constituencies").await, 26);
    assert_eq!(store.state().await.unwrap(), SchemaState::Ready);
}

#[tokio::test]
async fn incompatible_table_aborts_before_any_write() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    sqlx::query("CREATE TABLE voters (id INTEGER PRIMARY KEY, name TEXT)")
        .execute(store.pool())
        .await
        .unwrap();

    let err = store.initialize(Some(&default_seed())).await.unwrap_err();
    match err {
        BootstrapError::IncompatibleSchema { table, missing } => {
            assert_eq!(table, "voters");
            assert!(missing.contains(&"email".to_string()));
            assert!(missing.contains(&"constituency".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let tables = count(
        &store,
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'constituencies'",
    )
    .await;
    assert_eq!(tables, 0);
}

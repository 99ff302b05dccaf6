//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

async fn migrated_db() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tollgate_db::run_migrations(&db).await.unwrap();
    db
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = migrated_db().await;

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in ["user", "role", "permission", "role_permission", "user_role"] {
        assert!(info_str.contains(table), "missing {table} table");
    }
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = migrated_db().await;

    // Second run must be a no-op.
    tollgate_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn unknown_resource_is_rejected_by_schema() {
    let db = migrated_db().await;

    let result = db
        .query(
            "CREATE permission SET \
             name = 'WIDGET_READ', resource = 'WIDGET', \
             action = 'READ', description = ''",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "resource outside the vocabulary should fail");
}

#[tokio::test]
async fn unique_index_prevents_duplicate_assignment_rows() {
    let db = migrated_db().await;

    db.query(
        "CREATE user_role SET user_id = 'u1', role_id = 'r1', \
         is_active = false",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    let result = db
        .query(
            "CREATE user_role SET user_id = 'u1', role_id = 'r1', \
             is_active = true",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "second row for the same pair should fail");
}

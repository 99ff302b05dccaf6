//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings; the resource and action enums are stored as their
//! canonical names and checked with ASSERT constraints. Every
//! uniqueness invariant of the catalog is a UNIQUE index.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "rbac_catalog",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// v1: catalog tables
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (local records for identity-provider subjects)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD external_id ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD display_name ON TABLE user TYPE string;
DEFINE FIELD default_role ON TABLE user TYPE string DEFAULT 'GUEST';
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_external_id ON TABLE user \
    COLUMNS external_id UNIQUE;

-- =======================================================================
-- Roles
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE string;
DEFINE FIELD is_active ON TABLE role TYPE bool DEFAULT true;
DEFINE FIELD is_core ON TABLE role TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_name ON TABLE role COLUMNS name UNIQUE;

-- =======================================================================
-- Permissions (one record per resource/action pair)
-- =======================================================================
DEFINE TABLE permission SCHEMAFULL;
DEFINE FIELD name ON TABLE permission TYPE string;
DEFINE FIELD resource ON TABLE permission TYPE string \
    ASSERT $value IN ['USER', 'ROLE', 'PERMISSION', 'COURSE', \
    'ENROLLMENT', 'PAYMENT', 'PAYMENT_ACCOUNT', 'MONTHLY_FEE', \
    'GALLERY', 'BLOG', 'DASHBOARD', 'SETTINGS'];
DEFINE FIELD action ON TABLE permission TYPE string \
    ASSERT $value IN ['CREATE', 'READ', 'UPDATE', 'DELETE', 'MANAGE'];
DEFINE FIELD description ON TABLE permission TYPE string;
DEFINE FIELD created_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permission_resource_action ON TABLE permission \
    COLUMNS resource, action UNIQUE;

-- =======================================================================
-- Role -> Permission links
-- =======================================================================
DEFINE TABLE role_permission SCHEMAFULL;
DEFINE FIELD role_id ON TABLE role_permission TYPE string;
DEFINE FIELD permission_id ON TABLE role_permission TYPE string;
DEFINE FIELD created_at ON TABLE role_permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_permission_pair ON TABLE role_permission \
    COLUMNS role_id, permission_id UNIQUE;
DEFINE INDEX idx_role_permission_permission ON TABLE role_permission \
    COLUMNS permission_id;

-- =======================================================================
-- User -> Role assignments (never hard-deleted)
-- =======================================================================
DEFINE TABLE user_role SCHEMAFULL;
DEFINE FIELD user_id ON TABLE user_role TYPE string;
DEFINE FIELD role_id ON TABLE user_role TYPE string;
DEFINE FIELD assigned_by ON TABLE user_role TYPE option<string>;
DEFINE FIELD assigned_at ON TABLE user_role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD is_active ON TABLE user_role TYPE bool DEFAULT true;
DEFINE INDEX idx_user_role_pair ON TABLE user_role \
    COLUMNS user_id, role_id UNIQUE;
DEFINE INDEX idx_user_role_role ON TABLE user_role COLUMNS role_id;
";

// -----------------------------------------------------------------------
// Runner
// -----------------------------------------------------------------------

async fn current_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map_or(0, |m| m.version))
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    info!(
        version = migration.version,
        name = migration.name,
        "Applying migration"
    );

    db.query(migration.sql).await?.check().map_err(|e| {
        DbError::Migration(format!(
            "v{} ({}) failed: {e}",
            migration.version, migration.name
        ))
    })?;

    // The unique version index rejects a second record if another
    // process applied the same migration concurrently.
    db.query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!("recording v{} failed: {e}", migration.version))
        })?;

    Ok(())
}

/// Bring the schema up to date.
///
/// The `_migration` table records every applied version; only versions
/// above the recorded maximum run. Safe to call on every startup.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let current = current_version(db).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        info!(version = current, "Schema up to date");
        return Ok(());
    }

    for migration in pending {
        apply(db, migration).await?;
    }

    info!(
        from = current,
        to = MIGRATIONS.last().map_or(current, |m| m.version),
        "Schema migrated"
    );
    Ok(())
}

//! Schema steps for the collection store.
//!
//! Each step is `(version, sql)`; steps newer than the file's
//! `user_version` run together in one transaction.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Columns the collection store depends on.
pub const KV_STORE_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];

/// Newest schema version this build can write.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings the store up to [`latest_version`] and checks the `kv_store` shape.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::UnsupportedSchemaVersion { found, supported });
    }

    if found < supported {
        let tx = conn.transaction()?;
        for (version, sql) in STEPS.iter().skip_while(|(version, _)| *version <= found) {
            tx.execute_batch(sql)?;
            tx.pragma_update(None, "user_version", version)?;
        }
        tx.commit()?;
        info!("event=db_migrate module=db status=ok from_version={found} to_version={supported}");
    }

    verify_kv_store(conn)
}

fn verify_kv_store(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('kv_store');")?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let missing_columns = KV_STORE_COLUMNS
        .into_iter()
        .filter(|column| !present.iter().any(|name| name == column))
        .collect::<Vec<_>>();
    if missing_columns.is_empty() {
        return Ok(());
    }

    warn!(
        "event=db_migrate module=db status=error error_code=kv_store_mismatch missing={}",
        missing_columns.join(",")
    );
    Err(DbError::StoreTableMismatch { missing_columns })
}

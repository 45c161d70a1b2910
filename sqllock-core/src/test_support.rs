use tempfile::TempDir;

use crate::config::ConnectionDescriptor;
use crate::manager::LockManager;

/// A connected, set-up manager backed by a fresh database file.
/// Keep the returned `TempDir` alive for as long as the manager is used.
pub(crate) fn connected_manager(prefix: &str) -> (TempDir, LockManager) {
    let dir = TempDir::new().expect("temp dir");
    let mut manager = LockManager::new(prefix).expect("valid prefix");
    manager
        .connect(&descriptor_in(&dir))
        .expect("connect to temp database");
    manager.setup().expect("create lock table");
    (dir, manager)
}

pub(crate) fn descriptor_in(dir: &TempDir) -> ConnectionDescriptor {
    ConnectionDescriptor::new(dir.path().join("locks.db"))
}

/// Raw row count, including stale rows that have not been swept.
pub(crate) fn row_count(manager: &LockManager) -> i64 {
    let conn = manager.conn().expect("connection");
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", manager.table_name()),
        [],
        |row| row.get(0),
    )
    .expect("count rows")
}

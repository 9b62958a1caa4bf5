// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-database harness for integration-style tests.

use tempfile::TempDir;

use trunkq_storage::SqliteQueueStore;

/// Open a fresh queue store in a temporary directory.
///
/// The `TempDir` must be kept alive for the duration of the test; dropping
/// it removes the database file.
pub async fn temp_store() -> (TempDir, SqliteQueueStore) {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("trunkq-test.db");
    let store = SqliteQueueStore::open(path.to_str().expect("utf-8 temp path"))
        .await
        .expect("open temp store");
    (dir, store)
}

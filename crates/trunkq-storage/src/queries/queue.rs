// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Work queue operations: snapshot reads, idempotent insert, patch updates.

use rusqlite::{params, params_from_iter, types::Value};

use trunkq_core::types::{ActivityKind, NewWorkItem, WorkItem, WorkItemPatch};
use trunkq_core::TrunkqError;

use crate::database::{map_tr_err, Database};

const COLUMNS: &str = "id, channel_id, kind, fingerprint, address, payload, priority, \
                       processed, status, retry_count, submitted_at";

/// Map one `work_queue` row into a [`WorkItem`].
pub(crate) fn row_to_item(row: &rusqlite::Row<'_>) -> Result<WorkItem, rusqlite::Error> {
    let kind: String = row.get(2)?;
    let status: String = row.get(8)?;
    Ok(WorkItem {
        id: row.get(0)?,
        channel_id: row.get(1)?,
        kind: kind.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?,
        fingerprint: row.get(3)?,
        address: row.get(4)?,
        payload: row.get(5)?,
        priority: row.get(6)?,
        processed: row.get(7)?,
        status: status.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?,
        retry_count: row.get(9)?,
        submitted_at: row.get(10)?,
    })
}

/// Terminal dispatcher snapshot for one channel.
///
/// Unprocessed outbound work (call/sms/ussd) plus processed-but-failed SMS
/// still inside the retry budget (`retry_count` counts completed retries,
/// so an item stops being selected once it reaches `max_retry`), ordered so
/// that unprocessed, higher priority, older work drains first.
pub async fn due_for_channel(
    db: &Database,
    channel_id: &str,
    max_retry: i64,
) -> Result<Vec<WorkItem>, TrunkqError> {
    let channel_id = channel_id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {COLUMNS} FROM work_queue
                 WHERE channel_id = ?1
                   AND ((processed = 0 AND kind IN ('call', 'sms', 'ussd'))
                     OR (processed = 1 AND kind = 'sms' AND status = 'failed'
                         AND retry_count < ?2))
                 ORDER BY priority ASC, processed ASC, submitted_at ASC, id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let items = stmt
                .query_map(params![channel_id, max_retry], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

/// Activity dispatcher snapshot: unprocessed inbound events.
pub async fn pending_inbound(db: &Database) -> Result<Vec<WorkItem>, TrunkqError> {
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {COLUMNS} FROM work_queue
                 WHERE processed = 0 AND kind IN ('ring', 'inbox', 'cusd')
                 ORDER BY priority ASC, submitted_at ASC, id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let items = stmt
                .query_map([], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one work item by id.
pub async fn get_by_id(db: &Database, id: i64) -> Result<Option<WorkItem>, TrunkqError> {
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {COLUMNS} FROM work_queue WHERE id = ?1");
            match conn.query_row(&sql, params![id], row_to_item) {
                Ok(item) => Ok(Some(item)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Count of unprocessed items with this `(channel_id, fingerprint)`.
pub async fn count_active(
    db: &Database,
    channel_id: &str,
    fingerprint: &str,
) -> Result<i64, TrunkqError> {
    let channel_id = channel_id.to_string();
    let fingerprint = fingerprint.to_string();
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM work_queue
                 WHERE channel_id = ?1 AND fingerprint = ?2 AND processed = 0",
                params![channel_id, fingerprint],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}

/// Idempotent insert.
///
/// The active-count check and the insert run in one transaction on the
/// single writer thread, so two concurrent enqueuers of the same
/// `(channel_id, fingerprint)` can never both insert. Returns `None` when
/// the item was deduplicated.
pub async fn insert_if_absent(
    db: &Database,
    item: &NewWorkItem,
) -> Result<Option<WorkItem>, TrunkqError> {
    let item = item.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let active: i64 = tx.query_row(
                "SELECT COUNT(*) FROM work_queue
                 WHERE channel_id = ?1 AND fingerprint = ?2 AND processed = 0",
                params![item.channel_id, item.fingerprint],
                |row| row.get(0),
            )?;
            if active > 0 {
                tx.commit()?;
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO work_queue (channel_id, kind, fingerprint, address, payload, priority)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    item.channel_id,
                    item.kind.to_string(),
                    item.fingerprint,
                    item.address,
                    item.payload,
                    item.priority,
                ],
            )?;
            let id = tx.last_insert_rowid();
            let inserted = {
                let sql = format!("SELECT {COLUMNS} FROM work_queue WHERE id = ?1");
                tx.query_row(&sql, params![id], row_to_item)?
            };
            tx.commit()?;
            Ok(Some(inserted))
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a partial update to a work item and return the updated row.
pub async fn update(
    db: &Database,
    id: i64,
    patch: &WorkItemPatch,
) -> Result<WorkItem, TrunkqError> {
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let mut sets: Vec<&str> = Vec::new();
            let mut values: Vec<Value> = Vec::new();
            if let Some(processed) = patch.processed {
                sets.push("processed = ?");
                values.push(Value::from(processed));
            }
            if let Some(status) = patch.status {
                sets.push("status = ?");
                values.push(Value::from(status.to_string()));
            }
            if let Some(retry_count) = patch.retry_count {
                sets.push("retry_count = ?");
                values.push(Value::from(retry_count));
            }
            if !sets.is_empty() {
                let sql = format!("UPDATE work_queue SET {} WHERE id = ?", sets.join(", "));
                values.push(Value::from(id));
                tx.execute(&sql, params_from_iter(values))?;
            }

            let updated = {
                let sql = format!("SELECT {COLUMNS} FROM work_queue WHERE id = ?1");
                tx.query_row(&sql, params![id], row_to_item)?
            };
            tx.commit()?;
            Ok(updated)
        })
        .await
        .map_err(map_tr_err)
}

/// Recent-activity read model: the newest item per address among the given
/// kinds, newest first.
pub async fn most_recent_per_address(
    db: &Database,
    kinds: &[ActivityKind],
    offset: i64,
    limit: i64,
) -> Result<Vec<WorkItem>, TrunkqError> {
    if kinds.is_empty() {
        return Ok(Vec::new());
    }
    let names: Vec<String> = kinds.iter().map(ToString::to_string).collect();
    db.connection()
        .call(move |conn| {
            // Numbered placeholders repeat across both IN lists; limit and
            // offset follow the kind names.
            let placeholders = (1..=names.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            let limit_idx = names.len() + 1;
            let offset_idx = names.len() + 2;
            let sql = format!(
                "SELECT {COLUMNS} FROM work_queue w
                 WHERE w.kind IN ({placeholders})
                   AND w.id = (SELECT w2.id FROM work_queue w2
                               WHERE w2.address = w.address AND w2.kind IN ({placeholders})
                               ORDER BY w2.submitted_at DESC, w2.id DESC LIMIT 1)
                 ORDER BY w.submitted_at DESC, w.id DESC
                 LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
            );
            let mut values: Vec<Value> = names.into_iter().map(Value::from).collect();
            values.push(Value::from(limit));
            values.push(Value::from(offset));
            let mut stmt = conn.prepare(&sql)?;
            let items = stmt
                .query_map(params_from_iter(values), row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

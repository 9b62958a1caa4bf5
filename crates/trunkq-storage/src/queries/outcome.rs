// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outcome log operations: append on first delivery, patch on reports.

use rusqlite::params;

use trunkq_core::types::{ActivityKind, OutcomeEntry, WorkStatus};
use trunkq_core::TrunkqError;

use crate::database::{map_tr_err, Database};

/// Append one row to the outcome log.
pub async fn append(db: &Database, entry: &OutcomeEntry) -> Result<(), TrunkqError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO outcome_log (channel_id, kind, fingerprint, address, status, delivered_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.channel_id,
                    entry.kind.to_string(),
                    entry.fingerprint,
                    entry.address,
                    entry.status.to_string(),
                    entry.delivered_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Patch the outcome row keyed by `(channel_id, fingerprint, kind)`.
///
/// Used when an SMS retry resolves, or when the host forwards an
/// asynchronous delivery report. `delivered_at` is only overwritten when a
/// new value is given. Returns the number of rows patched (0 when no row
/// with that key exists).
pub async fn patch(
    db: &Database,
    channel_id: &str,
    fingerprint: &str,
    kind: ActivityKind,
    status: WorkStatus,
    delivered_at: Option<&str>,
) -> Result<usize, TrunkqError> {
    let channel_id = channel_id.to_string();
    let fingerprint = fingerprint.to_string();
    let delivered_at = delivered_at.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE outcome_log
                 SET status = ?1, delivered_at = COALESCE(?2, delivered_at)
                 WHERE channel_id = ?3 AND fingerprint = ?4 AND kind = ?5",
                params![
                    status.to_string(),
                    delivered_at,
                    channel_id,
                    fingerprint,
                    kind.to_string(),
                ],
            )?;
            Ok(changed)
        })
        .await
        .map_err(map_tr_err)
}

/// Read the outcome rows for one `(channel_id, fingerprint, kind)` key,
/// oldest first. Mainly used by tests and host-side reporting.
pub async fn entries_for_key(
    db: &Database,
    channel_id: &str,
    fingerprint: &str,
    kind: ActivityKind,
) -> Result<Vec<OutcomeEntry>, TrunkqError> {
    let channel_id = channel_id.to_string();
    let fingerprint = fingerprint.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT channel_id, kind, fingerprint, address, status, delivered_at
                 FROM outcome_log
                 WHERE channel_id = ?1 AND fingerprint = ?2 AND kind = ?3
                 ORDER BY id ASC",
            )?;
            let entries = stmt
                .query_map(
                    params![channel_id, fingerprint, kind.to_string()],
                    |row| {
                        let kind: String = row.get(1)?;
                        let status: String = row.get(4)?;
                        Ok(OutcomeEntry {
                            channel_id: row.get(0)?,
                            kind: kind.parse().map_err(|e| {
                                rusqlite::Error::FromSqlConversionFailure(
                                    1,
                                    rusqlite::types::Type::Text,
                                    Box::new(e),
                                )
                            })?,
                            fingerprint: row.get(2)?,
                            address: row.get(3)?,
                            status: status.parse().map_err(|e| {
                                rusqlite::Error::FromSqlConversionFailure(
                                    4,
                                    rusqlite::types::Type::Text,
                                    Box::new(e),
                                )
                            })?,
                            delivered_at: row.get(5)?,
                        })
                    },
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}

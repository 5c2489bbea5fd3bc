//! Repository for the `audit_events` and `audit_changes` tables.

use std::collections::HashMap;

use bidtrack_core::audit::FieldChange;
use bidtrack_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::audit::{AuditChange, AuditEvent, AuditEventWithChanges};

/// Column list shared across event queries.
const EVENT_COLUMNS: &str = "id, bid_id, bid_id_snapshot, bid_label, action, actor, created_at";

/// Column list shared across change queries.
const CHANGE_COLUMNS: &str = "id, event_id, field, from_value, to_value";

/// Append-only access to the audit trail.
pub struct AuditRepo;

impl AuditRepo {
    /// Write one event and its change rows inside the caller's transaction.
    ///
    /// The caller owns the commit, so the audit rows land together with the
    /// bid mutation or not at all.
    pub async fn record_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        bid_id: DbId,
        bid_label: &str,
        action: &str,
        actor: &str,
        changes: &[FieldChange],
    ) -> Result<AuditEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_events (bid_id, bid_id_snapshot, bid_label, action, actor) \
             VALUES ($1, $1, $2, $3, $4) \
             RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, AuditEvent>(&query)
            .bind(bid_id)
            .bind(bid_label)
            .bind(action)
            .bind(actor)
            .fetch_one(&mut **tx)
            .await?;

        for change in changes {
            sqlx::query(
                "INSERT INTO audit_changes (event_id, field, from_value, to_value) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(event.id)
            .bind(change.field)
            .bind(&change.from_value)
            .bind(&change.to_value)
            .execute(&mut **tx)
            .await?;
        }

        Ok(event)
    }

    /// History of one bid, newest first. Includes the deletion event for
    /// bids that no longer exist.
    pub async fn list_for_bid(
        pool: &PgPool,
        bid_id: DbId,
    ) -> Result<Vec<AuditEventWithChanges>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM audit_events \
             WHERE bid_id_snapshot = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let events = sqlx::query_as::<_, AuditEvent>(&query)
            .bind(bid_id)
            .fetch_all(pool)
            .await?;

        Self::attach_changes(pool, events).await
    }

    /// Every event with its changes, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<AuditEventWithChanges>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM audit_events ORDER BY created_at DESC, id DESC"
        );
        let events = sqlx::query_as::<_, AuditEvent>(&query)
            .fetch_all(pool)
            .await?;

        Self::attach_changes(pool, events).await
    }

    /// Load the changes of `events` in one query and pair them up, keeping
    /// the event order and the per-event recording order.
    async fn attach_changes(
        pool: &PgPool,
        events: Vec<AuditEvent>,
    ) -> Result<Vec<AuditEventWithChanges>, sqlx::Error> {
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let event_ids: Vec<DbId> = events.iter().map(|e| e.id).collect();
        let query = format!(
            "SELECT {CHANGE_COLUMNS} FROM audit_changes \
             WHERE event_id = ANY($1) \
             ORDER BY event_id, id"
        );
        let changes = sqlx::query_as::<_, AuditChange>(&query)
            .bind(&event_ids)
            .fetch_all(pool)
            .await?;

        let mut by_event: HashMap<DbId, Vec<AuditChange>> = HashMap::new();
        for change in changes {
            by_event.entry(change.event_id).or_default().push(change);
        }

        Ok(events
            .into_iter()
            .map(|event| AuditEventWithChanges {
                changes: by_event.remove(&event.id).unwrap_or_default(),
                event,
            })
            .collect())
    }
}

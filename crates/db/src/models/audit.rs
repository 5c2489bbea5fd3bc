//! Audit trail entity models.
//!
//! Events and changes are append-only: there is no `updated_at` and no
//! update path. Rows only disappear through a full reset.

use bidtrack_core::export::ExportAuditEvent;
use bidtrack_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One audited mutation of a bid.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEvent {
    pub id: DbId,
    /// Live reference; `None` once the bid has been deleted.
    pub bid_id: Option<DbId>,
    /// The bid id at the time of the mutation. Never cleared.
    pub bid_id_snapshot: DbId,
    pub bid_label: String,
    pub action: String,
    pub actor: String,
    pub created_at: Timestamp,
}

/// One changed field of an [`AuditEvent`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditChange {
    pub id: DbId,
    pub event_id: DbId,
    pub field: String,
    pub from_value: String,
    pub to_value: String,
}

/// An event together with its changes, in recording order.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEventWithChanges {
    #[serde(flatten)]
    pub event: AuditEvent,
    pub changes: Vec<AuditChange>,
}

impl AuditEventWithChanges {
    /// Borrowed view used by the audit CSV export.
    pub fn as_export(&self) -> ExportAuditEvent<'_> {
        ExportAuditEvent {
            bid_label: &self.event.bid_label,
            action: &self.event.action,
            actor: &self.event.actor,
            created_at: self.event.created_at,
            changes: self
                .changes
                .iter()
                .map(|c| (c.field.as_str(), c.from_value.as_str(), c.to_value.as_str()))
                .collect(),
        }
    }
}

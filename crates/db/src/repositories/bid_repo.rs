//! Repository for the `bids` table.
//!
//! Updates and deletions go through [`BidRepo::update_with_audit`] and
//! [`BidRepo::delete_with_audit`], which write the audit trail in the same
//! transaction as the bid itself.

use bidtrack_core::audit::{
    bid_label, deletion_changes, diff_bid_fields, ACTION_DELETE, ACTION_UPDATE,
};
use bidtrack_core::bid::{BidStage, TcvTermBasis};
use bidtrack_core::bid_fields::BidFields;
use bidtrack_core::error::CoreError;
use bidtrack_core::types::DbId;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::audit::AuditEvent;
use crate::models::bid::{Bid, BidFilter, BidUpdate, ResetCounts};
use crate::repositories::AuditRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, client_name, bid_name, status, opportunity_type, current_stage, \
    next_stage_date, psq_received_at, psq_clarification_deadline_at, \
    psq_submission_deadline_at, psq_submission_time, itt_received_at, \
    itt_clarification_deadline_at, itt_submission_deadline_at, itt_submission_time, \
    tcv_gbp, initial_term_months, extension_term_months, tcv_term_basis, \
    annual_value_gbp, portal_url, folder_url, created_at, updated_at";

/// Writable columns, in the order [`bind_fields`] binds them.
const WRITE_COLUMNS: &str = "client_name, bid_name, status, opportunity_type, current_stage, \
    next_stage_date, psq_received_at, psq_clarification_deadline_at, \
    psq_submission_deadline_at, psq_submission_time, itt_received_at, \
    itt_clarification_deadline_at, itt_submission_deadline_at, itt_submission_time, \
    tcv_gbp, initial_term_months, extension_term_months, tcv_term_basis, \
    annual_value_gbp, portal_url, folder_url";

/// Rows per multi-row insert. 21 binds per row keeps each statement well
/// under the Postgres limit of 65535 parameters.
const BULK_INSERT_CHUNK: usize = 1000;

type BidQuery<'q> = QueryAs<'q, Postgres, Bid, PgArguments>;

/// Bind every writable column of `f`, in [`WRITE_COLUMNS`] order.
fn bind_fields<'q>(query: BidQuery<'q>, f: &'q BidFields) -> BidQuery<'q> {
    query
        .bind(&f.client_name)
        .bind(&f.bid_name)
        .bind(f.status.as_str())
        .bind(f.opportunity_type.as_str())
        .bind(f.current_stage.map(BidStage::as_str))
        .bind(f.next_stage_date)
        .bind(f.psq_received_at)
        .bind(f.psq_clarification_deadline_at)
        .bind(f.psq_submission_deadline_at)
        .bind(f.psq_submission_time.as_deref())
        .bind(f.itt_received_at)
        .bind(f.itt_clarification_deadline_at)
        .bind(f.itt_submission_deadline_at)
        .bind(f.itt_submission_time.as_deref())
        .bind(f.tcv_gbp)
        .bind(f.initial_term_months)
        .bind(f.extension_term_months)
        .bind(f.tcv_term_basis.map(TcvTermBasis::as_str))
        .bind(f.annual_value_gbp)
        .bind(f.portal_url.as_deref())
        .bind(&f.folder_url)
}

/// A stored row that no longer maps onto the domain vocabulary.
fn corrupt_row(err: CoreError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Provides bid persistence with an atomic audit trail.
pub struct BidRepo;

impl BidRepo {
    /// Insert a new bid, returning the created row. Creation is not audited.
    pub async fn create(pool: &PgPool, fields: &BidFields) -> Result<Bid, sqlx::Error> {
        let query = format!(
            "INSERT INTO bids ({WRITE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, \
                     $12, $13, $14, $15, $16, $17, $18, $19, $20, $21) \
             RETURNING {COLUMNS}"
        );
        bind_fields(sqlx::query_as::<_, Bid>(&query), fields)
            .fetch_one(pool)
            .await
    }

    /// Find a single bid by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Bid>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bids WHERE id = $1");
        sqlx::query_as::<_, Bid>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List bids matching `filter` in the filter's sort order.
    pub async fn list(pool: &PgPool, filter: &BidFilter) -> Result<Vec<Bid>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bids \
             WHERE ($1::TEXT IS NULL OR status = $1) \
               AND ($2::TEXT IS NULL OR client_name ILIKE '%' || $2 || '%') \
             ORDER BY {}",
            filter.sort.order_by()
        );
        sqlx::query_as::<_, Bid>(&query)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.client_query.as_deref().map(escape_like))
            .fetch_all(pool)
            .await
    }

    /// Every bid, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Bid>, sqlx::Error> {
        Self::list(pool, &BidFilter::default()).await
    }

    /// Replace a bid's fields and record what changed.
    ///
    /// The current row is locked, diffed against `fields` and, if anything
    /// differs, updated together with one `update` audit event in a single
    /// transaction. An empty diff writes nothing. Returns `None` when the
    /// bid does not exist.
    pub async fn update_with_audit(
        pool: &PgPool,
        id: DbId,
        fields: &BidFields,
        actor: &str,
    ) -> Result<Option<BidUpdate>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM bids WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Bid>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let changes = diff_bid_fields(&current.to_fields().map_err(corrupt_row)?, fields);
        if changes.is_empty() {
            tracing::debug!(bid_id = id, "Bid update has no changes; nothing written");
            return Ok(Some(BidUpdate {
                bid: current,
                changes,
                audit_event_id: None,
            }));
        }

        let update = format!(
            "UPDATE bids SET \
                client_name = $2, bid_name = $3, status = $4, opportunity_type = $5, \
                current_stage = $6, next_stage_date = $7, psq_received_at = $8, \
                psq_clarification_deadline_at = $9, psq_submission_deadline_at = $10, \
                psq_submission_time = $11, itt_received_at = $12, \
                itt_clarification_deadline_at = $13, itt_submission_deadline_at = $14, \
                itt_submission_time = $15, tcv_gbp = $16, initial_term_months = $17, \
                extension_term_months = $18, tcv_term_basis = $19, annual_value_gbp = $20, \
                portal_url = $21, folder_url = $22 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let bid = bind_fields(sqlx::query_as::<_, Bid>(&update).bind(id), fields)
            .fetch_one(&mut *tx)
            .await?;

        let label = bid_label(&fields.client_name, &fields.bid_name);
        let event =
            AuditRepo::record_in_tx(&mut tx, id, &label, ACTION_UPDATE, actor, &changes).await?;

        tx.commit().await?;

        tracing::info!(
            bid_id = id,
            audit_event_id = event.id,
            change_count = changes.len(),
            "Bid updated"
        );

        Ok(Some(BidUpdate {
            bid,
            changes,
            audit_event_id: Some(event.id),
        }))
    }

    /// Delete a bid, recording a `delete` audit event first.
    ///
    /// The event, its change rows and the deletion commit together. Returns
    /// `None` when the bid does not exist, in which case nothing is written.
    pub async fn delete_with_audit(
        pool: &PgPool,
        id: DbId,
        actor: &str,
    ) -> Result<Option<AuditEvent>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM bids WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Bid>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let fields = current.to_fields().map_err(corrupt_row)?;
        let label = bid_label(&fields.client_name, &fields.bid_name);
        let changes = deletion_changes(&fields);
        let event =
            AuditRepo::record_in_tx(&mut tx, id, &label, ACTION_DELETE, actor, &changes).await?;

        sqlx::query("DELETE FROM bids WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(bid_id = id, audit_event_id = event.id, "Bid deleted");
        Ok(Some(event))
    }

    /// Insert many bids in one transaction, returning the number inserted.
    ///
    /// No audit events are written. An empty slice does not touch the
    /// database.
    pub async fn bulk_insert(pool: &PgPool, rows: &[BidFields]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for chunk in rows.chunks(BULK_INSERT_CHUNK) {
            let mut builder =
                QueryBuilder::<Postgres>::new(format!("INSERT INTO bids ({WRITE_COLUMNS}) "));
            builder.push_values(chunk, |mut b, f| {
                b.push_bind(f.client_name.as_str())
                    .push_bind(f.bid_name.as_str())
                    .push_bind(f.status.as_str())
                    .push_bind(f.opportunity_type.as_str())
                    .push_bind(f.current_stage.map(BidStage::as_str))
                    .push_bind(f.next_stage_date)
                    .push_bind(f.psq_received_at)
                    .push_bind(f.psq_clarification_deadline_at)
                    .push_bind(f.psq_submission_deadline_at)
                    .push_bind(f.psq_submission_time.as_deref())
                    .push_bind(f.itt_received_at)
                    .push_bind(f.itt_clarification_deadline_at)
                    .push_bind(f.itt_submission_deadline_at)
                    .push_bind(f.itt_submission_time.as_deref())
                    .push_bind(f.tcv_gbp)
                    .push_bind(f.initial_term_months)
                    .push_bind(f.extension_term_months)
                    .push_bind(f.tcv_term_basis.map(TcvTermBasis::as_str))
                    .push_bind(f.annual_value_gbp)
                    .push_bind(f.portal_url.as_deref())
                    .push_bind(f.folder_url.as_str());
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;

        tracing::info!(inserted, "Bulk bid insert committed");
        Ok(inserted)
    }

    /// Remove every audit event (with its changes) and every bid.
    pub async fn reset_all(pool: &PgPool) -> Result<ResetCounts, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let audit_events_deleted = sqlx::query("DELETE FROM audit_events")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let bids_deleted = sqlx::query("DELETE FROM bids")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::warn!(bids_deleted, audit_events_deleted, "All bid data reset");
        Ok(ResetCounts {
            bids_deleted,
            audit_events_deleted,
        })
    }
}

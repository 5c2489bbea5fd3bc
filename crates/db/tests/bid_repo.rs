//! Integration tests for bid persistence: create, lookup, listing, bulk
//! insert and reset.

mod common;

use bidtrack_core::bid::{BidStatus, OpportunityType};
use bidtrack_db::models::bid::{BidFilter, BidListQuery, BidSort};
use bidtrack_db::repositories::BidRepo;
use common::bid_fields;
use sqlx::PgPool;

fn filter(status: Option<BidStatus>, q: Option<&str>, sort: BidSort) -> BidFilter {
    BidFilter {
        status,
        client_query: q.map(str::to_string),
        sort,
    }
}

// ---------------------------------------------------------------------------
// Create / find
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_find_round_trips_fields(pool: PgPool) {
    let fields = bid_fields("Acme Council");
    let bid = BidRepo::create(&pool, &fields).await.unwrap();

    assert_eq!(bid.client_name, "Acme Council");
    assert_eq!(bid.status, "pending");
    assert_eq!(bid.annual_value_gbp, Some(400_000));

    let found = BidRepo::find_by_id(&pool, bid.id).await.unwrap().unwrap();
    assert_eq!(found.to_fields().unwrap(), fields);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_missing_returns_none(pool: PgPool) {
    assert!(BidRepo::find_by_id(&pool, 999_999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stores_two_stage_fields(pool: PgPool) {
    let mut fields = bid_fields("Beta Trust");
    fields.opportunity_type = OpportunityType::TwoStagePsqItt;
    fields.current_stage = Some(bidtrack_core::bid::BidStage::Psq);
    fields.psq_submission_time = Some("09:30".to_string());

    let bid = BidRepo::create(&pool, &fields).await.unwrap();

    assert_eq!(bid.opportunity_type, "two_stage_psq_itt");
    assert_eq!(bid.current_stage.as_deref(), Some("psq"));
    assert_eq!(bid.psq_submission_time.as_deref(), Some("09:30"));
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_defaults_to_newest_first(pool: PgPool) {
    let first = BidRepo::create(&pool, &bid_fields("Alpha")).await.unwrap();
    let second = BidRepo::create(&pool, &bid_fields("Bravo")).await.unwrap();

    let bids = BidRepo::list_all(&pool).await.unwrap();

    let ids: Vec<_> = bids.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_status_and_client(pool: PgPool) {
    let mut won = bid_fields("Acme Council");
    won.status = BidStatus::Won;
    BidRepo::create(&pool, &won).await.unwrap();
    BidRepo::create(&pool, &bid_fields("Acme Housing")).await.unwrap();
    BidRepo::create(&pool, &bid_fields("Beta Trust")).await.unwrap();

    let by_status = BidRepo::list(&pool, &filter(Some(BidStatus::Won), None, BidSort::Newest))
        .await
        .unwrap();
    assert_eq!(by_status.len(), 1);
    assert_eq!(by_status[0].client_name, "Acme Council");

    let by_client = BidRepo::list(&pool, &filter(None, Some("acme"), BidSort::ClientAsc))
        .await
        .unwrap();
    let names: Vec<_> = by_client.iter().map(|b| b.client_name.as_str()).collect();
    assert_eq!(names, vec!["Acme Council", "Acme Housing"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_search_treats_wildcards_literally(pool: PgPool) {
    BidRepo::create(&pool, &bid_fields("Acme Council")).await.unwrap();

    let bids = BidRepo::list(&pool, &filter(None, Some("%"), BidSort::Newest))
        .await
        .unwrap();
    assert!(bids.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_query_sorts_by_client_descending(pool: PgPool) {
    BidRepo::create(&pool, &bid_fields("Alpha")).await.unwrap();
    BidRepo::create(&pool, &bid_fields("Charlie")).await.unwrap();
    BidRepo::create(&pool, &bid_fields("Bravo")).await.unwrap();

    let query = BidListQuery {
        sort: Some("client".to_string()),
        ..BidListQuery::default()
    };
    let bids = BidRepo::list(&pool, &BidFilter::from(&query)).await.unwrap();

    let names: Vec<_> = bids.iter().map(|b| b.client_name.as_str()).collect();
    assert_eq!(names, vec!["Charlie", "Bravo", "Alpha"]);
}

// ---------------------------------------------------------------------------
// Bulk insert / reset
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_insert_empty_is_noop(pool: PgPool) {
    assert_eq!(BidRepo::bulk_insert(&pool, &[]).await.unwrap(), 0);
    assert!(BidRepo::list_all(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_insert_writes_rows_without_audit(pool: PgPool) {
    let mut sparse = bid_fields("Sparse Ltd");
    sparse.tcv_gbp = None;
    sparse.initial_term_months = None;
    sparse.tcv_term_basis = None;
    sparse.annual_value_gbp = None;

    let rows = vec![bid_fields("Alpha"), sparse];
    let inserted = BidRepo::bulk_insert(&pool, &rows).await.unwrap();

    assert_eq!(inserted, 2);
    assert_eq!(BidRepo::list_all(&pool).await.unwrap().len(), 2);

    let events: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(events.0, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reset_removes_everything(pool: PgPool) {
    let bid = BidRepo::create(&pool, &bid_fields("Alpha")).await.unwrap();
    BidRepo::create(&pool, &bid_fields("Bravo")).await.unwrap();
    BidRepo::delete_with_audit(&pool, bid.id, "admin@example.com")
        .await
        .unwrap();

    let counts = BidRepo::reset_all(&pool).await.unwrap();

    assert_eq!(counts.bids_deleted, 1);
    assert_eq!(counts.audit_events_deleted, 1);
    assert!(BidRepo::list_all(&pool).await.unwrap().is_empty());

    let changes: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_changes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(changes.0, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn schema_status_reports_migrations_and_counts(pool: PgPool) {
    let empty = bidtrack_db::schema_status(&pool).await.unwrap();
    assert!(empty.is_current());
    assert_eq!(empty.latest_migration, Some(20260101000002));
    assert_eq!((empty.bids, empty.audit_events), (0, 0));

    let bid = BidRepo::create(&pool, &bid_fields("Alpha")).await.unwrap();
    BidRepo::create(&pool, &bid_fields("Bravo")).await.unwrap();
    BidRepo::delete_with_audit(&pool, bid.id, "admin@example.com")
        .await
        .unwrap();

    let status = bidtrack_db::schema_status(&pool).await.unwrap();
    assert_eq!((status.bids, status.audit_events), (1, 1));
}

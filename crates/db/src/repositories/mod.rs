//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod audit_repo;
pub mod bid_repo;

pub use audit_repo::AuditRepo;
pub use bid_repo::BidRepo;

//! Request handlers.
//!
//! Handlers delegate to the repositories in `bidtrack_db` and map errors via
//! [`AppError`](crate::error::AppError).

pub mod bid_admin;
pub mod bids;

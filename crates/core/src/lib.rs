//! Domain logic for the bid tracker.
//!
//! Pure code only: no database, no async, no HTTP. The `db` and `api` crates
//! build on the types and rules defined here.

pub mod audit;
pub mod bid;
pub mod bid_fields;
pub mod bid_input;
pub mod csv;
pub mod error;
pub mod export;
pub mod import;
pub mod roles;
pub mod types;

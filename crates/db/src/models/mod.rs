//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Query and result types used by the matching repository

pub mod audit;
pub mod bid;

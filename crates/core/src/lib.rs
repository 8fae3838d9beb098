//! Domain types and pure logic for the catalog backend.
//!
//! Nothing in this crate touches the database or HTTP; the `db` and `api`
//! crates pass data in and act on the results.

pub mod bulk;
pub mod catalog;
pub mod records;
pub mod roles;
pub mod tabular;
pub mod types;

//! Bulk catalog operation engine.
//!
//! Dispatch → batched execution → progress snapshots, plus catalog export.
//! Both outer collaborators sit behind traits: [`store::CatalogStore`] for
//! catalog mutations and [`progress::ProgressStore`] for snapshots.

pub mod dispatcher;
pub mod executor;
pub mod export;
pub mod postgres;
pub mod progress;
pub mod record_handlers;
pub mod store;
pub mod tabular;

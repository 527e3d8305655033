//! archdrift-store
//!
//! Content-addressed persistence for the ArchDrift conformance engine:
//! the baseline store and the snapshot registry. Both layers
//! share one discipline: a single canonical-bytes routine feeds every
//! hash, and every writer goes through [`atomic::atomic_write`] so
//! readers never observe a partial file.
//!
//! This crate owns no business logic about edges, cycles, or rules —
//! that lives in `archdrift-core`. It only knows how to hash, store, and
//! load the artifacts `archdrift-core` produces.

pub mod atomic;
pub mod baseline;
pub mod canonical;
pub mod paths;
pub mod snapshot;

pub use archdrift_core::errors::{ArchDriftError, ArchDriftResult};

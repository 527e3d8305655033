//! archdrift-git
//!
//! The commit delta extractor: reads changed source blobs for a
//! commit and its parent straight out of the object database and folds
//! them through the same extract/resolve/map pipeline `archdrift-core`
//! uses for a full tree walk. The working tree and index are never
//! touched — every read goes through `git2`'s object layer.

pub mod delta;

pub use delta::{delta, CommitDelta, DeltaStats, Evidence};

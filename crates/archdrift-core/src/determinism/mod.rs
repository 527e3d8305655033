//! Determinism helpers shared by every component that produces a
//! content-addressed or compared artifact.

pub mod stable_sort;

pub use stable_sort::{ensure_sorted, stable_sort_by_key, stable_sort_strings};

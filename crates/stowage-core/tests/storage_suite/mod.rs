//! Facade tests for stowage-core.
//!
//! Every test builds a [`stowage_core::FileStorage`] over the in-memory
//! remote; failure-path tests use its failure injection hooks.

pub mod deleting;
pub mod facade;
pub mod paging;

//! Operator tooling for the Setu evidence store
//!
//! Every command loads [`SetuConfig`](setu_core::SetuConfig) from the `--config`
//! file, applies `SETU_*` environment overrides and builds an
//! [`EvidenceStore`](setu_store::EvidenceStore) from it. Handlers return JSON
//! values so the binary only has to print them.

#![forbid(unsafe_code)]

pub mod config;
pub mod handlers;
pub mod media;

//! # asutp-common
//!
//! Shared configuration, error handling and row models used across the ASU TP
//! diagnostic crates. No database access lives here, only primitives and contracts.

pub mod config;
pub mod error;
pub mod models;

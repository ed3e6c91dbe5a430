// crates/folio-config/src/lib.rs
// ============================================================================
// Module: Folio Config Library
// Description: Canonical config model and storage root resolution.
// Purpose: Single source of truth for folio.toml semantics.
// Dependencies: folio-store-sqlite, serde, toml, tracing
// ============================================================================

//! ## Overview
//! `folio-config` defines the configuration model for Folio tools: where the
//! content store lives, how shard connections are tuned, and the default log
//! filter. Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod data_dir;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use data_dir::*;

// crates/folio-core/src/lib.rs
// ============================================================================
// Module: Folio Core Library
// Description: Public API surface for the Folio content model.
// Purpose: Expose content types and backend-agnostic storage interfaces.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Folio core defines the content entities managed by the site backend and
//! the repository contract storage backends implement. It carries no storage
//! logic of its own; the sharded `SQLite` backend lives in
//! `folio-store-sqlite`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ContentRepository;
pub use interfaces::ScanOutcome;
pub use interfaces::SkippedShard;
pub use interfaces::StoreError;

//! Integration tests for Battle Armory.
//!
//! These tests exercise the cross-crate logic that does not need a live
//! database: the lifecycle state machine, sweep scheduling under an injected
//! clock, bulk-create fan-out, stats-summary completion, the error-to-status
//! contract, and the JSON wire shapes.
//!
//! Everything touching `PostgreSQL` is a single predicate-based statement
//! whose predicate mirrors a pure function tested here; end-to-end database
//! runs additionally require a `DATABASE_URL` and migrated schema:
//!
//! ```bash
//! cargo run -p armory-cli -- migrate
//! cargo test -p armory-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `item_lifecycle` - stage classification from creation to purge
//! - `sweep_schedule` - dueness transitions with explicit instants
//! - `bulk_create` - quantity fan-out
//! - `stats_summary` - per-type vector completeness
//! - `error_contract` - error taxonomy to HTTP status mapping, wire shapes

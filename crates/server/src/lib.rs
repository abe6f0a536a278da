//! Battle Armory server library.
//!
//! This crate provides the JSON API service as a library, allowing the
//! integration-tests crate and the CLI to reuse its pieces.
//!
//! # Architecture
//!
//! - Axum web framework, JSON request/response only (the React client is a
//!   separate deliverable)
//! - `PostgreSQL` via sqlx for users, listeners and battle items
//! - Session-cookie authentication backed by `PostgreSQL`
//! - An in-process lifecycle scheduler that advances battle items through
//!   `active → expired → purged` on wall-clock time

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod state;

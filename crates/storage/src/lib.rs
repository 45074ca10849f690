// Path: crates/storage/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo
    )
)]

//! Postgres-backed metadata store for the Axon agent registry.
//!
//! This crate owns the relational side of the registry: agent rows keyed on
//! `did` and capability rows that cascade-delete with their agent. The
//! startup migration is idempotent so a process restart against an
//! already-migrated database is a no-op.

pub mod postgres;

pub use postgres::PostgresStore;

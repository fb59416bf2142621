//! Client core for a personal job-application tracker.
//!
//! The UI layer (whatever renders it) talks to three reactive entity
//! stores (applications, companies, documents) that own their
//! collections and guarantee optimistic-update-with-rollback semantics
//! over a REST backend. Pure view-model derivations turn the flat lists
//! into calendar and board structures, and a pluggable intelligence
//! provider feeds the briefing panel through stale-response guards.

pub mod app;
pub mod auth;
pub mod config;
pub mod debounce;
pub mod errors;
pub mod gateway;
pub mod intelligence;
pub mod models;
pub mod notify;
pub mod store;
pub mod viewmodel;

pub use app::AppCore;
pub use config::Config;
pub use errors::{StoreError, StoreResult};

//! # pulse-gateway
//!
//! REST API gateway aggregating electronic-music event listings from two
//! upstream providers (Edmtrain and Ticketmaster Discovery), normalized
//! into one canonical shape and served from a PostgreSQL-backed cache
//! keyed by city.
//!
//! Reads never wait on upstream: a request whose city cache is past its
//! TTL answers immediately from the store and dispatches a background
//! refresh — in-process on a long-lived deployment, via a self-addressed
//! webhook on a serverless one.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── FreshnessTracker ── RefreshDispatcher (service/)
//!     │                            │
//!     │                       RefreshService
//!     │                       ├── Edmtrain / Ticketmaster (providers/)
//!     │                       ├── Normalizers (domain/)
//!     │                       └── Reconciler (service/)
//!     │
//!     └── PostgreSQL Persistence (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod providers;
pub mod service;

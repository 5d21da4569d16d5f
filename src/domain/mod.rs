//! Domain layer: canonical event model, cross-source ID derivation, and
//! per-provider normalizers.
//!
//! Everything in this module is pure: no I/O, no clocks other than the
//! `created_date` default stamped at normalization time.

pub mod event;
pub mod event_id;
pub mod normalize;

pub use event::{Artist, CanonicalEvent, EventSource, Venue};
pub use event_id::{DERIVED_ID_FLOOR, derived_event_id, derived_numeric_id};

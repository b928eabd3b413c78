//! Owner-scoped persistence of computed instruments.
//!
//! Calculators never touch this module. A service validates and recomputes
//! a record in full, then hands the finished value to a [`RecordStore`],
//! which swaps it in under one write lock.

pub mod clock;
pub mod identity;
pub mod instrument;
pub mod memory;
pub mod service;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use identity::{IdentityResolver, StaticIdentities};
pub use instrument::Instrument;
pub use memory::InMemoryStore;
pub use service::InstrumentService;
pub use store::{RecordStore, StoredRecord};

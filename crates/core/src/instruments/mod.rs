//! Instrument domain: tradeable assets tracked by the platform.

pub mod instruments_model;
pub mod instruments_traits;

pub use instruments_model::{Instrument, InstrumentType, InstrumentUpdate, NewInstrument};
pub use instruments_traits::InstrumentStore;

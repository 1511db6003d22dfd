//! Price domain: OHLCV observations for instruments.

pub mod prices_model;
pub mod prices_traits;

pub use prices_model::{NewPriceRecord, PriceRecord};
pub use prices_traits::PriceStore;

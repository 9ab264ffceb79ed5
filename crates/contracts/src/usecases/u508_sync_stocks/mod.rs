//! Типы UseCase синхронизации остатков и цен поставщика с маркетплейсами

pub mod feed;
pub mod payload;
pub mod report;

pub use feed::FeedRecord;
pub use payload::{Currency, PricePayloadEntry, StockPayloadEntry};
pub use report::{SyncOutcome, SyncReport};

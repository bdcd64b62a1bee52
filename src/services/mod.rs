// Service exports
pub mod accessors;
pub mod cache;
pub mod engine;
pub mod memory;
pub mod postgres;

pub use accessors::{AccessorError, BookingAccessor, CatalogAccessor, SignalAccessor};
pub use cache::{CacheManager, CacheKey, CacheError, CacheStats};
pub use engine::{BookingEngine, EngineError, EngineOptions};
pub use memory::{InMemoryBookings, InMemoryCatalog, InMemorySignals};
pub use postgres::{HistoryLimits, PostgresClient};

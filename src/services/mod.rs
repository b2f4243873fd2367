// Service exports
pub mod appwrite;
pub mod cache;
pub mod postgres;
pub mod store;

pub use appwrite::{AppwriteConnection, AppwriteError, AppwriteProfileStore};
pub use cache::{CacheError, CacheKey, CacheManager, CacheStats, CachedProfileStore};
pub use postgres::{PostgresConnection, PostgresError, PostgresProfileStore};
pub use store::{CandidateStream, InMemoryProfileStore, ProfileStore, StoreError};

// Service exports
pub mod cache;
pub mod courses;
pub mod identity;
pub mod memory;
pub mod postgres;
pub mod rounds;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use identity::{IdentityError, IdentityVerifier, JwksClient, JwksError};
pub use memory::MemoryStore;
pub use postgres::PostgresClient;
pub use store::{CourseStore, StoreError};

mod memory;
mod postgres_pool;
mod postgres_query;
mod repository;
mod types;

pub use memory::InMemoryMerchantRepository;
pub use postgres_pool::PostgresPool;
pub use repository::MerchantRepository;
pub use types::MerchantDBError;

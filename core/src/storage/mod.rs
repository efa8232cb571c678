mod database;
mod favorite_store;
mod local_storage;
mod session;
mod sqlite_storage;

pub use database::{Connection, Database, SCHEMA_VERSION};
pub use favorite_store::{FavoriteStore, FAVORITES_KEY};
pub use local_storage::{LocalStorage, MemoryStorage};
pub use session::{Session, AUTH_KEY};
pub use sqlite_storage::SqliteStorage;

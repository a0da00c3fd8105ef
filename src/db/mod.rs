//! Persistence module split across logical submodules.

mod books;
mod connection;
mod users;

pub use books::CatalogStore;
pub use connection::{ensure_schema, open_database, open_in_memory};
pub use users::UserDirectory;

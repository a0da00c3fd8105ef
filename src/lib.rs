//! Core library surface for the Library Manager TUI.
//!
//! `circulation` holds the issue/return rules, `db` the SQLite-backed catalog
//! and user directory, and `ui` the terminal front-end. The binary only wires
//! configuration, logging and the database handle together.
pub mod circulation;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

pub use circulation::{parse_book_id, parse_user_id, Circulation};
pub use config::{AdminCredentials, AppConfig};
pub use db::{open_database, CatalogStore, UserDirectory};
pub use error::{LibraryError, LibraryResult};

/// The domain types the other layers pass around.
pub use models::{Availability, Book, BookId, User, UserId};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

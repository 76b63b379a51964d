//! Personal wardrobe manager.
//!
//! Four tables (wardrobe, wear log, profile, community posts) live in a
//! [`TableStore`] owned by a [`Session`]. They are read from flat CSV/JSON
//! files on login and written back only on an explicit save or logout.

pub mod community;
pub mod config;
pub mod error;
pub mod images;
pub mod layout;
pub mod logging;
pub mod model;
pub mod session;
pub mod stats;
pub mod store;
pub mod table;
pub mod wardrobe;
pub mod wear_log;
pub mod weather;

pub use error::{AppError, AppResult};
pub use layout::DataLayout;
pub use logging::init_logging;
pub use session::Session;
pub use store::{LoadReport, TableStore};

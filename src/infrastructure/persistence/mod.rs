pub mod database;
pub mod model_registry;

pub use database::{Database, SqliteApartmentSource};
pub use model_registry::ModelRegistry;

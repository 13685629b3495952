pub mod csv_source;
pub mod mock;
pub mod observability;
pub mod persistence;

pub use csv_source::CsvApartmentSource;
pub use mock::InMemoryApartmentSource;

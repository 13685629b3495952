// Apartment records and request payloads
pub mod apartment;

// Feature schema shared by training and inference
pub mod ml;

// Hyperparameter search domain
pub mod optimization;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;

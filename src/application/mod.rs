// Feature encoding, splitting and the model adapter
pub mod ml;

// Hyperparameter search and evaluation
pub mod optimization;

// End-to-end training run
pub mod training;

// Online predictions
pub mod inference;

pub mod errors;
pub mod execution;
pub mod ranking;
pub mod sampling;
pub mod summary;
pub mod types;

pub mod aggregate;
pub mod config;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "loans")]
pub mod loans;

#[cfg(feature = "investments")]
pub mod investments;

#[cfg(feature = "planning")]
pub mod planning;

#[cfg(feature = "records")]
pub mod records;

pub use error::FinTrackError;
pub use types::*;

/// Standard result type for all fintrack operations
pub type FinTrackResult<T> = Result<T, FinTrackError>;

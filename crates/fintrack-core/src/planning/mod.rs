pub mod goals;
pub mod income;

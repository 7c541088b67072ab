//! Command implementations.

pub mod benchmark;
pub mod extract;
pub mod providers;

pub use self::benchmark::execute_benchmark;
pub use self::extract::execute_extract;
pub use self::providers::execute_providers;

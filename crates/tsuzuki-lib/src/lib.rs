pub mod comparison;
pub mod error;
pub mod models;
pub mod prelude;

/// This is used to ensure both application and sources agree on the chapter model
pub static LIB_VERSION: &str = env!("CARGO_PKG_VERSION");

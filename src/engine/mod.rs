pub mod error;
pub mod quote_engine;
pub mod session;

pub mod error;
pub mod fallback;
pub mod price_book;
pub mod price_fetcher;
pub mod price_source;
pub mod retry;

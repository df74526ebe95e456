pub mod exchange_rate_client;

pub mod coingecko_client;
pub mod coingecko_config;

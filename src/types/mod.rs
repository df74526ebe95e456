pub mod account_type;
pub mod asset;
pub mod blockchain;
pub mod fiat;
pub mod money;
pub mod operation;
pub mod price;
pub mod quote;
pub mod quote_id;
pub mod quote_request;

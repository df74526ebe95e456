pub mod amount;
pub mod catalog_membership;
pub mod contact_email;
pub mod wallet_address;

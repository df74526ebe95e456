pub mod checks;
pub mod form;
pub mod reason;
pub mod validator;

pub mod quote_view;

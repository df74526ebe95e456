pub mod clipboard;
pub mod handoff;
pub mod quote_text;

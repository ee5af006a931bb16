pub mod filter;
pub mod index;
pub mod metadata;
pub mod question;
pub mod scope_gate;

pub mod core;
pub mod signature;

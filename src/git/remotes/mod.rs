pub mod operations;
pub mod sync;

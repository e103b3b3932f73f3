pub mod manager;
pub mod operations;

pub mod backends;
pub mod context;

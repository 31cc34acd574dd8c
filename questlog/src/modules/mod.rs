pub mod config;
pub mod handlers;
pub mod migration;
pub mod store;
pub mod sync;

pub mod config;
pub mod errors;
pub mod exchanges;
pub mod models;
pub mod report;
pub mod store;

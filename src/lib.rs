pub mod aggregator;
pub mod api;
pub mod config;
pub mod contracts;
pub mod error;
pub mod models;
pub mod parser;
pub mod rpc;
pub mod volume;

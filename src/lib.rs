pub mod config;
pub mod error;
pub mod fetch;
pub mod forecast;
pub mod output;
pub mod rollup;
pub mod service;
pub mod store;

pub mod config;
pub mod fetch;
pub mod harness;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod store;

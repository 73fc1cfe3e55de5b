pub mod build;
pub mod config;
pub mod dependency;
pub mod error;
pub mod pipeline;
pub mod service;
pub mod version;

pub mod ai_service;
pub mod config;
pub mod deploy;
pub mod doctor;
pub mod error;
pub mod generator;
pub mod logging;
pub mod pipeline;
pub mod server;


pub use error::ApiError;
pub use pipeline::GenerationResult;

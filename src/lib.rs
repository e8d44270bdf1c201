pub mod analysis;
pub mod config;
pub mod error;
pub mod exercise;
pub mod pose;
pub mod predictor;
pub mod render;
pub mod session;

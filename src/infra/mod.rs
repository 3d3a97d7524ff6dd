pub mod classifier;
pub mod config;
pub mod speech;
pub mod translator;

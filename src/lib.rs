pub mod analysis;
pub mod config;
pub mod etl;
pub mod grid;
pub mod importers;
pub mod models;
pub mod services;
pub mod utils;

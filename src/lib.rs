pub mod catalog;
pub mod chart;
pub mod config;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod table;

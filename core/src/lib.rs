pub mod calendar;
pub mod config;
pub mod demo;
pub mod engine;
pub mod error;
pub mod mode;
pub mod name_generator;
pub mod optimizer;
pub mod reporter;
pub mod rng;
pub mod simulator;
pub mod snapshot;
pub mod store;
pub mod types;

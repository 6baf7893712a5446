pub mod api;
pub mod app;
pub mod audit;
pub mod cli;
pub mod config;
pub mod grading;
pub mod logging;
pub mod monitor;
pub mod results;
pub mod state;
pub mod students;
pub mod utils;
pub mod web;

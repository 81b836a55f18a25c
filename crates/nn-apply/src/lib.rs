pub mod cli;
pub mod config;
pub mod host;

mod logging;

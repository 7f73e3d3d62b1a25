//! Headless host for the `vip8` engine.

pub mod config;
pub mod logger;
pub mod runner;

pub use config::Config;
pub use runner::{run, HeadlessContext, Report};

pub mod config;
pub mod error;
pub mod function;
pub mod pipeline;
pub mod runner;
pub mod settings;
pub mod steps;

pub use error::{Error, Result};

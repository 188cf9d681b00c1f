pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod constraints;
pub mod dataset;
pub mod datasets;
pub mod dims;
pub mod encode;
pub mod model;
pub mod parser;
pub mod render;
pub mod solver;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;

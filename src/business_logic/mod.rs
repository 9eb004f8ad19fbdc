pub mod aggregate;
pub mod config;
pub mod double_top;
pub mod peaks;

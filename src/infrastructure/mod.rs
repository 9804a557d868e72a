pub mod config;
pub mod decode;

pub mod ports;
pub mod types;

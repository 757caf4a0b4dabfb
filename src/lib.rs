// Game rules, persistence and configuration. The terminal front end lives in
// the binary (main.rs) and drives everything through these modules.

pub mod config;
pub mod engine;
pub mod generator;
pub mod session;
pub mod store;

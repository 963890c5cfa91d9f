pub mod api;
pub mod config;
pub mod consts;
pub mod error;
pub mod key;
pub mod language;
pub mod loader;
pub mod optimizer;
pub mod problem;
pub mod scorer;
pub mod token;
// cmd and reports are modules of the binary crate (main.rs).

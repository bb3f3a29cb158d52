pub mod config;
mod http_layers;
pub mod server;
mod session;
pub mod state;
mod upload;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};

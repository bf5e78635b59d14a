pub mod api;
pub mod chain_info;
pub mod config;
pub mod proposer;
pub mod task;
pub mod utils;
pub mod validator;

pub use config::*;
pub use proposer::*;
pub use validator::*;

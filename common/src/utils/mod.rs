pub mod config;
pub mod file_operations;
pub mod logging;
pub mod rpc_client;

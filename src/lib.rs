pub mod client;
pub mod config;
pub mod decode;
pub mod model;
pub mod server;
pub mod shutdown;
pub mod store;

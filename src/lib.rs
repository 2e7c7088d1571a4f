//! Library crate for ssh-check-rs: concurrent TCP liveness sweep followed by
//! SSH password checks, with deduplicated results persisted as they are found.
pub mod auth;
pub mod config;
pub mod gate;
pub mod hosts;
pub mod inputs;
pub mod liveness;
pub mod logging;
pub mod login;
pub mod mode;
pub mod persist;
pub mod pool;
pub mod ports;
pub mod runner;
pub mod store;
pub mod targets;
pub mod types;

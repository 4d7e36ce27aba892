pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod enums;
pub mod events;
pub mod handlers;
pub mod keys;
pub mod projection;
pub mod protocol;
pub mod rating;
pub mod run_state;
pub mod stats;

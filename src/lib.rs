pub mod cache;
pub mod client;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod output;
pub mod paging;
pub mod parse;
pub mod registry;
pub mod resolve;
pub mod stats;
pub mod throttle;
pub mod transport;

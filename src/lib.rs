pub mod app;
pub mod aria2;
pub mod calendar;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod http;
pub mod naming;
pub mod output;
pub mod planner;
pub mod pool;
pub mod store;
pub mod transport;
pub mod verify;

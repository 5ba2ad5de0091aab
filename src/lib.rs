pub mod artifact;
pub mod client;
pub mod config;
pub mod humanize;
pub mod observability;
pub mod session;
pub mod state;

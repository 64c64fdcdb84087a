pub mod clean;
pub mod cli;
pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod exclude;
pub mod init;

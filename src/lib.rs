pub mod app;
pub mod cache;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod metadata;
pub mod notice;
pub mod render;
pub mod selection;
pub mod session;
pub mod storage;
pub mod types;
pub mod wire;

#[cfg(test)]
mod testing;

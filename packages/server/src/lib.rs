// Web3 Jobs Aggregator - Server Core
//
// Scrapes job listings from configured websites, stores each distinct posting
// once, and announces new postings to a Telegram channel.
//
// Business logic lives in domains/*; infrastructure seams live in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;

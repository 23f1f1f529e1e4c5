//! A command-line TV show episode tracker written in Rust.
//!
//! showtracker remembers, for every show you follow, the next episode to
//! watch. Episode listings and ratings come from OMDb and are cached in a
//! local show database; your positions live in a separate tracker database.
//!
//! # Features
//!
//! - Track shows by title or by a short code
//! - Step forwards and backwards through episodes, across season boundaries
//! - Import a plain-text watchlist
//! - Print a table of next episodes with their IMDb ratings
//!
//! # Usage
//!
//! ```bash
//! # Start tracking a show at a given episode
//! cargo run -- add "game of thrones" s06e09 --short-code got
//!
//! # Mark two episodes as watched
//! cargo run -- inc got --by 2
//!
//! # Show what's next for every show
//! cargo run -- --list
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod cursor;
pub mod error;
pub mod navigator;
pub mod position;
pub mod storage;
pub mod tracker;
pub mod types;
pub mod ui;
pub mod watchlist;

//! Trip Budget CLI Library
//!
//! Trip and expense budgeting, currency conversion through cached exchange
//! rates, and a country explorer. The binary in `main.rs` wires these into
//! the command line and the terminal UI.

pub mod app;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod converter;
pub mod data;
pub mod expenses;
pub mod explorer;
pub mod format;
pub mod storage;
pub mod trips;
pub mod ui;

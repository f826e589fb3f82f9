#![allow(unused_assignments)] // thiserror/miette proc macros trigger false positives

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod correlate;
pub mod discovery;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod netparse;
pub mod ssh;
pub mod tui;

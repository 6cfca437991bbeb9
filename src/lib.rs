//! Divcal - monthly dividend income calendar
//!
//! This library builds an estimated month-by-month dividend income table for
//! a portfolio of equities from each holding's trailing 12 months of
//! distributions.

pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod dividends;
pub mod error;
pub mod portfolio;
pub mod symbols;
pub mod ui;
pub mod utils;

//! Barback Core — bar-by-bar backtest engine, strategies, and analytics.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, series, intents, positions, trades)
//! - Streaming indicators with explicit warm-up (SMA, RSI, ATR, rolling extrema)
//! - Strategy trait plus the two built-in strategies
//! - Single-position order manager and the four-phase bar loop
//! - Pure-function performance metrics
//! - Pluggable data providers (CSV, in-memory, synthetic)

pub mod analytics;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;

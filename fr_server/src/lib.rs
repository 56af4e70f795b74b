//! HTTP front end for the fair roulette engine.

pub mod api;
pub mod config;
pub mod logging;

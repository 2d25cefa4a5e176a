//! Core domain types and simulation logic.

pub mod bar;
pub mod order;
pub mod broker;
pub mod portfolio;
pub mod engine;
pub mod strategy;
pub mod strategies;
pub mod metrics;
pub mod risk;
pub mod config_validation;
pub mod error;

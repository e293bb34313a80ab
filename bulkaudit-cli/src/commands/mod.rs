//! Command handlers

pub mod audit;

//! Core infrastructure for the recipe driver

pub mod config;
pub mod error;
pub mod layout;
pub mod lifecycle;
pub mod manifest;
pub mod output;
pub mod recipe;
pub mod settings;
pub mod sources;

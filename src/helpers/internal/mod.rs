//! Internal helpers shared across the lifecycle steps

pub mod fs_utils;
pub mod progress;

//! Utility modules

pub mod paths;

pub use paths::{data_dir, debug_dir, init_data_dir};

//! Integration test modules for tapedeck

pub mod engine;
pub mod loop_record;
pub mod transport;

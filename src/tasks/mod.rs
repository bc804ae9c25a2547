//! Background Tasks Module
//!
//! # Tasks
//! - Expiry cleanup: drops expired soft locks and values at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;

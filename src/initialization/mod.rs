//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger (plain or JSON)
//! - System DNS resolver discovery (for EDNS probing through the host resolver)
//! - Concurrency semaphores
//!
//! All initialization functions return proper error types for error handling.

mod logger;
mod resolver;

use std::sync::Arc;

use tokio::sync::Semaphore;

// Re-export public API
pub use logger::init_logger_with;
pub use resolver::system_nameservers;

/// Initializes a semaphore for controlling concurrency.
///
/// A width of zero is raised to one so a misconfigured pool still makes progress.
///
/// # Arguments
///
/// * `count` - Maximum number of concurrent operations allowed
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count.max(1)))
}

//! Common test utilities and helpers.
//!
//! This module provides shared functionality for all tests, including:
//! - PDF fixture builders
//! - Text-layer assertions
//! - A scripted detector standing in for the model runtime

#![allow(dead_code)]

pub mod assertions;
pub mod detector;
pub mod fixtures;

pub use assertions::*;
pub use detector::*;
pub use fixtures::*;

use std::sync::{Mutex, MutexGuard};

// MuPDF-heavy tests run one at a time; tests that exercise concurrent
// runs spawn their own threads while holding the lock.
static MUPDF_LOCK: Mutex<()> = Mutex::new(());

/// Holds the MuPDF lock for the rest of the scope.
pub fn mupdf_lock() -> MutexGuard<'static, ()> {
    MUPDF_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the bridge:
//! - Math types shared by the wire records and the scene pool
//! - Logging utilities

pub mod math;
pub mod logging;

//! Crate-level tests that drive the renderer end to end on recording backends

#![allow(missing_docs)]

pub mod mock_backend;

//! Logging utilities
//!
//! Shared `log` helpers for the readers.

pub mod log;

pub use log::{
    log_operation_complete, log_operation_start, log_type_fallback, log_unmatched_fields,
    log_warning,
};

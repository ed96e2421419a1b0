//! Shared infrastructure utilities for the RabbitRelay console.
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename)
//! - **`security`**: Secret masking and redaction for display and logs

pub mod atomic_write;
pub mod security;

pub use atomic_write::{
    AtomicWriteOptions, FileSyncPolicy, PersistMode, atomic_write, atomic_write_with_options,
    ensure_private_dir,
};
pub use security::{mask_secret, redact_api_keys};

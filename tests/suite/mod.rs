//! Integration test modules

mod errors;
mod headers;
mod reports;
mod session;
mod settings;
mod store;

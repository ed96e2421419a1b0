//! Console workflows for RabbitRelay.
//!
//! The client crate knows how to talk to the backend; this crate holds the
//! local state machines built on top of it:
//!
//! - [`SettingsForm`]: edit, validate and save the admin system settings
//! - [`session`]: admin login, logout, social login and the current profile
//! - [`DevSettings`]: the debug-mode identity and credentials
//! - [`HealthSnapshot`]: which backend the console is pointed at, and why

mod dev;
pub mod errors;
mod health;
pub mod session;
mod settings_form;

pub use dev::{DEFAULT_DEV_USER_ID, DevSettings, DevSettingsUpdate};
pub use health::HealthSnapshot;
pub use session::SessionError;
pub use settings_form::{FormEntry, FormError, SettingsForm};

//! Core domain types for the RabbitRelay console.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application: the HTTP client
//! builds request bodies from these types, the CLI parses arguments into them, and
//! the settings form session validates against [`SettingMeta`].

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

/// Declares a closed set of wire strings as a Rust enum.
///
/// Parsing is case-insensitive and accepts `-` in place of `_` so CLI input like
/// `model-day` maps to the wire value `model_day`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::ValueParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str() == normalized)
                    .ok_or_else(|| {
                        let expected = Self::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join("|");
                        $crate::ValueParseError::new($kind, s.trim(), expected)
                    })
            }
        }
    };
}

mod billing;
mod ids;
mod report;
mod settings;

pub use billing::{
    BillingCycle, EntityType, OverflowPolicy, PlanType, PriceUnit, ResetTime, SocialProvider,
};
pub use ids::{
    CustomerId, IdParseError, InvoiceId, MappingId, OrganizationId, PlanId, SubscriptionId,
    TeamId, UserId,
};
pub use report::{GroupBy, ReportDate, ReportFormat};
pub use settings::{
    SettingError, SettingMeta, SettingType, SettingsSchema, group_title, has_http_scheme,
    is_enabled, validate_setting,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Value Parsing
// ============================================================================

/// Error returned when a string does not name a known variant of a wire enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value:?} (expected {expected})")]
pub struct ValueParseError {
    kind: &'static str,
    value: String,
    expected: String,
}

impl ValueParseError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

// ============================================================================
// Secrets
// ============================================================================

/// A credential (dev API key, admin token, upstream proxy key).
///
/// Invariant: non-empty after trimming. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a credential. Blank values are treated as "not configured".
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(<redacted>)")
    }
}

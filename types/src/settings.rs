//! System settings metadata and the metadata-driven field validator.
//!
//! The backend publishes a schema (`GET /v1/settings/keys`) describing every
//! editable key. [`validate_setting`] applies the per-type rules locally so an
//! obviously bad value never makes the round trip. The backend stays the
//! authority; a value accepted here may still be rejected there.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declared value type of a setting. Unknown type names fall back to `String`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettingType {
    #[default]
    String,
    Multiline,
    Int,
    Bool,
    Enum,
}

impl SettingType {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "multiline" => Self::Multiline,
            "int" => Self::Int,
            "bool" => Self::Bool,
            "enum" => Self::Enum,
            _ => Self::String,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Multiline => "multiline",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Enum => "enum",
        }
    }
}

impl From<String> for SettingType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl Serialize for SettingType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SettingType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)
            .map(|raw| raw.map(Self::from).unwrap_or_default())
    }
}

fn default_group() -> String {
    "other".to_string()
}

/// One entry of the settings schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingMeta {
    key: String,
    #[serde(default = "default_group")]
    group: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(rename = "type", default)]
    kind: SettingType,
    #[serde(rename = "enum", default)]
    allowed: Option<Vec<String>>,
    #[serde(default)]
    sensitive: bool,
    #[serde(default)]
    min: Option<i64>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    desc: Option<String>,
}

impl SettingMeta {
    /// A plain string setting in the `other` group.
    #[must_use]
    pub fn new(key: impl Into<String>, kind: SettingType) -> Self {
        Self {
            key: key.into(),
            group: default_group(),
            label: None,
            kind,
            allowed: None,
            sensitive: false,
            min: None,
            format: None,
            desc: None,
        }
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn with_allowed<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(allowed.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The label, or the key when the schema declares none.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }

    #[must_use]
    pub fn kind(&self) -> SettingType {
        self.kind
    }

    #[must_use]
    pub fn allowed(&self) -> Option<&[String]> {
        self.allowed.as_deref()
    }

    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    #[must_use]
    pub fn min(&self) -> Option<i64> {
        self.min
    }

    #[must_use]
    pub fn is_url(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("url"))
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.desc.as_deref()
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Why a candidate value was refused. `Display` is the message shown next to
/// the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingError {
    #[error("must be an integer")]
    NotInteger,
    #[error("must not be less than {min}")]
    BelowMinimum { min: i64 },
    #[error("must be one of {}", allowed.join("/"))]
    NotAllowed { allowed: Vec<String> },
    #[error("must be an http/https URL")]
    NotUrl,
}

/// Check `value` against the rules declared by `meta`.
pub fn validate_setting(meta: &SettingMeta, value: &str) -> Result<(), SettingError> {
    match meta.kind {
        SettingType::Int => {
            let parsed = value
                .trim()
                .parse::<i64>()
                .map_err(|_| SettingError::NotInteger)?;
            match meta.min {
                Some(min) if parsed < min => Err(SettingError::BelowMinimum { min }),
                _ => Ok(()),
            }
        }
        SettingType::Bool => Ok(()),
        SettingType::Enum => match &meta.allowed {
            Some(allowed) if !allowed.iter().any(|a| a == value) => {
                Err(SettingError::NotAllowed {
                    allowed: allowed.clone(),
                })
            }
            _ => Ok(()),
        },
        SettingType::String | SettingType::Multiline => {
            if meta.is_url() && !value.is_empty() && !has_http_scheme(value) {
                return Err(SettingError::NotUrl);
            }
            Ok(())
        }
    }
}

/// Whether `value` starts with `http://` or `https://`, in any case.
#[must_use]
pub fn has_http_scheme(value: &str) -> bool {
    ["http://", "https://"].iter().any(|prefix| {
        value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Whether a stored bool setting reads as enabled.
#[must_use]
pub fn is_enabled(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true") || value == "1"
}

/// Display heading for a schema group.
#[must_use]
pub fn group_title(group: &str) -> &'static str {
    match group {
        "payments" => "Payments",
        "lago" => "Lago",
        "litellm" => "LiteLLM",
        "auth" => "Auth / Logto",
        "rate_limit" => "Rate limiting",
        "overdraft" => "Overdraft / degrade",
        _ => "Other",
    }
}

// ============================================================================
// Schema
// ============================================================================

/// The full schema as returned by `GET /v1/settings/keys`.
///
/// The response also carries a `groups` list; group order is derived from
/// the keys instead so the two can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSchema {
    #[serde(default)]
    keys: Vec<SettingMeta>,
}

impl SettingsSchema {
    #[must_use]
    pub fn new(keys: Vec<SettingMeta>) -> Self {
        Self { keys }
    }

    #[must_use]
    pub fn keys(&self) -> &[SettingMeta] {
        &self.keys
    }

    #[must_use]
    pub fn find(&self, key: &str) -> Option<&SettingMeta> {
        self.keys.iter().find(|meta| meta.key == key)
    }

    /// Group names in first-seen order.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for meta in &self.keys {
            if !groups.contains(&meta.group.as_str()) {
                groups.push(&meta.group);
            }
        }
        groups
    }

    pub fn in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a SettingMeta> + 'a {
        self.keys.iter().filter(move |meta| meta.group == group)
    }
}

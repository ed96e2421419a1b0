//! Editing session for the admin system settings.
//!
//! A [`SettingsForm`] is built from the stored rows and the key schema, takes
//! edits one field at a time, and turns the result into the `values` map for
//! `PATCH /v1/settings`.

use std::collections::{BTreeMap, HashSet};

use rabbit_client::{SettingEntry, SettingsSnapshot};
use rabbit_types::{SettingError, SettingMeta, SettingsSchema, validate_setting};

/// Keys the settings table never writes.
const PROTECTED_KEYS: [&str; 2] = ["db_layer", "dev_api_key"];

const MASK: &str = "••••••";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("no settings to save")]
    NothingToSave,
    #[error("invalid values for: {}", keys.join(", "))]
    Invalid { keys: Vec<String> },
}

/// One editable row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormEntry {
    pub key: String,
    pub value: String,
    /// Stored value is hidden; `value` stays empty until the user types one.
    pub masked: bool,
    pub configured: bool,
}

impl From<&SettingEntry> for FormEntry {
    fn from(entry: &SettingEntry) -> Self {
        Self {
            key: entry.key.clone(),
            value: entry.value_text(),
            masked: entry.masked,
            configured: entry.configured.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    schema: SettingsSchema,
    entries: Vec<FormEntry>,
    errors: BTreeMap<String, SettingError>,
    db_layer: i64,
    dev_api_key_configured: bool,
}

impl SettingsForm {
    #[must_use]
    pub fn new(snapshot: &SettingsSnapshot, schema: SettingsSchema) -> Self {
        let entries = snapshot
            .settings
            .iter()
            .filter(|entry| entry.key != "db_layer")
            .map(FormEntry::from)
            .collect();
        Self {
            schema,
            entries,
            errors: BTreeMap::new(),
            db_layer: snapshot.db_layer,
            dev_api_key_configured: snapshot.dev_api_key_configured,
        }
    }

    #[must_use]
    pub fn schema(&self) -> &SettingsSchema {
        &self.schema
    }

    #[must_use]
    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&FormEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    #[must_use]
    pub fn db_layer(&self) -> i64 {
        self.db_layer
    }

    #[must_use]
    pub fn dev_api_key_configured(&self) -> bool {
        self.dev_api_key_configured
    }

    /// Update `key` (appending a row for a schema key not stored yet) and
    /// re-validate it. Surrounding whitespace in `key` is ignored.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        let key = key.trim();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == key) {
            entry.value.clone_from(&value);
        } else {
            let masked = self.schema.find(key).is_some_and(SettingMeta::is_sensitive);
            self.entries.push(FormEntry {
                key: key.to_string(),
                value: value.clone(),
                masked,
                configured: false,
            });
        }
        self.validate_single(key, &value);
    }

    /// Append a custom row with a trimmed key. Duplicates are allowed here
    /// and refused on save.
    pub fn add_entry(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let entry = FormEntry {
            key: key.into().trim().to_string(),
            value: value.into(),
            ..FormEntry::default()
        };
        if !entry.key.is_empty() {
            self.validate_single(&entry.key, &entry.value);
        }
        self.entries.push(entry);
    }

    /// Drop the first row with `key`. Returns whether a row was removed.
    pub fn remove_entry(&mut self, key: &str) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.key == key) else {
            return false;
        };
        self.entries.remove(index);
        if !self.entries.iter().any(|entry| entry.key == key) {
            self.errors.remove(key);
        }
        true
    }

    #[must_use]
    pub fn errors(&self) -> &BTreeMap<String, SettingError> {
        &self.errors
    }

    #[must_use]
    pub fn error(&self, key: &str) -> Option<&SettingError> {
        self.errors.get(key)
    }

    /// False while any field carries a validation error.
    #[must_use]
    pub fn can_save(&self) -> bool {
        self.errors.is_empty()
    }

    /// Labels of the invalid fields in `group`.
    #[must_use]
    pub fn group_errors<'a>(&'a self, group: &'a str) -> Vec<&'a str> {
        self.schema
            .in_group(group)
            .filter(|meta| self.errors.contains_key(meta.key()))
            .map(SettingMeta::display_label)
            .collect()
    }

    /// Text to show for `key`. Hidden values never come back in full.
    #[must_use]
    pub fn display_value(&self, key: &str) -> String {
        let Some(entry) = self.entry(key) else {
            return String::new();
        };
        let sensitive = self.schema.find(key).is_some_and(SettingMeta::is_sensitive);
        if entry.value.is_empty() {
            return if entry.masked && entry.configured {
                MASK.to_string()
            } else {
                String::new()
            };
        }
        if sensitive || entry.masked {
            rabbit_utils::mask_secret(&entry.value)
        } else {
            entry.value.clone()
        }
    }

    /// Build the `values` map to send, re-validating every key in it.
    ///
    /// A masked row the user has not retyped is left out, so the stored
    /// secret stays as it is.
    pub fn prepare_save(&mut self) -> Result<BTreeMap<String, String>, FormError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            let key = entry.key.trim();
            if !key.is_empty() && !seen.insert(key) {
                return Err(FormError::DuplicateKey(key.to_string()));
            }
        }

        let values: BTreeMap<String, String> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let key = entry.key.trim();
                let untouched_secret = entry.masked && entry.value.is_empty();
                (!key.is_empty() && !is_protected(key) && !untouched_secret)
                    .then(|| (key.to_string(), entry.value.clone()))
            })
            .collect();
        if values.is_empty() {
            return Err(FormError::NothingToSave);
        }

        for (key, value) in &values {
            self.validate_single(key, value);
        }
        let invalid: Vec<String> = values
            .keys()
            .filter(|key| self.errors.contains_key(*key))
            .cloned()
            .collect();
        if !invalid.is_empty() {
            return Err(FormError::Invalid { keys: invalid });
        }
        Ok(values)
    }

    fn validate_single(&mut self, key: &str, value: &str) {
        let Some(meta) = self.schema.find(key) else {
            self.errors.remove(key);
            return;
        };
        match validate_setting(meta, value) {
            Ok(()) => {
                self.errors.remove(key);
            }
            Err(err) => {
                self.errors.insert(key.to_string(), err);
            }
        }
    }
}

fn is_protected(key: &str) -> bool {
    PROTECTED_KEYS
        .iter()
        .any(|protected| key.eq_ignore_ascii_case(protected))
}

#[cfg(test)]
mod tests {
    use rabbit_client::{SettingEntry, SettingsSnapshot};
    use rabbit_types::{SettingError, SettingMeta, SettingType, SettingsSchema};
    use serde_json::json;

    use super::{FormError, SettingsForm};

    fn schema() -> SettingsSchema {
        SettingsSchema::new(vec![
            SettingMeta::new("RATE_LIMIT_PER_MIN", SettingType::Int)
                .with_group("rate_limit")
                .with_label("Requests per minute")
                .with_min(0),
            SettingMeta::new("LAGO_API_URL", SettingType::String)
                .with_group("lago")
                .with_label("Lago URL")
                .with_format("url"),
            SettingMeta::new("STRIPE_SECRET_KEY", SettingType::String)
                .with_group("payments")
                .with_label("Stripe secret key")
                .sensitive(),
        ])
    }

    fn row(key: &str, value: Option<serde_json::Value>, masked: bool) -> SettingEntry {
        SettingEntry {
            key: key.to_string(),
            value,
            masked,
            configured: Some(masked),
            updated_at: None,
        }
    }

    fn form() -> SettingsForm {
        let snapshot = SettingsSnapshot {
            settings: vec![
                row("db_layer", Some(json!(2)), false),
                row("RATE_LIMIT_PER_MIN", Some(json!("60")), false),
                row("STRIPE_SECRET_KEY", None, true),
            ],
            db_layer: 2,
            dev_api_key_configured: true,
        };
        SettingsForm::new(&snapshot, schema())
    }

    #[test]
    fn db_layer_row_is_dropped_on_load() {
        let form = form();
        assert!(form.entry("db_layer").is_none());
        assert_eq!(form.db_layer(), 2);
        assert_eq!(form.entry("RATE_LIMIT_PER_MIN").unwrap().value, "60");
    }

    #[test]
    fn invalid_edit_blocks_saving_until_fixed() {
        let mut form = form();
        form.set_value("RATE_LIMIT_PER_MIN", "abc");
        assert_eq!(
            form.error("RATE_LIMIT_PER_MIN"),
            Some(&SettingError::NotInteger)
        );
        assert!(!form.can_save());
        assert_eq!(form.group_errors("rate_limit"), vec!["Requests per minute"]);

        form.set_value("RATE_LIMIT_PER_MIN", "-1");
        assert_eq!(
            form.error("RATE_LIMIT_PER_MIN").map(ToString::to_string),
            Some("must not be less than 0".to_string())
        );

        form.set_value("RATE_LIMIT_PER_MIN", "120");
        assert!(form.can_save());
        assert!(form.group_errors("rate_limit").is_empty());
    }

    #[test]
    fn unknown_key_clears_its_error() {
        let mut form = form();
        form.add_entry("CUSTOM_FLAG", "x");
        form.set_value("CUSTOM_FLAG", "anything");
        assert!(form.error("CUSTOM_FLAG").is_none());
    }

    #[test]
    fn set_value_appends_missing_schema_key() {
        let mut form = form();
        form.set_value("LAGO_API_URL", "lago.local");
        assert_eq!(form.error("LAGO_API_URL"), Some(&SettingError::NotUrl));
        form.set_value("LAGO_API_URL", "https://lago.local");
        assert!(form.error("LAGO_API_URL").is_none());
        assert_eq!(form.entry("LAGO_API_URL").unwrap().value, "https://lago.local");
    }

    #[test]
    fn save_refuses_duplicate_keys() {
        let mut form = form();
        form.add_entry(" RATE_LIMIT_PER_MIN ", "5");
        assert_eq!(
            form.prepare_save(),
            Err(FormError::DuplicateKey("RATE_LIMIT_PER_MIN".to_string()))
        );
    }

    #[test]
    fn save_skips_protected_and_empty_keys() {
        let mut form = SettingsForm::new(&SettingsSnapshot::default(), schema());
        form.add_entry("DB_LAYER", "3");
        form.add_entry("Dev_Api_Key", "secret");
        form.add_entry("", "orphan");
        assert_eq!(form.prepare_save(), Err(FormError::NothingToSave));

        form.add_entry("FEATURE_X", "on");
        let values = form.prepare_save().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["FEATURE_X"], "on");
    }

    #[test]
    fn save_revalidates_every_value() {
        let mut form = SettingsForm::new(&SettingsSnapshot::default(), schema());
        form.entries.push(super::FormEntry {
            key: "RATE_LIMIT_PER_MIN".to_string(),
            value: "lots".to_string(),
            ..super::FormEntry::default()
        });
        assert!(form.can_save());
        assert_eq!(
            form.prepare_save(),
            Err(FormError::Invalid {
                keys: vec!["RATE_LIMIT_PER_MIN".to_string()]
            })
        );
        assert!(!form.can_save());
    }

    #[test]
    fn untouched_secret_is_left_out_of_save() {
        let mut form = form();
        form.set_value("RATE_LIMIT_PER_MIN", "61");
        let values = form.prepare_save().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["RATE_LIMIT_PER_MIN"], "61");

        form.set_value("STRIPE_SECRET_KEY", "sk_live_new");
        let values = form.prepare_save().unwrap();
        assert_eq!(values["STRIPE_SECRET_KEY"], "sk_live_new");
    }

    #[test]
    fn padded_keys_are_validated_like_plain_ones() {
        let mut form = SettingsForm::new(&SettingsSnapshot::default(), schema());
        form.add_entry(" RATE_LIMIT_PER_MIN", "-5");
        assert_eq!(
            form.error("RATE_LIMIT_PER_MIN"),
            Some(&SettingError::BelowMinimum { min: 0 })
        );
        assert!(!form.can_save());

        form.set_value("RATE_LIMIT_PER_MIN ", "5");
        assert!(form.can_save());
        assert_eq!(form.entry("RATE_LIMIT_PER_MIN").unwrap().value, "5");
        assert_eq!(form.entries().len(), 1);
    }

    #[test]
    fn masked_values_are_never_echoed() {
        let mut form = form();
        assert_eq!(form.display_value("STRIPE_SECRET_KEY"), "••••••");
        form.set_value("STRIPE_SECRET_KEY", "sk_live_0123456789abcdef");
        assert_eq!(form.display_value("STRIPE_SECRET_KEY"), "sk_l…cdef");
        assert_eq!(form.display_value("RATE_LIMIT_PER_MIN"), "60");
    }
}

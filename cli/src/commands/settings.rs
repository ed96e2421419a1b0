use anyhow::{Result, bail};
use clap::{Subcommand, ValueEnum};
use serde_json::{Value, json};

use rabbit_client::{ApiClient, ConnectionTest, SettingsSnapshot};
use rabbit_core::SettingsForm;
use rabbit_types::{SettingType, group_title, is_enabled};

use crate::output::Output;

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show stored settings grouped by schema group; secrets stay masked
    Show,
    /// Show the settings schema
    Keys,
    /// Validate and save KEY=VALUE pairs
    Set {
        #[arg(required = true, value_parser = parse_pair)]
        pairs: Vec<(String, String)>,
    },
    /// Check connectivity to an upstream service
    Test { target: Upstream },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Upstream {
    Stripe,
    Lago,
    Litellm,
}

impl Upstream {
    fn name(self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Lago => "lago",
            Self::Litellm => "litellm",
        }
    }
}

/// The test result on success; a failed check is an error carrying the
/// backend's report.
fn connection_output(target: Upstream, result: &ConnectionTest) -> Result<Output> {
    if !result.ok {
        bail!(
            "{} connection test failed:\n{}",
            target.name(),
            serde_json::to_string_pretty(result)?
        );
    }
    Output::json(result)
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {raw:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub async fn settings(client: &ApiClient, command: SettingsCommand) -> Result<Output> {
    match command {
        SettingsCommand::Show => {
            let snapshot = client.get_system_settings().await?;
            let schema = client.get_system_settings_keys().await?;
            Ok(Output::Json(render(&SettingsForm::new(&snapshot, schema))))
        }
        SettingsCommand::Keys => Output::json(client.get_system_settings_keys().await?),
        SettingsCommand::Set { pairs } => {
            let schema = client.get_system_settings_keys().await?;
            // Only the given keys are sent; PATCH leaves the others untouched.
            let mut form = SettingsForm::new(&SettingsSnapshot::default(), schema);
            for (key, value) in pairs {
                if form.entry(&key).is_some() {
                    form.add_entry(key, value);
                } else {
                    form.set_value(&key, value);
                }
            }
            if !form.can_save() {
                let problems: Vec<String> = form
                    .errors()
                    .iter()
                    .map(|(key, err)| format!("{key}: {err}"))
                    .collect();
                bail!("cannot save:\n{}", problems.join("\n"));
            }
            let values = form.prepare_save()?;
            Ok(client.update_system_settings(&values).await?.into())
        }
        SettingsCommand::Test { target } => {
            let result = match target {
                Upstream::Stripe => client.test_stripe_connection().await?,
                Upstream::Lago => client.test_lago_connection().await?,
                Upstream::Litellm => client.test_litellm_connection().await?,
            };
            connection_output(target, &result)
        }
    }
}

fn render(form: &SettingsForm) -> Value {
    let schema = form.schema();
    let groups: Vec<Value> = schema
        .groups()
        .into_iter()
        .map(|group| {
            let fields: Vec<Value> = schema
                .in_group(group)
                .map(|meta| {
                    let entry = form.entry(meta.key());
                    let shown = form.display_value(meta.key());
                    let value = match meta.kind() {
                        SettingType::Bool if !meta.is_sensitive() => json!(is_enabled(&shown)),
                        _ => json!(shown),
                    };
                    json!({
                        "key": meta.key(),
                        "label": meta.display_label(),
                        "type": meta.kind().as_str(),
                        "value": value,
                        "configured": entry.is_some_and(|e| e.configured || !e.value.is_empty()),
                    })
                })
                .collect();
            json!({ "group": group, "title": group_title(group), "settings": fields })
        })
        .collect();

    let custom: Vec<Value> = form
        .entries()
        .iter()
        .filter(|entry| schema.find(&entry.key).is_none())
        .map(|entry| json!({ "key": entry.key, "value": form.display_value(&entry.key) }))
        .collect();

    json!({
        "db_layer": form.db_layer(),
        "dev_api_key_configured": form.dev_api_key_configured(),
        "groups": groups,
        "custom": custom,
    })
}

use std::io::Write;

use rabbit_client::ReportOutput;
use serde_json::Value;

/// What a command prints on success.
#[derive(Debug)]
pub enum Output {
    Json(Value),
    /// Printed as-is, e.g. CSV or a URL.
    Text(String),
    Done(&'static str),
}

impl Output {
    pub fn json(value: impl serde::Serialize) -> anyhow::Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    pub fn print(&self) {
        let mut stdout = std::io::stdout().lock();
        let result = match self {
            Self::Json(value) => serde_json::to_string_pretty(value)
                .map_err(std::io::Error::other)
                .and_then(|text| writeln!(stdout, "{text}")),
            Self::Text(text) if text.ends_with('\n') => write!(stdout, "{text}"),
            Self::Text(text) => writeln!(stdout, "{text}"),
            Self::Done(message) => writeln!(stdout, "{message}"),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to write output: {e}");
        }
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<ReportOutput> for Output {
    fn from(report: ReportOutput) -> Self {
        match report {
            ReportOutput::Json(value) => Self::Json(value),
            ReportOutput::Csv(text) => Self::Text(text),
        }
    }
}

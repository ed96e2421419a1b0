//! Secret masking and redaction.
//!
//! Backend error bodies and settings values can echo credentials back. These
//! helpers keep them out of logs and terminal output.

use std::sync::OnceLock;

use regex::Regex;

/// Values shorter than this are masked completely.
const MIN_REVEAL_LENGTH: usize = 12;

/// Mask a credential for display, keeping a short prefix and suffix.
///
/// `sk-live-0123456789abcd` becomes `sk-l…abcd`; short values become `••••`.
#[must_use]
pub fn mask_secret(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < MIN_REVEAL_LENGTH {
        return "••••".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

/// Redact sensitive tokens from a string.
///
/// Detects and redacts the token formats this console handles:
/// - Stripe: `sk_live_...`, `rk_test_...`, `pk_live_...` → `<prefix>***`
/// - Stripe webhooks: `whsec_...` → `whsec_***`
/// - LiteLLM / OpenAI-style keys: `sk-...` → `sk-***`
/// - Bearer JWTs: `Bearer <jwt>` → `Bearer [REDACTED]`
/// - Bare JWTs → `[REDACTED]`
#[must_use]
pub fn redact_api_keys(raw: &str) -> String {
    pattern_redactor().redact(raw)
}

static PATTERN_REDACTOR: OnceLock<PatternRedactor> = OnceLock::new();

fn pattern_redactor() -> &'static PatternRedactor {
    PATTERN_REDACTOR.get_or_init(PatternRedactor::new)
}

#[derive(Debug)]
struct PatternRedactor {
    stripe_api_key: Regex,
    stripe_webhook_secret: Regex,
    bearer_jwt: Regex,
    jwt: Regex,
    proxy_key: Regex,
}

impl PatternRedactor {
    fn new() -> Self {
        Self {
            stripe_api_key: Regex::new(r"\b((?:sk|rk|pk)_(?:test|live)_)[A-Za-z0-9]{10,}\b")
                .expect("valid Stripe API key regex"),
            stripe_webhook_secret: Regex::new(r"\b(whsec_)[A-Za-z0-9]{10,}\b")
                .expect("valid Stripe webhook secret regex"),
            bearer_jwt: Regex::new(r"(?i)\b(Bearer)(\s+)[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+){2,}")
                .expect("valid Bearer JWT regex"),
            jwt: Regex::new(r"\beyJ[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}\b")
                .expect("valid JWT regex"),
            // Requires 16+ chars after `sk-` so prose like "sk-based" survives.
            proxy_key: Regex::new(r"\bsk-[A-Za-z0-9_-]{16,}").expect("valid proxy key regex"),
        }
    }

    fn redact(&self, raw: &str) -> String {
        let mut output = raw.to_string();

        apply_if_match(&self.stripe_webhook_secret, "$1***", &mut output);
        apply_if_match(&self.stripe_api_key, "$1***", &mut output);
        apply_if_match(&self.bearer_jwt, "$1$2[REDACTED]", &mut output);
        apply_if_match(&self.jwt, "[REDACTED]", &mut output);
        apply_if_match(&self.proxy_key, "sk-***", &mut output);

        output
    }
}

fn apply_if_match(re: &Regex, replacement: &str, output: &mut String) {
    if re.is_match(output) {
        *output = re.replace_all(output, replacement).into_owned();
    }
}

use std::collections::HashMap;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Padding is optional and both alphabets are accepted, matching the
/// leniency of Node-style base64 decoding.
const PAD_INDIFFERENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const BASE64_STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PAD_INDIFFERENT);
const BASE64_URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, PAD_INDIFFERENT);

/// How the raw content of a matched element is read and coerced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    Text,
    Html,
    Number,
}

/// Extracts one scalar (or array of scalars) from the current scope.
///
/// A rule without a `selector` always evaluates to null; it is never
/// an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRule {
    #[serde(default)]
    pub selector: Option<String>,
    /// Attribute to read instead of element content. `"text"` is treated
    /// as unset.
    #[serde(default)]
    pub attr: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ValueKind,
    /// Whitespace-trim string results. Only an explicit `false` disables it.
    #[serde(default = "default_true")]
    pub trim: bool,
    /// Pattern applied to string results; capture group 1 wins over the
    /// full match.
    #[serde(default)]
    pub regex: Option<String>,
    /// Evaluate every selector match as a list instead of first-match-only.
    #[serde(default)]
    pub all: bool,
}

// Keeps `trim: true` as the default for programmatic construction too,
// in agreement with the serde default.
impl Default for FieldRule {
    fn default() -> Self {
        FieldRule {
            selector: None,
            attr: None,
            kind: ValueKind::default(),
            trim: true,
            regex: None,
            all: false,
        }
    }
}

/// Extracts a repeated structure: one row per container element, each
/// field resolved against the descendants of its own container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRule {
    pub selector: String,
    #[serde(default)]
    pub fields: HashMap<String, FieldRule>,
}

/// The declarative rule set supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub fields: Option<HashMap<String, FieldRule>>,
    #[serde(default)]
    pub lists: Option<HashMap<String, ListRule>>,
}

impl RuleSet {
    /// Decode the `rules` query parameter: raw JSON first, then
    /// base64-encoded JSON as a fallback.
    pub fn from_query_param(raw: &str) -> Result<Self, Error> {
        serde_json::from_str(raw).or_else(|_| {
            let bytes = decode_base64(raw.trim())?;
            let text =
                String::from_utf8(bytes).map_err(|e| Error::InvalidRules(e.to_string()))?;
            serde_json::from_str(&text).map_err(|e| Error::InvalidRules(e.to_string()))
        })
    }
}

fn decode_base64(raw: &str) -> Result<Vec<u8>, Error> {
    BASE64_STANDARD
        .decode(raw)
        .or_else(|_| BASE64_URL_SAFE.decode(raw))
        .map_err(|e| Error::InvalidRules(e.to_string()))
}

fn default_true() -> bool {
    true
}

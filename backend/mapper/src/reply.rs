//! Engine reply classification.
//!
//! The reply is never trusted to be JSON. Each tier below tries one reading
//! and either produces a result or passes to the next:
//!
//! 1. the failure sentinel (`error`)
//! 2. the whole reply as a JSON object
//! 3. the span from the first `{` to the last `}` as a JSON object
//! 4. the labeled fallback

use lcforge_core::{FieldName, PartialRecord};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::directive::FAILURE_TOKEN;
use crate::fallback::labeled_fallback;

/// Which tier produced a successful parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseTier {
    StrictJson,
    EmbeddedJson,
    LabeledFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Nothing but whitespace came back.
    Blank,
    ExplicitFailure,
    Fields { partial: PartialRecord, tier: ParseTier },
}

pub fn classify(reply: &str) -> Classified {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Classified::Blank;
    }
    if is_explicit_failure(trimmed) {
        return Classified::ExplicitFailure;
    }
    if let Some(partial) = strict_json(trimmed) {
        return Classified::Fields {
            partial,
            tier: ParseTier::StrictJson,
        };
    }
    if let Some(partial) = embedded_json(trimmed) {
        return Classified::Fields {
            partial,
            tier: ParseTier::EmbeddedJson,
        };
    }
    Classified::Fields {
        partial: labeled_fallback(trimmed),
        tier: ParseTier::LabeledFallback,
    }
}

/// The sentinel, case-folded, optionally wrapped in quotes or backticks.
pub fn is_explicit_failure(reply: &str) -> bool {
    reply
        .trim()
        .trim_matches(['"', '\'', '`'])
        .trim()
        .eq_ignore_ascii_case(FAILURE_TOKEN)
}

pub fn strict_json(reply: &str) -> Option<PartialRecord> {
    match serde_json::from_str::<Value>(reply.trim()) {
        Ok(Value::Object(map)) => Some(coerce_object(&map)),
        _ => None,
    }
}

/// The first balanced object in the reply, then the first-`{`-to-last-`}` span.
pub fn embedded_json(reply: &str) -> Option<PartialRecord> {
    let start = reply.find('{')?;
    if let Some(partial) = balanced_object(&reply[start..]).and_then(strict_json) {
        return Some(partial);
    }
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }
    strict_json(&reply[start..=end])
}

/// The `{...}` span opening at the start of `text`, matched by depth.
/// Braces inside string literals do not count.
fn balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Keep the 12 known keys, stringify their values, drop null and empty ones.
pub fn coerce_object(map: &Map<String, Value>) -> PartialRecord {
    let mut partial = PartialRecord::new();
    for (key, value) in map {
        let Ok(field) = key.parse::<FieldName>() else {
            continue;
        };
        if let Some(text) = coerce_value(value) {
            partial.insert(field, text);
        }
    }
    partial
}

fn coerce_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(coerce_value)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(c: Classified) -> (PartialRecord, ParseTier) {
        match c {
            Classified::Fields { partial, tier } => (partial, tier),
            other => panic!("expected fields, got {other:?}"),
        }
    }

    #[test]
    fn sentinel_is_case_and_space_insensitive() {
        assert_eq!(classify("  Error  "), Classified::ExplicitFailure);
        assert_eq!(classify("ERROR\n"), Classified::ExplicitFailure);
        assert_eq!(classify("\"error\""), Classified::ExplicitFailure);
        assert!(!is_explicit_failure("error: nothing found"));
    }

    #[test]
    fn blank_reply() {
        assert_eq!(classify(" \n\t"), Classified::Blank);
    }

    #[test]
    fn strict_object() {
        let (p, tier) = fields(classify(r#"{"amount": "100 USD", "issuingBank": "HSBC"}"#));
        assert_eq!(tier, ParseTier::StrictJson);
        assert_eq!(p.len(), 2);
        assert_eq!(p.get(FieldName::Amount), Some("100 USD"));
        assert_eq!(p.get(FieldName::IssuingBank), Some("HSBC"));
    }

    #[test]
    fn embedded_object() {
        let (p, tier) = fields(classify("Here you go:\n{\"amount\":\"50\"}\nThanks"));
        assert_eq!(tier, ParseTier::EmbeddedJson);
        assert_eq!(p.len(), 1);
        assert_eq!(p.get(FieldName::Amount), Some("50"));
    }

    #[test]
    fn first_of_two_objects_is_used() {
        let (p, tier) = fields(classify(r#"{"amount": "5"} and also {"lcType": "x"}"#));
        assert_eq!(tier, ParseTier::EmbeddedJson);
        assert_eq!(p.len(), 1);
        assert_eq!(p.get(FieldName::Amount), Some("5"));
    }

    #[test]
    fn braces_inside_strings_do_not_close_the_object() {
        let reply = r#"Result: {"productDescription": "Widgets {boxed}", "amount": "7 \"net\""} done"#;
        let (p, tier) = fields(classify(reply));
        assert_eq!(tier, ParseTier::EmbeddedJson);
        assert_eq!(p.get(FieldName::ProductDescription), Some("Widgets {boxed}"));
        assert_eq!(p.get(FieldName::Amount), Some("7 \"net\""));
    }

    #[test]
    fn fenced_json_is_embedded() {
        let (p, tier) = fields(classify("```json\n{\"lcType\": \"Sight\"}\n```"));
        assert_eq!(tier, ParseTier::EmbeddedJson);
        assert_eq!(p.get(FieldName::LcType), Some("Sight"));
    }

    #[test]
    fn prose_goes_to_fallback() {
        let (p, tier) = fields(classify("The Issuing Bank: Deutsche Bank"));
        assert_eq!(tier, ParseTier::LabeledFallback);
        assert_eq!(p.get(FieldName::IssuingBank), Some("Deutsche Bank"));
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn non_object_json_falls_through() {
        let (p, tier) = fields(classify(r#"["amount", "50"]"#));
        assert_eq!(tier, ParseTier::LabeledFallback);
        assert!(p.is_empty());
    }

    #[test]
    fn coercion_rules() {
        let map = json!({
            "amount": 1500.5,
            "isLcIssued": true,
            "confirmingBanks": ["HSBC", " ", "Citi"],
            "lcType": null,
            "paymentTerms": "   ",
            "importerName": {"name": "ACME"},
            "unknownKey": "dropped",
            "IssuingBank": "wrong case"
        });
        let p = coerce_object(map.as_object().unwrap());
        assert_eq!(p.get(FieldName::Amount), Some("1500.5"));
        assert_eq!(p.get(FieldName::IsLcIssued), Some("true"));
        assert_eq!(p.get(FieldName::ConfirmingBanks), Some("HSBC, Citi"));
        assert_eq!(p.get(FieldName::ImporterName), Some(r#"{"name":"ACME"}"#));
        assert!(!p.contains(FieldName::LcType));
        assert!(!p.contains(FieldName::PaymentTerms));
        assert!(!p.contains(FieldName::IssuingBank));
        assert_eq!(p.len(), 4);
    }

    #[test]
    fn classification_is_deterministic() {
        let reply = "Payment Terms: Sight LC. Issuing Bank: Citibank.";
        assert_eq!(classify(reply), classify(reply));
    }
}

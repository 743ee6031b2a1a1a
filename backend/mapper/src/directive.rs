//! The instruction sent to the engine with every mapping request.

use lcforge_core::{FieldName, FieldRecord};
use serde_json::{Map, Value};

/// Sentinel the engine returns when nothing is extractable.
pub const FAILURE_TOKEN: &str = "error";

const SYSTEM_PROMPT: &str = "You extract structured data from OCR text of trade-finance documents \
(letters of credit, proforma invoices, sales contracts). You reply with a single JSON object and \
nothing else.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Build the directive for `raw_text`.
///
/// `current` adds the populated form values as context. `extra` is appended
/// verbatim as additional instructions.
pub fn build_directive(raw_text: &str, current: Option<&FieldRecord>, extra: Option<&str>) -> Directive {
    let mut prompt = String::from(
        "Please extract and map the following fields from the text below:\n\n",
    );
    for field in FieldName::ALL {
        prompt.push_str("- ");
        prompt.push_str(field.as_str());
        prompt.push('\n');
    }

    prompt.push_str(
        "\nReturn ONLY a JSON object whose keys are a subset of the field names above, \
         containing just the fields you found. Use string values. Omit fields you cannot find; \
         never return empty strings or null.\n",
    );
    prompt.push_str(&format!(
        "If no field can be extracted, return exactly the word {FAILURE_TOKEN} and nothing else.\n"
    ));

    if let Some(context) = current.and_then(current_fields_json) {
        prompt.push_str(
            "\nThe form already contains these values; only include a field if the text gives a \
             better value:\n",
        );
        prompt.push_str(&context);
        prompt.push('\n');
    }

    if let Some(extra) = extra.map(str::trim).filter(|e| !e.is_empty()) {
        prompt.push_str("\nAdditional instructions:\n");
        prompt.push_str(extra);
        prompt.push('\n');
    }

    prompt.push_str("\nHere is the OCR text:\n\"\"\"\n");
    prompt.push_str(raw_text.trim());
    prompt.push_str("\n\"\"\"\n");

    Directive {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: prompt,
    }
}

/// Populated fields as a compact JSON object, or `None` when the form is blank.
fn current_fields_json(record: &FieldRecord) -> Option<String> {
    let populated: Map<String, Value> = record
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(f, v)| (f.as_str().to_string(), Value::String(v.to_string())))
        .collect();
    if populated.is_empty() {
        return None;
    }
    serde_json::to_string(&Value::Object(populated)).ok()
}

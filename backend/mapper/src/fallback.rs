//! Labeled fallback: recover `Label: value` pairs from a free-text reply.
//!
//! Every label occurrence in the reply (any synonym of any field, or the
//! field's own name, followed by `:` or `=`) opens a segment that runs to the
//! next label occurrence or the end of the line. A label found inside an
//! earlier, longer label is ignored, so "Product Description:" does not also
//! count as "Description:".

use lcforge_core::{FieldName, PartialRecord};
use once_cell::sync::Lazy;
use regex::Regex;

/// Extra labels per field, beyond the field name itself.
pub fn synonyms(field: FieldName) -> &'static [&'static str] {
    match field {
        FieldName::TransactionRole => &["transaction role", "role in transaction", "role"],
        FieldName::Amount => &["lc amount", "total price", "total amount", "total", "amount", "value"],
        FieldName::PaymentTerms => &["payment terms", "terms of payment", "payment term"],
        FieldName::LcType => &["letter of credit type", "type of lc", "lc type", "credit type"],
        FieldName::IsLcIssued => &["is lc issued", "lc issued", "issued"],
        FieldName::IssuingBank => &["issuing bank", "issuer bank", "opening bank"],
        FieldName::ConfirmingBanks => &["confirming banks", "confirming bank"],
        FieldName::ProductDescription => &[
            "product description",
            "description of goods",
            "goods description",
            "description",
            "goods",
            "product",
        ],
        FieldName::ImporterName => &[
            "importer name",
            "importer",
            "applicant",
            "consignee",
            "buyer",
        ],
        FieldName::ExporterName => &[
            "exporter name",
            "exporter",
            "beneficiary",
            "supplier",
            "seller",
        ],
        FieldName::ConfirmationCharges => &[
            "confirmation charges",
            "confirmation charge",
            "confirmation fees",
            "confirmation fee",
        ],
        FieldName::LastDateForReceivingBids => &[
            "last date for receiving bids",
            "last date for bids",
            "bid deadline",
            "bids due",
            "closing date",
            "last date",
            "deadline",
            "date",
        ],
    }
}

struct LabelPattern {
    field: FieldName,
    regex: Regex,
}

/// "issuing bank" → `issuing[\s_\-]+bank`
fn label_regex(label: &str) -> String {
    label
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[\s_\-]+")
}

static PATTERNS: Lazy<Vec<LabelPattern>> = Lazy::new(|| {
    FieldName::ALL
        .iter()
        .map(|&field| {
            let mut labels: Vec<String> = synonyms(field).iter().map(|s| label_regex(s)).collect();
            labels.push(regex::escape(field.as_str()));
            // Longest first so the alternation prefers "total price" over "total".
            labels.sort_by_key(|l| std::cmp::Reverse(l.len()));
            let pattern = format!(
                r#"(?i)["'*]*\b(?:{})\b["'*]*[ \t]*[:=][ \t]*\**[ \t]*"#,
                labels.join("|")
            );
            LabelPattern {
                field,
                regex: Regex::new(&pattern).unwrap(),
            }
        })
        .collect()
});

#[derive(Debug, Clone, Copy)]
struct Hit {
    field: FieldName,
    start: usize,
    end: usize,
}

/// Every non-overlapping label occurrence, in reply order.
fn label_hits(reply: &str) -> Vec<Hit> {
    let mut hits: Vec<Hit> = PATTERNS
        .iter()
        .flat_map(|p| {
            p.regex.find_iter(reply).map(move |m| Hit {
                field: p.field,
                start: m.start(),
                end: m.end(),
            })
        })
        .collect();
    hits.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut kept: Vec<Hit> = Vec::with_capacity(hits.len());
    for hit in hits {
        if kept.last().map_or(true, |last| hit.start >= last.end) {
            kept.push(hit);
        }
    }
    kept
}

/// Strip separators and wrapping left around a value.
fn clean_value(raw: &str) -> Option<String> {
    let mut value = raw.trim();
    value = value.trim_end_matches([',', ';']).trim();
    value = value.trim_matches('*').trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            value = value[1..value.len() - 1].trim();
        }
    }
    if value.is_empty() || value.eq_ignore_ascii_case("null") || value.eq_ignore_ascii_case("n/a") {
        return None;
    }
    Some(value.to_string())
}

/// Recover whatever labeled fields the reply contains. The first usable value
/// for a field wins; unmatched fields are omitted.
pub fn labeled_fallback(reply: &str) -> PartialRecord {
    let hits = label_hits(reply);
    let mut partial = PartialRecord::new();

    for (i, hit) in hits.iter().enumerate() {
        if partial.contains(hit.field) {
            continue;
        }
        let segment_end = hits.get(i + 1).map_or(reply.len(), |next| next.start);
        let segment = &reply[hit.end..segment_end];
        let line = segment.lines().next().unwrap_or("");
        if let Some(value) = clean_value(line) {
            partial.insert(hit.field, value);
        }
    }
    partial
}

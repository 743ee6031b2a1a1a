//! Non-destructive reconciliation of a partial result into the form.

use serde::Serialize;

use crate::field::FieldName;
use crate::record::{FieldRecord, PartialRecord};

/// Merge `partial` into a copy of `current`.
///
/// A field is replaced only when `partial` holds a non-empty value for it;
/// everything else keeps its current value.
pub fn merge(current: &FieldRecord, partial: &PartialRecord) -> FieldRecord {
    reconcile(current, partial).record
}

/// Outcome of [`reconcile`]: the merged record plus which fields changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub record: FieldRecord,
    /// Fields whose stored value differs from `current`, in form order.
    pub updated: Vec<FieldName>,
}

impl Reconciliation {
    /// True when the merge changed nothing (empty partial, or every value
    /// already matched).
    pub fn is_noop(&self) -> bool {
        self.updated.is_empty()
    }
}

/// Merge and report the fields that actually changed.
pub fn reconcile(current: &FieldRecord, partial: &PartialRecord) -> Reconciliation {
    let mut record = current.clone();
    let mut updated = Vec::new();
    for (field, value) in partial.iter() {
        // PartialRecord never stores blanks, but the merge must hold even if
        // that ever changes.
        if value.trim().is_empty() {
            continue;
        }
        if record.set(field, value) {
            updated.push(field);
        }
    }
    updated.sort();
    Reconciliation { record, updated }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> FieldRecord {
        let mut record = FieldRecord::new();
        record.set(FieldName::Amount, "250,000 USD");
        record.set(FieldName::IssuingBank, "HSBC");
        record.set(FieldName::ImporterName, "Acme Imports Ltd");
        record
    }

    #[test]
    fn empty_partial_is_identity() {
        let current = populated();
        assert_eq!(merge(&current, &PartialRecord::new()), current);
        assert!(reconcile(&current, &PartialRecord::new()).is_noop());
    }

    #[test]
    fn non_empty_values_replace() {
        let mut partial = PartialRecord::new();
        partial.insert(FieldName::IssuingBank, "Deutsche Bank");
        partial.insert(FieldName::LcType, "Sight");

        let result = reconcile(&populated(), &partial);
        assert_eq!(result.record.get(FieldName::IssuingBank), "Deutsche Bank");
        assert_eq!(result.record.get(FieldName::LcType), "Sight");
        assert_eq!(result.record.get(FieldName::Amount), "250,000 USD");
        assert_eq!(result.updated, vec![FieldName::LcType, FieldName::IssuingBank]);
    }

    #[test]
    fn never_clobbers_populated_field_with_empty() {
        let mut partial = PartialRecord::new();
        partial.insert(FieldName::Amount, "");
        partial.insert(FieldName::ImporterName, "   ");

        let current = populated();
        let merged = merge(&current, &partial);
        for (field, value) in current.iter() {
            if !value.is_empty() {
                assert_eq!(merged.get(field), value, "{field} was clobbered");
            }
        }
    }

    #[test]
    fn merge_is_idempotent() {
        let mut partial = PartialRecord::new();
        partial.insert(FieldName::PaymentTerms, "90 days usance");
        partial.insert(FieldName::Amount, "1,000 EUR");

        let once = merge(&populated(), &partial);
        let twice = merge(&once, &partial);
        assert_eq!(once, twice);
        assert!(reconcile(&once, &partial).is_noop());
    }

    #[test]
    fn same_value_is_not_reported_as_update() {
        let mut partial = PartialRecord::new();
        partial.insert(FieldName::IssuingBank, "HSBC");
        let result = reconcile(&populated(), &partial);
        assert!(result.is_noop());
        assert_eq!(result.record, populated());
    }
}

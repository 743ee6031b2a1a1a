//! The closed set of fields extracted from a trade-finance document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of fields in a complete [`FieldRecord`](crate::FieldRecord).
pub const FIELD_COUNT: usize = 12;

/// One named field of the request form.
///
/// The wire name (`as_str`) is the camelCase key used in JSON replies from
/// the engine and in HTTP payloads; it is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    TransactionRole,
    Amount,
    PaymentTerms,
    LcType,
    IsLcIssued,
    IssuingBank,
    ConfirmingBanks,
    ProductDescription,
    ImporterName,
    ExporterName,
    ConfirmationCharges,
    LastDateForReceivingBids,
}

impl FieldName {
    /// All fields in form order.
    pub const ALL: [FieldName; FIELD_COUNT] = [
        FieldName::TransactionRole,
        FieldName::Amount,
        FieldName::PaymentTerms,
        FieldName::LcType,
        FieldName::IsLcIssued,
        FieldName::IssuingBank,
        FieldName::ConfirmingBanks,
        FieldName::ProductDescription,
        FieldName::ImporterName,
        FieldName::ExporterName,
        FieldName::ConfirmationCharges,
        FieldName::LastDateForReceivingBids,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionRole => "transactionRole",
            Self::Amount => "amount",
            Self::PaymentTerms => "paymentTerms",
            Self::LcType => "lcType",
            Self::IsLcIssued => "isLcIssued",
            Self::IssuingBank => "issuingBank",
            Self::ConfirmingBanks => "confirmingBanks",
            Self::ProductDescription => "productDescription",
            Self::ImporterName => "importerName",
            Self::ExporterName => "exporterName",
            Self::ConfirmationCharges => "confirmationCharges",
            Self::LastDateForReceivingBids => "lastDateForReceivingBids",
        }
    }

    /// Human-readable label shown next to the form input.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TransactionRole => "In this transaction you are",
            Self::Amount => "Amount",
            Self::PaymentTerms => "Payment terms",
            Self::LcType => "LC type",
            Self::IsLcIssued => "Is this LC issued",
            Self::IssuingBank => "Issuing bank",
            Self::ConfirmingBanks => "Confirming banks",
            Self::ProductDescription => "Product description",
            Self::ImporterName => "Importer name",
            Self::ExporterName => "Exporter name",
            Self::ConfirmationCharges => "Confirmation charges",
            Self::LastDateForReceivingBids => "Last date for receiving bids",
        }
    }

    /// Position of this field in [`FieldName::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a key is not one of the 12 field names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for FieldName {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

impl Serialize for FieldName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//! Stock adjustment transactions.

use crate::record::lenient;
use crate::schema::{DraftSchema, FieldDef, FieldType};
use crate::{error::Result, Entity, RecordId};
use serde::{Deserialize, Serialize};

/// A stock adjustment. `amount` is computed by the remote from the SKU price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: RecordId,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub qty: i64,
    #[serde(default)]
    pub amount: f64,
}

/// Payload for recording an adjustment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    #[serde(default)]
    pub sku: String,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub qty: Option<i64>,
}

impl TransactionDraft {
    pub fn new(sku: impl Into<String>, qty: i64) -> Self {
        Self {
            sku: sku.into(),
            qty: Some(qty),
        }
    }

    pub fn schema() -> DraftSchema {
        DraftSchema::new(vec![
            FieldDef::required("sku", FieldType::Text),
            FieldDef::required("qty", FieldType::Integer),
        ])
    }
}

/// Payload for editing an adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub sku: String,
    pub qty: i64,
}

impl Entity for Transaction {
    type Draft = TransactionDraft;
    type Patch = TransactionPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn to_patch(&self) -> TransactionPatch {
        TransactionPatch {
            sku: self.sku.clone(),
            qty: self.qty,
        }
    }

    fn from_draft(id: RecordId, draft: &TransactionDraft) -> Self {
        Self {
            id,
            sku: draft.sku.clone(),
            qty: draft.qty.unwrap_or_default(),
            amount: 0.0,
        }
    }

    fn validate_draft(draft: &TransactionDraft) -> Result<()> {
        TransactionDraft::schema().validate(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;

    #[test]
    fn patch_strips_amount() {
        let tx = Transaction {
            id: 4,
            sku: "LAMP-01".into(),
            qty: -2,
            amount: -49.98,
        };
        let patch = serde_json::to_value(tx.to_patch()).unwrap();
        assert_eq!(patch, json!({"sku": "LAMP-01", "qty": -2}));
    }

    #[test]
    fn draft_requires_qty() {
        let draft: TransactionDraft =
            serde_json::from_value(json!({"sku": "LAMP-01", "qty": ""})).unwrap();
        assert_eq!(
            Transaction::validate_draft(&draft),
            Err(Error::MissingRequiredField("qty".into()))
        );

        assert!(Transaction::validate_draft(&TransactionDraft::new("LAMP-01", 3)).is_ok());
    }
}

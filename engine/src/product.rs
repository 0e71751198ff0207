//! Catalog products.

use crate::record::lenient;
use crate::schema::{DraftSchema, FieldDef, FieldType};
use crate::{error::Result, Entity, RecordId};
use serde::{Deserialize, Serialize};

/// A product as returned by the remote catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub sku: String,
}

impl Product {
    /// Whether any units are available.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Payload for creating a product.
///
/// Numeric fields accept numeric strings, as submitted by form input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub stock: Option<i64>,
    #[serde(default)]
    pub description: String,
}

impl ProductDraft {
    /// Create a draft with the given title and everything else empty.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Field rules enforced before a draft is proposed.
    pub fn schema() -> DraftSchema {
        DraftSchema::new(vec![
            FieldDef::required("title", FieldType::Text),
            FieldDef::required("sku", FieldType::Text),
            FieldDef::required("image", FieldType::Text),
            FieldDef::required("price", FieldType::Number),
            FieldDef::optional("stock", FieldType::Integer),
            FieldDef::optional("description", FieldType::Text),
        ])
    }
}

/// Payload for updating a product. SKU and stock are not editable on this path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub title: String,
    pub image: String,
    pub price: f64,
    pub description: String,
}

impl Entity for Product {
    type Draft = ProductDraft;
    type Patch = ProductPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn to_patch(&self) -> ProductPatch {
        ProductPatch {
            title: self.title.clone(),
            image: self.image.clone(),
            price: self.price,
            description: self.description.clone(),
        }
    }

    fn from_draft(id: RecordId, draft: &ProductDraft) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            price: draft.price.unwrap_or_default(),
            stock: draft.stock.unwrap_or_default(),
            description: draft.description.clone(),
            image: draft.image.clone(),
            sku: draft.sku.clone(),
        }
    }

    fn validate_draft(draft: &ProductDraft) -> Result<()> {
        ProductDraft::schema().validate(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;

    fn complete_draft() -> ProductDraft {
        ProductDraft {
            title: "Desk Lamp".into(),
            sku: "LAMP-01".into(),
            image: "https://cdn.example.com/lamp.png".into(),
            price: Some(24.99),
            stock: Some(10),
            description: "Warm white".into(),
        }
    }

    #[test]
    fn deserialize_sparse_product() {
        let product: Product = serde_json::from_value(json!({"id": 7, "title": "X"})).unwrap();
        assert_eq!(product.id, 7);
        assert_eq!(product.title, "X");
        assert_eq!(product.stock, 0);
        assert!(!product.in_stock());
    }

    #[test]
    fn draft_accepts_numeric_strings() {
        let draft: ProductDraft = serde_json::from_value(json!({
            "title": "Lamp",
            "price": "19.5",
            "stock": "4",
        }))
        .unwrap();
        assert_eq!(draft.price, Some(19.5));
        assert_eq!(draft.stock, Some(4));
    }

    #[test]
    fn draft_treats_empty_number_as_missing() {
        let draft: ProductDraft =
            serde_json::from_value(json!({"title": "Lamp", "price": ""})).unwrap();
        assert_eq!(draft.price, None);
    }

    #[test]
    fn draft_rejects_garbage_number() {
        let result: std::result::Result<ProductDraft, _> =
            serde_json::from_value(json!({"price": "cheap"}));
        assert!(result.is_err());
    }

    #[test]
    fn validate_complete_draft() {
        assert!(Product::validate_draft(&complete_draft()).is_ok());
    }

    #[test]
    fn validate_requires_sku_image_and_price() {
        let mut draft = complete_draft();
        draft.sku.clear();
        assert_eq!(
            Product::validate_draft(&draft),
            Err(Error::MissingRequiredField("sku".into()))
        );

        let mut draft = complete_draft();
        draft.price = None;
        assert_eq!(
            Product::validate_draft(&draft),
            Err(Error::MissingRequiredField("price".into()))
        );

        let draft = ProductDraft::titled("Lamp");
        assert_eq!(
            Product::validate_draft(&draft),
            Err(Error::MissingRequiredField("sku".into()))
        );
    }

    #[test]
    fn patch_strips_identity_sku_and_stock() {
        let product = Product::from_draft(3, &complete_draft());
        let patch = serde_json::to_value(product.to_patch()).unwrap();
        let obj = patch.as_object().unwrap();

        assert!(!obj.contains_key("id"));
        assert!(!obj.contains_key("sku"));
        assert!(!obj.contains_key("stock"));
        assert_eq!(obj["title"], "Desk Lamp");
        assert_eq!(obj["price"], 24.99);
    }

    #[test]
    fn from_draft_carries_fields() {
        let product = Product::from_draft(9, &complete_draft());
        assert_eq!(product.id(), 9);
        assert_eq!(product.sku, "LAMP-01");
        assert_eq!(product.stock, 10);
        assert!(product.in_stock());
    }
}

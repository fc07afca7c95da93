use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::supplier::{clean_optional, SupplierName, SupplierSummary},
};

pub const DEFAULT_LOW_STOCK: i32 = 10;

/// The derived flag. Never taken from input.
pub fn is_low_stock(quantity: i32, low_stock: i32) -> bool {
    quantity < low_stock
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub low_stock: i32,
    #[serde(rename = "supplier")]
    pub supplier_id: Uuid,
    pub is_low_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn refresh_low_stock(&mut self) {
        self.is_low_stock = is_low_stock(self.quantity, self.low_stock);
    }
}

/// A validated item ready to be persisted, flag already derived.
#[derive(Debug, Clone)]
pub struct NewInventoryItem {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub low_stock: i32,
    pub supplier_id: Uuid,
    pub is_low_stock: bool,
}

impl NewInventoryItem {
    pub fn new(
        name: String,
        description: Option<String>,
        quantity: i32,
        low_stock: i32,
        supplier_id: Uuid,
    ) -> Self {
        Self {
            name,
            description,
            quantity,
            low_stock,
            supplier_id,
            is_low_stock: is_low_stock(quantity, low_stock),
        }
    }
}

/// Item as returned by reads, supplier joined in place of the raw reference.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemDetail {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub low_stock: i32,
    pub supplier: Option<SupplierSummary>,
    pub is_low_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItemDetail {
    pub fn new(item: InventoryItem, supplier: Option<SupplierSummary>) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            quantity: item.quantity,
            low_stock: item.low_stock,
            supplier,
            is_low_stock: item.is_low_stock,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LowStockItem {
    pub id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub supplier: Option<SupplierName>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub low_stock: Option<i64>,
    pub supplier: Option<String>,
}

/// Create payload after field validation; the supplier still has to resolve.
#[derive(Debug, Clone)]
pub struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub low_stock: i32,
    pub supplier_id: Uuid,
}

impl CreateInventoryItem {
    pub fn validate(self) -> AppResult<ItemDraft> {
        let name = require_name(self.name)?;
        let quantity = self
            .quantity
            .ok_or_else(|| AppError::Validation("Quantity is required".into()))?;
        let supplier = self
            .supplier
            .ok_or_else(|| AppError::Validation("Supplier is required".into()))?;

        Ok(ItemDraft {
            name,
            description: clean_optional(self.description),
            quantity: validate_quantity(quantity)?,
            low_stock: match self.low_stock {
                Some(value) => validate_low_stock(value)?,
                None => DEFAULT_LOW_STOCK,
            },
            supplier_id: parse_supplier_ref(&supplier)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub low_stock: Option<i64>,
    pub supplier: Option<String>,
}

/// Validated patch. `supplier_id` still has to resolve before `apply`.
#[derive(Debug, Default, Clone)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub quantity: Option<i32>,
    pub low_stock: Option<i32>,
    pub supplier_id: Option<Uuid>,
}

impl InventoryPatch {
    pub fn validate(self) -> AppResult<ItemChanges> {
        Ok(ItemChanges {
            name: self.name.map(|n| require_name(Some(n))).transpose()?,
            description: self.description.map(|d| clean_optional(Some(d))),
            quantity: self.quantity.map(validate_quantity).transpose()?,
            low_stock: self.low_stock.map(validate_low_stock).transpose()?,
            supplier_id: self
                .supplier
                .as_deref()
                .map(parse_supplier_ref)
                .transpose()?,
        })
    }
}

impl ItemChanges {
    /// Merges the changes and re-derives the low-stock flag.
    pub fn apply(self, item: &mut InventoryItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(low_stock) = self.low_stock {
            item.low_stock = low_stock;
        }
        if let Some(supplier_id) = self.supplier_id {
            item.supplier_id = supplier_id;
        }
        item.refresh_low_stock();
    }
}

fn require_name(name: Option<String>) -> AppResult<String> {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("Inventory item name is required".into()))
}

fn validate_quantity(value: i64) -> AppResult<i32> {
    non_negative(value, "Quantity cannot be negative", "Quantity is too large")
}

fn validate_low_stock(value: i64) -> AppResult<i32> {
    non_negative(
        value,
        "Low stock threshold cannot be negative",
        "Low stock threshold is too large",
    )
}

fn non_negative(value: i64, negative: &str, too_large: &str) -> AppResult<i32> {
    if value < 0 {
        return Err(AppError::Validation(negative.into()));
    }
    i32::try_from(value).map_err(|_| AppError::Validation(too_large.into()))
}

pub fn parse_supplier_ref(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::unknown_supplier())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(quantity: i32, low_stock: i32) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            name: "Widget".into(),
            description: None,
            quantity,
            low_stock,
            supplier_id: Uuid::new_v4(),
            is_low_stock: is_low_stock(quantity, low_stock),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn flag_is_strictly_below_threshold() {
        assert!(is_low_stock(5, 10));
        assert!(!is_low_stock(10, 10));
        assert!(!is_low_stock(0, 0));
        assert!(NewInventoryItem::new("a".into(), None, 9, 10, Uuid::new_v4()).is_low_stock);
    }

    #[test]
    fn create_defaults_threshold_to_ten() {
        let draft = CreateInventoryItem {
            name: Some(" Widget ".into()),
            quantity: Some(3),
            supplier: Some(Uuid::new_v4().to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(draft.name, "Widget");
        assert_eq!(draft.low_stock, DEFAULT_LOW_STOCK);
    }

    #[test]
    fn create_rejects_negative_counts() {
        let negative_quantity = CreateInventoryItem {
            name: Some("Widget".into()),
            quantity: Some(-1),
            supplier: Some(Uuid::new_v4().to_string()),
            ..Default::default()
        };
        assert!(matches!(negative_quantity.validate(), Err(AppError::Validation(_))));

        let negative_threshold = CreateInventoryItem {
            name: Some("Widget".into()),
            quantity: Some(1),
            low_stock: Some(-5),
            supplier: Some(Uuid::new_v4().to_string()),
            ..Default::default()
        };
        assert!(matches!(negative_threshold.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn malformed_supplier_is_a_reference_error() {
        let draft = CreateInventoryItem {
            name: Some("Widget".into()),
            quantity: Some(1),
            supplier: Some("not-an-id".into()),
            ..Default::default()
        };
        assert!(matches!(draft.validate(), Err(AppError::Reference(_))));
    }

    #[test]
    fn applying_changes_rederives_flag() {
        let mut item = widget(5, 10);
        assert!(item.is_low_stock);

        InventoryPatch {
            quantity: Some(20),
            ..Default::default()
        }
        .validate()
        .unwrap()
        .apply(&mut item);
        assert_eq!(item.quantity, 20);
        assert!(!item.is_low_stock);

        InventoryPatch {
            low_stock: Some(50),
            ..Default::default()
        }
        .validate()
        .unwrap()
        .apply(&mut item);
        assert!(item.is_low_stock);
    }

    #[test]
    fn stale_flag_is_overwritten_on_apply() {
        let mut item = widget(1, 10);
        item.is_low_stock = false;
        ItemChanges::default().apply(&mut item);
        assert!(item.is_low_stock);
    }

    #[test]
    fn serialized_item_uses_camel_case_and_supplier_key() {
        let item = widget(5, 10);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["lowStock"], 10);
        assert_eq!(json["isLowStock"], true);
        assert_eq!(json["supplier"], item.supplier_id.to_string());
    }
}

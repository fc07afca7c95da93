use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        CreateInventoryItem, InventoryItem, InventoryItemDetail, InventoryPatch, LowStockItem,
        NewInventoryItem, Supplier, SupplierName, SupplierSummary,
    },
    store::{InventoryStore, Store, SupplierStore},
};

fn not_found() -> AppError {
    AppError::NotFound("Stock entry not found.".into())
}

pub async fn ensure_supplier_exists(store: &dyn Store, supplier_id: Uuid) -> AppResult<()> {
    if store.supplier_exists(supplier_id).await? {
        Ok(())
    } else {
        Err(AppError::unknown_supplier())
    }
}

pub async fn create_item(store: &dyn Store, input: CreateInventoryItem) -> AppResult<InventoryItem> {
    let draft = input.validate()?;
    ensure_supplier_exists(store, draft.supplier_id).await?;

    let item = store
        .insert_item(NewInventoryItem::new(
            draft.name,
            draft.description,
            draft.quantity,
            draft.low_stock,
            draft.supplier_id,
        ))
        .await?;
    log::info!("Stock entry {} created (low stock: {})", item.id, item.is_low_stock);
    Ok(item)
}

pub async fn update_item(
    store: &dyn Store,
    id: Uuid,
    patch: InventoryPatch,
) -> AppResult<InventoryItem> {
    let changes = patch.validate()?;
    if let Some(supplier_id) = changes.supplier_id {
        ensure_supplier_exists(store, supplier_id).await?;
    }

    let mut item = store.find_item(id).await?.ok_or_else(not_found)?;
    changes.apply(&mut item);
    store.save_item(&item).await?.ok_or_else(not_found)
}

pub async fn delete_item(store: &dyn Store, id: Uuid) -> AppResult<InventoryItem> {
    let item = store.delete_item(id).await?.ok_or_else(not_found)?;
    log::info!("Stock entry {} deleted", item.id);
    Ok(item)
}

pub async fn get_item(store: &dyn Store, id: Uuid) -> AppResult<InventoryItemDetail> {
    let item = store
        .find_item(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found.".into()))?;
    let supplier = store.find_supplier(item.supplier_id).await?;
    Ok(InventoryItemDetail::new(
        item,
        supplier.as_ref().map(SupplierSummary::from),
    ))
}

pub async fn list_items(store: &dyn Store) -> AppResult<Vec<InventoryItemDetail>> {
    let items = store.list_items().await?;
    let suppliers = suppliers_for(store, &items).await?;

    Ok(items
        .into_iter()
        .map(|item| {
            let supplier = suppliers.get(&item.supplier_id).map(SupplierSummary::from);
            InventoryItemDetail::new(item, supplier)
        })
        .collect())
}

pub async fn list_low_stock(store: &dyn Store) -> AppResult<Vec<LowStockItem>> {
    let items = store.list_low_stock_items().await?;
    let suppliers = suppliers_for(store, &items).await?;

    Ok(items
        .into_iter()
        .map(|item| LowStockItem {
            supplier: suppliers.get(&item.supplier_id).map(SupplierName::from),
            id: item.id,
            name: item.name,
            quantity: item.quantity,
        })
        .collect())
}

/// One lookup for every distinct supplier referenced by `items`.
async fn suppliers_for(
    store: &dyn Store,
    items: &[InventoryItem],
) -> AppResult<HashMap<Uuid, Supplier>> {
    let mut ids: Vec<Uuid> = items.iter().map(|item| item.supplier_id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    Ok(store
        .find_suppliers(&ids)
        .await?
        .into_iter()
        .map(|supplier| (supplier.id, supplier))
        .collect())
}

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{CreateSupplier, Supplier, SupplierPatch},
    store::{InventoryStore, Store, SupplierStore},
};

fn not_found() -> AppError {
    AppError::NotFound("Supplier not found".into())
}

pub async fn create_supplier(store: &dyn Store, input: CreateSupplier) -> AppResult<Supplier> {
    let supplier = store.insert_supplier(input.validate()?).await?;
    log::info!("Supplier {} created ({})", supplier.id, supplier.name);
    Ok(supplier)
}

pub async fn get_supplier(store: &dyn Store, id: Uuid) -> AppResult<Supplier> {
    store.find_supplier(id).await?.ok_or_else(not_found)
}

pub async fn list_suppliers(store: &dyn Store) -> AppResult<Vec<Supplier>> {
    store.list_suppliers().await
}

pub async fn search_suppliers(store: &dyn Store, query: &str) -> AppResult<Vec<Supplier>> {
    store.search_suppliers(query.trim()).await
}

pub async fn update_supplier(
    store: &dyn Store,
    id: Uuid,
    patch: SupplierPatch,
) -> AppResult<Supplier> {
    let mut supplier = get_supplier(store, id).await?;
    patch.apply(&mut supplier)?;
    store.save_supplier(&supplier).await?.ok_or_else(not_found)
}

/// Refuses while any inventory item still points at `supplier_id`.
///
/// The check and the delete that follows are separate storage calls. An item
/// linked in between is refused by the store's own delete, with the same error.
pub async fn ensure_unreferenced(store: &dyn Store, supplier_id: Uuid) -> AppResult<()> {
    if store.supplier_has_items(supplier_id).await? {
        log::warn!("Refusing to delete supplier {}: inventory still linked", supplier_id);
        return Err(AppError::supplier_in_use());
    }
    Ok(())
}

pub async fn delete_supplier(store: &dyn Store, id: Uuid) -> AppResult<Supplier> {
    ensure_unreferenced(store, id).await?;
    let supplier = store.delete_supplier(id).await?.ok_or_else(not_found)?;
    log::info!("Supplier {} deleted", supplier.id);
    Ok(supplier)
}

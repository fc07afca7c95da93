use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{InventoryItem, NewInventoryItem, NewSupplier, NewUser, Supplier, User},
    store::{InventoryStore, SupplierStore, UserStore},
};

#[derive(Default)]
struct Tables {
    suppliers: Vec<Supplier>,
    items: Vec<InventoryItem>,
    users: Vec<User>,
}

impl Tables {
    fn has_supplier(&self, id: Uuid) -> bool {
        self.suppliers.iter().any(|s| s.id == id)
    }
}

/// Process-local store. Rows are kept in insertion order.
///
/// Mirrors the Postgres constraints: items must point at an existing
/// supplier, a supplier with items cannot be deleted, and emails are unique.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn materialize(item: NewInventoryItem) -> InventoryItem {
    let now = Utc::now();
    InventoryItem {
        id: Uuid::new_v4(),
        name: item.name,
        description: item.description,
        quantity: item.quantity,
        low_stock: item.low_stock,
        supplier_id: item.supplier_id,
        is_low_stock: item.is_low_stock,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl SupplierStore for MemoryStore {
    async fn insert_supplier(&self, supplier: NewSupplier) -> AppResult<Supplier> {
        let now = Utc::now();
        let record = Supplier {
            id: Uuid::new_v4(),
            name: supplier.name,
            contact_info: supplier.contact_info,
            address: supplier.address,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.suppliers.push(record.clone());
        Ok(record)
    }

    async fn find_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>> {
        let tables = self.tables.read().await;
        Ok(tables.suppliers.iter().find(|s| s.id == id).cloned())
    }

    async fn find_suppliers(&self, ids: &[Uuid]) -> AppResult<Vec<Supplier>> {
        let tables = self.tables.read().await;
        Ok(tables
            .suppliers
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn supplier_exists(&self, id: Uuid) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.suppliers.iter().any(|s| s.id == id))
    }

    async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        Ok(self.tables.read().await.suppliers.clone())
    }

    async fn search_suppliers(&self, query: &str) -> AppResult<Vec<Supplier>> {
        let tables = self.tables.read().await;
        Ok(tables
            .suppliers
            .iter()
            .filter(|s| s.matches(query))
            .cloned()
            .collect())
    }

    async fn save_supplier(&self, supplier: &Supplier) -> AppResult<Option<Supplier>> {
        let mut tables = self.tables.write().await;
        let Some(slot) = tables.suppliers.iter_mut().find(|s| s.id == supplier.id) else {
            return Ok(None);
        };
        *slot = Supplier {
            created_at: slot.created_at,
            updated_at: Utc::now(),
            ..supplier.clone()
        };
        Ok(Some(slot.clone()))
    }

    async fn delete_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>> {
        let mut tables = self.tables.write().await;
        if tables.items.iter().any(|i| i.supplier_id == id) {
            return Err(AppError::supplier_in_use());
        }
        let position = tables.suppliers.iter().position(|s| s.id == id);
        Ok(position.map(|index| tables.suppliers.remove(index)))
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn insert_item(&self, item: NewInventoryItem) -> AppResult<InventoryItem> {
        let mut tables = self.tables.write().await;
        if !tables.has_supplier(item.supplier_id) {
            return Err(AppError::unknown_supplier());
        }
        let record = materialize(item);
        tables.items.push(record.clone());
        Ok(record)
    }

    async fn insert_items(&self, items: Vec<NewInventoryItem>) -> AppResult<Vec<InventoryItem>> {
        let mut tables = self.tables.write().await;
        if items.iter().any(|item| !tables.has_supplier(item.supplier_id)) {
            return Err(AppError::supplier_removed_during_import());
        }
        let records: Vec<InventoryItem> = items.into_iter().map(materialize).collect();
        tables.items.extend(records.iter().cloned());
        Ok(records)
    }

    async fn find_item(&self, id: Uuid) -> AppResult<Option<InventoryItem>> {
        let tables = self.tables.read().await;
        Ok(tables.items.iter().find(|i| i.id == id).cloned())
    }

    async fn list_items(&self) -> AppResult<Vec<InventoryItem>> {
        Ok(self.tables.read().await.items.clone())
    }

    async fn list_low_stock_items(&self) -> AppResult<Vec<InventoryItem>> {
        let tables = self.tables.read().await;
        Ok(tables.items.iter().filter(|i| i.is_low_stock).cloned().collect())
    }

    async fn supplier_has_items(&self, supplier_id: Uuid) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.items.iter().any(|i| i.supplier_id == supplier_id))
    }

    async fn save_item(&self, item: &InventoryItem) -> AppResult<Option<InventoryItem>> {
        let mut tables = self.tables.write().await;
        if !tables.has_supplier(item.supplier_id) {
            return Err(AppError::unknown_supplier());
        }
        let Some(slot) = tables.items.iter_mut().find(|i| i.id == item.id) else {
            return Ok(None);
        };
        *slot = InventoryItem {
            created_at: slot.created_at,
            updated_at: Utc::now(),
            ..item.clone()
        };
        Ok(Some(slot.clone()))
    }

    async fn delete_item(&self, id: Uuid) -> AppResult<Option<InventoryItem>> {
        let mut tables = self.tables.write().await;
        let position = tables.items.iter().position(|i| i.id == id);
        Ok(position.map(|index| tables.items.remove(index)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::duplicate_email());
        }
        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(record.clone());
        Ok(record)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactInfo, Role};

    fn acme() -> NewSupplier {
        NewSupplier {
            name: "Acme".into(),
            contact_info: ContactInfo {
                phone: "1234567890".into(),
                email: "a@b.com".into(),
            },
            address: None,
        }
    }

    #[tokio::test]
    async fn save_keeps_creation_time() {
        let store = MemoryStore::new();
        let supplier = store.insert_supplier(acme()).await.unwrap();

        let mut changed = supplier.clone();
        changed.name = "Acme Ltd".into();
        changed.created_at = Utc::now() + chrono::Duration::days(1);
        let saved = store.save_supplier(&changed).await.unwrap().unwrap();

        assert_eq!(saved.name, "Acme Ltd");
        assert_eq!(saved.created_at, supplier.created_at);
    }

    #[tokio::test]
    async fn low_stock_listing_reads_the_stored_flag() {
        let store = MemoryStore::new();
        let supplier = store.insert_supplier(acme()).await.unwrap();
        store
            .insert_item(NewInventoryItem::new("Low".into(), None, 1, 10, supplier.id))
            .await
            .unwrap();
        store
            .insert_item(NewInventoryItem::new("Plenty".into(), None, 50, 10, supplier.id))
            .await
            .unwrap();

        let low = store.list_low_stock_items().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Low");
        assert!(store.supplier_has_items(supplier.id).await.unwrap());
    }

    #[tokio::test]
    async fn linked_supplier_cannot_be_deleted() {
        let store = MemoryStore::new();
        let supplier = store.insert_supplier(acme()).await.unwrap();
        let item = store
            .insert_item(NewInventoryItem::new("Widget".into(), None, 1, 10, supplier.id))
            .await
            .unwrap();

        let err = store.delete_supplier(supplier.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(store.find_supplier(supplier.id).await.unwrap().is_some());
        assert_eq!(store.list_items().await.unwrap().len(), 1);

        store.delete_item(item.id).await.unwrap();
        assert!(store.delete_supplier(supplier.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn items_must_reference_an_existing_supplier() {
        let store = MemoryStore::new();
        let supplier = store.insert_supplier(acme()).await.unwrap();
        let ghost = Uuid::new_v4();

        let err = store
            .insert_item(NewInventoryItem::new("Widget".into(), None, 1, 10, ghost))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Reference(_)));

        let mut item = store
            .insert_item(NewInventoryItem::new("Widget".into(), None, 1, 10, supplier.id))
            .await
            .unwrap();
        item.supplier_id = ghost;
        let err = store.save_item(&item).await.unwrap_err();
        assert!(matches!(err, AppError::Reference(_)));
        let stored = store.find_item(item.id).await.unwrap().unwrap();
        assert_eq!(stored.supplier_id, supplier.id);
    }

    #[tokio::test]
    async fn batch_with_unknown_supplier_writes_nothing() {
        let store = MemoryStore::new();
        let supplier = store.insert_supplier(acme()).await.unwrap();

        let err = store
            .insert_items(vec![
                NewInventoryItem::new("Widget".into(), None, 1, 10, supplier.id),
                NewInventoryItem::new("Ghost".into(), None, 1, 10, Uuid::new_v4()),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Import(_)));
        assert!(store.list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn emails_are_unique_ignoring_case() {
        let store = MemoryStore::new();
        let user = |email: &str| NewUser {
            name: "Dana".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: Role::Staff,
        };

        store.insert_user(user("dana@example.com")).await.unwrap();
        let err = store.insert_user(user("DANA@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}

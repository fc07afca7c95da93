//! Persistence seam. Services only see these traits; `PgStore` backs
//! production, `MemoryStore` backs tests and database-less local runs.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{InventoryItem, NewInventoryItem, NewSupplier, NewUser, Supplier, User},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait SupplierStore: Send + Sync {
    async fn insert_supplier(&self, supplier: NewSupplier) -> AppResult<Supplier>;

    async fn find_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>>;

    async fn find_suppliers(&self, ids: &[Uuid]) -> AppResult<Vec<Supplier>>;

    async fn supplier_exists(&self, id: Uuid) -> AppResult<bool>;

    async fn list_suppliers(&self) -> AppResult<Vec<Supplier>>;

    /// Case-insensitive substring search over name, phone and email.
    async fn search_suppliers(&self, query: &str) -> AppResult<Vec<Supplier>>;

    /// Writes every field of `supplier`; `None` when the row is gone.
    async fn save_supplier(&self, supplier: &Supplier) -> AppResult<Option<Supplier>>;

    async fn delete_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>>;
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn insert_item(&self, item: NewInventoryItem) -> AppResult<InventoryItem>;

    /// All rows land or none do.
    async fn insert_items(&self, items: Vec<NewInventoryItem>) -> AppResult<Vec<InventoryItem>>;

    async fn find_item(&self, id: Uuid) -> AppResult<Option<InventoryItem>>;

    async fn list_items(&self) -> AppResult<Vec<InventoryItem>>;

    async fn list_low_stock_items(&self) -> AppResult<Vec<InventoryItem>>;

    async fn supplier_has_items(&self, supplier_id: Uuid) -> AppResult<bool>;

    /// Writes every field of `item` including its flag; `None` when the row is gone.
    async fn save_item(&self, item: &InventoryItem) -> AppResult<Option<InventoryItem>>;

    async fn delete_item(&self, id: Uuid) -> AppResult<Option<InventoryItem>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> AppResult<User>;

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

pub trait Store: SupplierStore + InventoryStore + UserStore {}

impl<T> Store for T where T: SupplierStore + InventoryStore + UserStore {}

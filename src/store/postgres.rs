use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    database::Database,
    error::{AppError, AppResult},
    models::{
        ContactInfo, InventoryItem, NewInventoryItem, NewSupplier, NewUser, Supplier, User,
    },
    store::{InventoryStore, SupplierStore, UserStore},
};

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";
const INSERT_CHUNK: usize = 1000;

const SUPPLIER_COLUMNS: &str = "id, name, phone, email, address, created_at, updated_at";
const ITEM_COLUMNS: &str =
    "id, name, description, quantity, low_stock, supplier_id, is_low_stock, created_at, updated_at";
const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: Database,
}

impl PgStore {
    pub fn new(pool: Database) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    phone: String,
    email: String,
    address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            contact_info: ContactInfo {
                phone: row.phone,
                email: row.email,
            },
            address: row.address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|_| AppError::Internal(format!("Stored user has unknown role {}", row.role)))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn violates(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(code),
        _ => false,
    }
}

/// `mapped()` when `err` is the given constraint violation, a database error otherwise.
fn constraint_error(err: sqlx::Error, code: &str, mapped: fn() -> AppError) -> AppError {
    if violates(&err, code) {
        mapped()
    } else {
        AppError::Database(err)
    }
}

#[async_trait]
impl SupplierStore for PgStore {
    async fn insert_supplier(&self, supplier: NewSupplier) -> AppResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "INSERT INTO suppliers (id, name, phone, email, address) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            SUPPLIER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&supplier.name)
        .bind(&supplier.contact_info.phone)
        .bind(&supplier.contact_info.email)
        .bind(&supplier.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers WHERE id = $1",
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Supplier::from))
    }

    async fn find_suppliers(&self, ids: &[Uuid]) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers WHERE id = ANY($1)",
            SUPPLIER_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    async fn supplier_exists(&self, id: Uuid) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM suppliers WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers ORDER BY created_at, id",
            SUPPLIER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    async fn search_suppliers(&self, query: &str) -> AppResult<Vec<Supplier>> {
        // position() keeps LIKE wildcards in the query literal.
        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            SELECT {} FROM suppliers
            WHERE position(lower($1) in lower(name)) > 0
               OR position(lower($1) in lower(phone)) > 0
               OR position(lower($1) in lower(email)) > 0
            ORDER BY created_at, id
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    async fn save_supplier(&self, supplier: &Supplier) -> AppResult<Option<Supplier>> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            UPDATE suppliers
            SET name = $2, phone = $3, email = $4, address = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_info.phone)
        .bind(&supplier.contact_info.email)
        .bind(&supplier.address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Supplier::from))
    }

    async fn delete_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>> {
        // ON DELETE RESTRICT also covers items linked after the service's guard ran.
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "DELETE FROM suppliers WHERE id = $1 RETURNING {}",
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| constraint_error(err, FOREIGN_KEY_VIOLATION, AppError::supplier_in_use))?;

        Ok(row.map(Supplier::from))
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn insert_item(&self, item: NewInventoryItem) -> AppResult<InventoryItem> {
        let inserted = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            INSERT INTO inventory_items (id, name, description, quantity, low_stock, supplier_id, is_low_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.low_stock)
        .bind(item.supplier_id)
        .bind(item.is_low_stock)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| constraint_error(err, FOREIGN_KEY_VIOLATION, AppError::unknown_supplier))?;

        Ok(inserted)
    }

    async fn insert_items(&self, items: Vec<NewInventoryItem>) -> AppResult<Vec<InventoryItem>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(items.len());

        for chunk in items.chunks(INSERT_CHUNK) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO inventory_items (id, name, description, quantity, low_stock, supplier_id, is_low_stock) ",
            );
            builder.push_values(chunk, |mut row, item| {
                row.push_bind(Uuid::new_v4())
                    .push_bind(item.name.clone())
                    .push_bind(item.description.clone())
                    .push_bind(item.quantity)
                    .push_bind(item.low_stock)
                    .push_bind(item.supplier_id)
                    .push_bind(item.is_low_stock);
            });
            builder.push(" RETURNING ");
            builder.push(ITEM_COLUMNS);

            let rows = builder
                .build_query_as::<InventoryItem>()
                .fetch_all(&mut *tx)
                .await
                .map_err(|err| {
                    constraint_error(
                        err,
                        FOREIGN_KEY_VIOLATION,
                        AppError::supplier_removed_during_import,
                    )
                })?;
            inserted.extend(rows);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn find_item(&self, id: Uuid) -> AppResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {} FROM inventory_items WHERE id = $1",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn list_items(&self) -> AppResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {} FROM inventory_items ORDER BY created_at, id",
            ITEM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn list_low_stock_items(&self) -> AppResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {} FROM inventory_items WHERE is_low_stock = true ORDER BY created_at, id",
            ITEM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn supplier_has_items(&self, supplier_id: Uuid) -> AppResult<bool> {
        let linked = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM inventory_items WHERE supplier_id = $1)",
        )
        .bind(supplier_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(linked)
    }

    async fn save_item(&self, item: &InventoryItem) -> AppResult<Option<InventoryItem>> {
        let saved = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory_items
            SET name = $2, description = $3, quantity = $4, low_stock = $5,
                supplier_id = $6, is_low_stock = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.low_stock)
        .bind(item.supplier_id)
        .bind(item.is_low_stock)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| constraint_error(err, FOREIGN_KEY_VIOLATION, AppError::unknown_supplier))?;

        Ok(saved)
    }

    async fn delete_item(&self, id: Uuid) -> AppResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "DELETE FROM inventory_items WHERE id = $1 RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| constraint_error(err, UNIQUE_VIOLATION, AppError::duplicate_email))?;

        row.try_into()
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}

//! Bulk import of inventory items from an uploaded CSV file.
//!
//! Rows are read one at a time and checked in file order. The first bad row
//! aborts the whole import and nothing is written. The uploaded file is
//! removed once reading has finished, whatever the outcome.

use std::path::Path;

use csv_async::{AsyncReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{inventory::DEFAULT_LOW_STOCK, InventoryItem, NewInventoryItem},
    store::{InventoryStore, Store, SupplierStore},
};

/// One CSV line as written by the uploader. Headers:
/// `name, description, quantity, lowStock, supplier`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ImportRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    quantity: Option<String>,
    #[serde(rename = "lowStock", alias = "low_stock", default)]
    low_stock: Option<String>,
    #[serde(default)]
    supplier: Option<String>,
}

impl ImportRow {
    fn content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    fn rejected(&self, reason: &str) -> AppError {
        log::warn!("Import aborted: {} in row {}", reason, self.content());
        AppError::Import(format!("{} in row: {}", reason, self.content()))
    }
}

pub async fn import_from_path(store: &dyn Store, path: &Path) -> AppResult<Vec<InventoryItem>> {
    let parsed = read_rows(store, path).await;

    if let Err(err) = tokio::fs::remove_file(path).await {
        log::warn!("Could not remove upload {}: {}", path.display(), err);
    }

    let rows = parsed?;
    let inserted = store.insert_items(rows).await?;
    log::info!("Imported {} inventory items", inserted.len());
    Ok(inserted)
}

async fn read_rows(store: &dyn Store, path: &Path) -> AppResult<Vec<NewInventoryItem>> {
    let file = File::open(path).await?;
    let mut reader = AsyncReaderBuilder::new()
        .trim(Trim::All)
        .create_reader(file);

    let headers = reader
        .headers()
        .await
        .map_err(|e| AppError::Import(format!("Unreadable header row: {}", e)))?
        .clone();

    let mut record = StringRecord::new();
    let mut validated = Vec::new();

    while reader
        .read_record(&mut record)
        .await
        .map_err(|e| AppError::Import(format!("Malformed CSV: {}", e)))?
    {
        let row: ImportRow = record
            .deserialize(Some(&headers))
            .map_err(|e| AppError::Import(format!("Malformed row {:?}: {}", record, e)))?;
        validated.push(validate_row(store, &row).await?);
    }

    Ok(validated)
}

async fn validate_row(store: &dyn Store, row: &ImportRow) -> AppResult<NewInventoryItem> {
    let name = present(&row.name).ok_or_else(|| row.rejected("Missing name"))?;
    let quantity = present(&row.quantity)
        .and_then(parse_count)
        .ok_or_else(|| row.rejected("Invalid quantity"))?;
    let low_stock = match present(&row.low_stock) {
        Some(raw) => parse_count(raw).ok_or_else(|| row.rejected("Invalid lowStock"))?,
        None => DEFAULT_LOW_STOCK,
    };
    let supplier_id = present(&row.supplier)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| row.rejected("Invalid supplier ID"))?;

    if !store.supplier_exists(supplier_id).await? {
        return Err(row.rejected("Invalid supplier ID"));
    }

    Ok(NewInventoryItem::new(
        name.to_string(),
        present(&row.description).map(str::to_string),
        quantity,
        low_stock,
        supplier_id,
    ))
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_count(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok().filter(|n| *n >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{ContactInfo, NewSupplier},
        store::MemoryStore,
    };
    use std::path::PathBuf;

    async fn store_with_supplier() -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let supplier = store
            .insert_supplier(NewSupplier {
                name: "Acme".into(),
                contact_info: ContactInfo {
                    phone: "1234567890".into(),
                    email: "a@b.com".into(),
                },
                address: None,
            })
            .await
            .unwrap();
        (store, supplier.id)
    }

    fn write_upload(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("upload.csv");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn valid_rows_are_all_committed() {
        let (store, supplier) = store_with_supplier().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_upload(
            &dir,
            &format!(
                "name,description,quantity,lowStock,supplier\n\
                 Widget , small part ,5,10,{s}\n\
                 Gadget,,50,,{s}\n\
                 Doohickey,spare,3,2,{s}\n",
                s = supplier
            ),
        );

        let items = import_from_path(&store, &path).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(store.list_items().await.unwrap().len(), 3);
        assert!(!path.exists());

        assert_eq!(items[0].name, "Widget");
        assert_eq!(items[0].description.as_deref(), Some("small part"));
        assert_eq!(items[1].low_stock, DEFAULT_LOW_STOCK);
        assert_eq!(items[1].description, None);
        for item in &items {
            assert_eq!(item.is_low_stock, item.quantity < item.low_stock);
        }
    }

    #[tokio::test]
    async fn unknown_supplier_aborts_everything() {
        let (store, supplier) = store_with_supplier().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_upload(
            &dir,
            &format!(
                "name,description,quantity,lowStock,supplier\n\
                 Widget,,5,10,{}\n\
                 Ghost,,1,1,{}\n",
                supplier,
                Uuid::new_v4()
            ),
        );

        let err = import_from_path(&store, &path).await.unwrap_err();
        match err {
            AppError::Import(message) => assert!(message.contains("Ghost")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.list_items().await.unwrap().is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn non_numeric_quantity_is_rejected() {
        let (store, supplier) = store_with_supplier().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_upload(
            &dir,
            &format!("name,quantity,supplier\nWidget,lots,{}\n", supplier),
        );

        assert!(matches!(
            import_from_path(&store, &path).await,
            Err(AppError::Import(_))
        ));
        assert!(store.list_items().await.unwrap().is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn header_only_file_imports_nothing() {
        let (store, _) = store_with_supplier().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_upload(&dir, "name,description,quantity,lowStock,supplier\n");

        let items = import_from_path(&store, &path).await.unwrap();
        assert!(items.is_empty());
        assert!(!path.exists());
    }
}

use std::path::{Path as FsPath, PathBuf};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::{Multipart, WithRejection};
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    handlers::{data, with_message, Envelope},
    middleware::{AdminOnly, AdminOrManager},
    models::{
        CreateInventoryItem, InventoryItem, InventoryItemDetail, InventoryPatch, LowStockItem,
    },
    services::{import, inventory as service},
    AppState,
};

type ItemId = WithRejection<Path<Uuid>, AppError>;

const UPLOAD_FIELD: &str = "file";

pub async fn create_item(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<CreateInventoryItem>, AppError>,
) -> AppResult<(StatusCode, Json<Envelope<InventoryItem>>)> {
    let item = service::create_item(state.store.as_ref(), body).await?;
    Ok((
        StatusCode::CREATED,
        with_message("Stock entry created successfully", item),
    ))
}

pub async fn update_item(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
    WithRejection(Path(id), _): ItemId,
    WithRejection(Json(patch), _): WithRejection<Json<InventoryPatch>, AppError>,
) -> AppResult<Json<Envelope<InventoryItem>>> {
    let item = service::update_item(state.store.as_ref(), id, patch).await?;
    Ok(with_message("Stock entry updated successfully", item))
}

pub async fn delete_item(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
    WithRejection(Path(id), _): ItemId,
) -> AppResult<Json<Envelope<InventoryItem>>> {
    let item = service::delete_item(state.store.as_ref(), id).await?;
    Ok(with_message("Stock entry deleted successfully", item))
}

pub async fn get_item(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
    WithRejection(Path(id), _): ItemId,
) -> AppResult<Json<Envelope<InventoryItemDetail>>> {
    Ok(data(service::get_item(state.store.as_ref(), id).await?))
}

pub async fn list_items(
    AdminOrManager(_user): AdminOrManager,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<Vec<InventoryItemDetail>>>> {
    Ok(data(service::list_items(state.store.as_ref()).await?))
}

pub async fn low_stock_items(
    AdminOrManager(_user): AdminOrManager,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<Vec<LowStockItem>>>> {
    Ok(data(service::list_low_stock(state.store.as_ref()).await?))
}

pub async fn import_items(
    AdminOnly(user): AdminOnly,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Envelope<Vec<InventoryItem>>>)> {
    let path = save_upload(&state.config.upload_dir, &mut multipart).await?;
    log::info!("{} uploaded {} for import", user.email, path.display());

    let items = import::import_from_path(state.store.as_ref(), &path).await?;
    Ok((
        StatusCode::CREATED,
        with_message("Products imported successfully", items),
    ))
}

/// Spools the `file` part to disk chunk by chunk and returns where it landed.
async fn save_upload(dir: &FsPath, multipart: &mut Multipart) -> AppResult<PathBuf> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.csv", Uuid::new_v4()));
        let mut file = fs::File::create(&path).await?;

        let written: AppResult<()> = async {
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?
            {
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        if let Err(err) = written {
            if let Err(cleanup) = fs::remove_file(&path).await {
                log::warn!("Could not remove partial upload {}: {}", path.display(), cleanup);
            }
            return Err(err);
        }
        return Ok(path);
    }

    Err(AppError::Validation("No file uploaded".into()))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    handlers::{data, with_message, Envelope},
    middleware::{AdminOnly, AdminOrManager},
    models::{CreateSupplier, Supplier, SupplierPatch},
    services::suppliers as service,
    AppState,
};

type SupplierId = WithRejection<Path<Uuid>, AppError>;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    query: String,
}

pub async fn create_supplier(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<CreateSupplier>, AppError>,
) -> AppResult<(StatusCode, Json<Envelope<Supplier>>)> {
    let supplier = service::create_supplier(state.store.as_ref(), body).await?;
    Ok((
        StatusCode::CREATED,
        with_message("Supplier created successfully", supplier),
    ))
}

pub async fn list_suppliers(
    AdminOrManager(_user): AdminOrManager,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<Vec<Supplier>>>> {
    Ok(data(service::list_suppliers(state.store.as_ref()).await?))
}

pub async fn get_supplier(
    AdminOrManager(_user): AdminOrManager,
    State(state): State<AppState>,
    WithRejection(Path(id), _): SupplierId,
) -> AppResult<Json<Envelope<Supplier>>> {
    Ok(data(service::get_supplier(state.store.as_ref(), id).await?))
}

pub async fn update_supplier(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
    WithRejection(Path(id), _): SupplierId,
    WithRejection(Json(patch), _): WithRejection<Json<SupplierPatch>, AppError>,
) -> AppResult<Json<Envelope<Supplier>>> {
    let supplier = service::update_supplier(state.store.as_ref(), id, patch).await?;
    Ok(with_message("Supplier updated successfully", supplier))
}

pub async fn delete_supplier(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
    WithRejection(Path(id), _): SupplierId,
) -> AppResult<Json<Envelope<Supplier>>> {
    let supplier = service::delete_supplier(state.store.as_ref(), id).await?;
    Ok(with_message("Supplier deleted successfully", supplier))
}

pub async fn search_suppliers(
    AdminOrManager(_user): AdminOrManager,
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<SearchParams>, AppError>,
) -> AppResult<Json<Envelope<Vec<Supplier>>>> {
    Ok(data(
        service::search_suppliers(state.store.as_ref(), &params.query).await?,
    ))
}

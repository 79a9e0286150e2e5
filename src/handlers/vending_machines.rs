// src/handlers/vending_machines.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::vending::{BoundingBox, Product, VendingItemLink, VendingMachine, VendingMachinePayload},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductIdQuery {
    /// ID do produto
    pub product_id: Uuid,
}

// GET /vending_machines
#[utoipa::path(
    get,
    path = "/vending_machines",
    tag = "vending_machines",
    responses(
        (status = 200, description = "Lista de máquinas", body = Vec<VendingMachine>)
    )
)]
pub async fn list_vending_machines(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let machines = app_state.vending_machine_service.get_all().await?;
    Ok((StatusCode::OK, Json(machines)))
}

// GET /vending_machines_local?lat1=&lng1=&lat2=&lng2=
#[utoipa::path(
    get,
    path = "/vending_machines_local",
    tag = "vending_machines",
    responses(
        (status = 200, description = "Máquinas dentro da caixa (limites inclusivos)", body = Vec<VendingMachine>)
    )
)]
pub async fn list_local_vending_machines(
    State(app_state): State<AppState>,
    Query(bbox): Query<BoundingBox>,
) -> Result<impl IntoResponse, AppError> {
    let machines = app_state
        .vending_machine_service
        .find_in_bounding_box(bbox)
        .await?;
    Ok((StatusCode::OK, Json(machines)))
}

// GET /vending_machines_search_product?product_id=
#[utoipa::path(
    get,
    path = "/vending_machines_search_product",
    tag = "vending_machines",
    responses(
        (status = 200, description = "Máquinas que vendem o produto", body = Vec<VendingMachine>)
    )
)]
pub async fn search_vending_machines_by_product(
    State(app_state): State<AppState>,
    Query(query): Query<ProductIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let machines = app_state
        .vending_machine_service
        .find_by_product(query.product_id)
        .await?;
    Ok((StatusCode::OK, Json(machines)))
}

// GET /vending_machines/{id}
#[utoipa::path(
    get,
    path = "/vending_machines/{id}",
    tag = "vending_machines",
    params(
        ("id" = Uuid, Path, description = "ID da máquina")
    ),
    responses(
        (status = 200, description = "Máquina encontrada", body = VendingMachine),
        (status = 404, description = "Máquina não encontrada")
    )
)]
pub async fn get_vending_machine(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let machine = app_state.vending_machine_service.get_by_id(id).await?;
    Ok((StatusCode::OK, Json(machine)))
}

// POST /vending_machines
#[utoipa::path(
    post,
    path = "/vending_machines",
    tag = "vending_machines",
    request_body = VendingMachinePayload,
    responses(
        (status = 201, description = "Máquina criada", body = VendingMachine),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_vending_machine(
    State(app_state): State<AppState>,
    Json(payload): Json<VendingMachinePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let machine = app_state.vending_machine_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(machine)))
}

// PUT /vending_machines/{id}
#[utoipa::path(
    put,
    path = "/vending_machines/{id}",
    tag = "vending_machines",
    request_body = VendingMachinePayload,
    params(
        ("id" = Uuid, Path, description = "ID da máquina")
    ),
    responses(
        (status = 200, description = "Máquina atualizada"),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn update_vending_machine(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VendingMachinePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state.vending_machine_service.update(id, &payload).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Máquina atualizada" }))))
}

// DELETE /vending_machines/{id}
#[utoipa::path(
    delete,
    path = "/vending_machines/{id}",
    tag = "vending_machines",
    params(
        ("id" = Uuid, Path, description = "ID da máquina")
    ),
    responses(
        (status = 200, description = "Máquina apagada"),
        (status = 409, description = "Máquina ainda vinculada (política restrict)")
    )
)]
pub async fn delete_vending_machine(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.vending_machine_service.delete(id).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Máquina apagada" }))))
}

// GET /vending_machines/{id}/products
#[utoipa::path(
    get,
    path = "/vending_machines/{id}/products",
    tag = "vending_machines",
    params(
        ("id" = Uuid, Path, description = "ID da máquina")
    ),
    responses(
        (status = 200, description = "Produtos da máquina", body = Vec<Product>)
    )
)]
pub async fn list_vending_machine_products(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.list_by_vending_machine(id).await?;
    Ok((StatusCode::OK, Json(products)))
}

// GET /vending_machines/{id}/links
// Linhas cruas da tabela de vínculos, com duplicadas.
#[utoipa::path(
    get,
    path = "/vending_machines/{id}/links",
    tag = "vending_machines",
    params(
        ("id" = Uuid, Path, description = "ID da máquina")
    ),
    responses(
        (status = 200, description = "Vínculos da máquina", body = Vec<VendingItemLink>)
    )
)]
pub async fn list_vending_machine_links(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let links = app_state.link_service.links_for_machine(id).await?;
    Ok((StatusCode::OK, Json(links)))
}

// POST /vending_machines/{id}/products?product_id=
#[utoipa::path(
    post,
    path = "/vending_machines/{id}/products",
    tag = "vending_machines",
    params(
        ("id" = Uuid, Path, description = "ID da máquina")
    ),
    responses(
        (status = 201, description = "Vínculo criado", body = VendingItemLink),
        (status = 404, description = "Máquina ou produto não encontrado")
    )
)]
pub async fn add_product_to_vending_machine(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ProductIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let link = app_state.link_service.add_link(id, query.product_id).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

// DELETE /vending_machines/{id}/products/{product_id}
#[utoipa::path(
    delete,
    path = "/vending_machines/{id}/products/{product_id}",
    tag = "vending_machines",
    params(
        ("id" = Uuid, Path, description = "ID da máquina"),
        ("product_id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Vínculos do par removidos")
    )
)]
pub async fn remove_product_from_vending_machine(
    State(app_state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.link_service.remove_link(id, product_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Produto removido da máquina" })),
    ))
}

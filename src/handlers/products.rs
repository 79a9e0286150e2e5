// src/handlers/products.rs

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
    // Importamos os models para referenciar no Swagger
    models::vending::{Product, ProductPayload, VendingItemLink, VendingMachine},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Trecho do nome (sem diferenciar maiúsculas)
    pub search: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VendingMachineIdQuery {
    /// ID da máquina
    pub vending_machine_id: Uuid,
}

// GET /products
#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    responses(
        (status = 200, description = "Lista de produtos", body = Vec<Product>)
    )
)]
pub async fn list_products(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.get_all().await?;
    Ok((StatusCode::OK, Json(products)))
}

// GET /products_search?search=
#[utoipa::path(
    get,
    path = "/products_search",
    tag = "products",
    responses(
        (status = 200, description = "Produtos cujo nome contém o termo", body = Vec<Product>)
    )
)]
pub async fn search_products(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.search(&query.search).await?;
    Ok((StatusCode::OK, Json(products)))
}

// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Produto encontrado", body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.get_by_id(id).await?;
    Ok((StatusCode::OK, Json(product)))
}

// POST /products
#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state.product_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

// PUT /products/{id}
// Substitui todos os campos. Id desconhecido também responde 200.
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "products",
    request_body = ProductPayload,
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Produto atualizado"),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state.product_service.update(id, &payload).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Produto atualizado" }))))
}

// DELETE /products/{id}
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Produto apagado"),
        (status = 409, description = "Produto ainda vinculado (política restrict)")
    )
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.product_service.delete(id).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Produto apagado" }))))
}

// GET /products/{id}/vending_machines
#[utoipa::path(
    get,
    path = "/products/{id}/vending_machines",
    tag = "products",
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Máquinas que vendem o produto", body = Vec<VendingMachine>)
    )
)]
pub async fn list_product_vending_machines(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let machines = app_state.vending_machine_service.find_by_product(id).await?;
    Ok((StatusCode::OK, Json(machines)))
}

// POST /products/{id}/vending_machines?vending_machine_id=
// Mesma operação da rota do lado da máquina, então a máquina é tocada aqui também.
#[utoipa::path(
    post,
    path = "/products/{id}/vending_machines",
    tag = "products",
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 201, description = "Vínculo criado", body = VendingItemLink),
        (status = 404, description = "Máquina ou produto não encontrado")
    )
)]
pub async fn add_vending_machine_to_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<VendingMachineIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let link = app_state
        .link_service
        .add_link(query.vending_machine_id, id)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

// DELETE /products/{id}/vending_machines/{vending_machine_id}
#[utoipa::path(
    delete,
    path = "/products/{id}/vending_machines/{vending_machine_id}",
    tag = "products",
    params(
        ("id" = Uuid, Path, description = "ID do produto"),
        ("vending_machine_id" = Uuid, Path, description = "ID da máquina")
    ),
    responses(
        (status = 200, description = "Vínculos do par removidos")
    )
)]
pub async fn remove_vending_machine_from_product(
    State(app_state): State<AppState>,
    Path((id, vending_machine_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.link_service.remove_link(vending_machine_id, id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Produto removido da máquina" })),
    ))
}

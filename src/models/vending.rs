// src/models/vending.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::{Uuid, fmt::Hyphenated};
use validator::Validate;

// ---
// 1. VendingMachine
// ---
// Os ids ficam no banco como TEXT hifenizado, por isso passam pelo `Hyphenated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendingMachine {
    #[sqlx(try_from = "Hyphenated")]
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Portaria Bloco A")]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    // Coluna com aspas no banco ("hasBin"), herança do serviço antigo.
    #[sqlx(rename = "hasBin")]
    pub has_bin: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Product
// ---
// Linhas gravadas pelo serviço antigo não têm timestamps nem `size`,
// então esses campos são opcionais na leitura.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[sqlx(try_from = "Hyphenated")]
    #[schema(example = "550e8400-e29b-41d4-a716-446655440001")]
    pub id: Uuid,
    #[schema(example = "Coca Cola")]
    pub name: String,
    pub description: String,
    #[schema(example = 6.5)]
    pub price: f64,
    #[schema(example = 350)]
    pub size: Option<i32>,
    #[schema(example = "gelado")]
    pub temperature: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ---
// 3. VendingItemLink (máquina <-> produto)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendingItemLink {
    #[sqlx(try_from = "Hyphenated")]
    pub id: Uuid,
    #[sqlx(try_from = "Hyphenated")]
    pub vending_machine_id: Uuid,
    #[sqlx(try_from = "Hyphenated")]
    pub product_id: Uuid,
}

// ---
// Payloads
// ---

/// Campos de uma máquina, usados tanto no create quanto no replace completo.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendingMachinePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Portaria Bloco A")]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0, message = "A latitude deve estar entre -90 e 90."))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "A longitude deve estar entre -180 e 180."))]
    pub lng: f64,
    pub has_bin: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Coca Cola")]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0.0, message = "O preço não pode ser negativo."))]
    pub price: f64,
    #[validate(range(min = 0, message = "O tamanho não pode ser negativo."))]
    pub size: i32,
    // Texto livre ("ambiente", "gelado", "congelado", ...)
    #[validate(length(min = 1, message = "A temperatura é obrigatória."))]
    pub temperature: String,
}

/// Retângulo lat/lng inclusivo. Os limites são usados como vieram: uma caixa
/// invertida não encontra nada.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BoundingBox {
    /// Latitude mínima
    pub lat1: f64,
    /// Longitude mínima
    pub lng1: f64,
    /// Latitude máxima
    pub lat2: f64,
    /// Longitude máxima
    pub lng2: f64,
}

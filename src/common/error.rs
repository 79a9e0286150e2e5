use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// Erros da aplicação. Cada variante sabe o seu status HTTP e a mensagem que
// vai para o cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Máquina de venda {0} não encontrada")]
    VendingMachineNotFound(Uuid),

    #[error("Produto {0} não encontrado")]
    ProductNotFound(Uuid),

    // Só aparece com a política de delete `restrict`.
    #[error("{entity} {id} ainda possui {links} vínculo(s)")]
    StillLinked {
        entity: &'static str,
        id: Uuid,
        links: i64,
    },

    // Qualquer falha do sqlx. O detalhe vai para o log, nunca para o cliente.
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::VendingMachineNotFound(_) | AppError::ProductNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::StillLinked { .. } => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Loga o erro junto com a operação que o gerou e devolve o próprio erro,
    /// para usar dentro de `map_err`.
    pub fn logged(self, action: &str) -> Self {
        if self.status_code().is_server_error() {
            tracing::error!("Erro ao {}: {}", action, self);
        } else {
            tracing::warn!("Recusado ao {}: {}", action, self);
        }
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match self {
            // Devolve todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::VendingMachineNotFound(_) => "Máquina de venda não encontrada.".to_string(),
            AppError::ProductNotFound(_) => "Produto não encontrado.".to_string(),
            ref e @ AppError::StillLinked { .. } => e.to_string(),

            // Erro de banco vira 500. O `tracing` loga a mensagem completa que o
            // `thiserror` montou, e o cliente recebe só a mensagem genérica.
            ref e @ AppError::DatabaseError(_) => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

//src/main.rs

use axum::{
    routing::{delete, get},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

// Importações principais
use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::handlers::{health, products, vending_machines};

/// Monta o router da aplicação em cima do estado compartilhado.
pub(crate) fn router(app_state: AppState) -> Router {
    // Rotas das máquinas, incluindo o lado "máquina" dos vínculos
    let vending_machine_routes = Router::new()
        .route(
            "/vending_machines",
            get(vending_machines::list_vending_machines)
                .post(vending_machines::create_vending_machine),
        )
        .route(
            "/vending_machines_local",
            get(vending_machines::list_local_vending_machines),
        )
        .route(
            "/vending_machines_search_product",
            get(vending_machines::search_vending_machines_by_product),
        )
        .route(
            "/vending_machines/{id}",
            get(vending_machines::get_vending_machine)
                .put(vending_machines::update_vending_machine)
                .delete(vending_machines::delete_vending_machine),
        )
        .route(
            "/vending_machines/{id}/products",
            get(vending_machines::list_vending_machine_products)
                .post(vending_machines::add_product_to_vending_machine),
        )
        .route(
            "/vending_machines/{id}/links",
            get(vending_machines::list_vending_machine_links),
        )
        .route(
            "/vending_machines/{id}/products/{product_id}",
            delete(vending_machines::remove_product_from_vending_machine),
        );

    // Rotas dos produtos (o lado "produto" dos vínculos reaproveita o LinkService)
    let product_routes = Router::new()
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products_search", get(products::search_products))
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/products/{id}/vending_machines",
            get(products::list_product_vending_machines)
                .post(products::add_vending_machine_to_product),
        )
        .route(
            "/products/{id}/vending_machines/{vending_machine_id}",
            delete(products::remove_vending_machine_from_product),
        );

    Router::new()
        .route("/api/health", get(health::health))
        .merge(vending_machine_routes)
        .merge(product_routes)
        // Documentação: /swagger-ui e o JSON em /api-docs/openapi.json
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger. Sem RUST_LOG, fica em `info`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        "Política de delete dos vínculos: {:?}, tocar máquina ao desvincular: {}",
        config.link_delete_policy,
        config.touch_on_unlink
    );

    // Se o banco ou as migrações falharem, a aplicação não deve iniciar.
    let app_state = AppState::new(&config).await?;
    let app = router(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor ouvindo em {}", listener.local_addr()?);
    tracing::info!("📚 Swagger UI em http://{}/swagger-ui", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

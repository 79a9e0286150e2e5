// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Vending machines ---
        handlers::vending_machines::list_vending_machines,
        handlers::vending_machines::list_local_vending_machines,
        handlers::vending_machines::search_vending_machines_by_product,
        handlers::vending_machines::get_vending_machine,
        handlers::vending_machines::create_vending_machine,
        handlers::vending_machines::update_vending_machine,
        handlers::vending_machines::delete_vending_machine,
        handlers::vending_machines::list_vending_machine_products,
        handlers::vending_machines::list_vending_machine_links,
        handlers::vending_machines::add_product_to_vending_machine,
        handlers::vending_machines::remove_product_from_vending_machine,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::search_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::list_product_vending_machines,
        handlers::products::add_vending_machine_to_product,
        handlers::products::remove_vending_machine_from_product,
    ),
    components(
        schemas(
            models::vending::VendingMachine,
            models::vending::Product,
            models::vending::VendingItemLink,

            // --- Payloads ---
            models::vending::VendingMachinePayload,
            models::vending::ProductPayload,
        )
    ),
    tags(
        (name = "vending_machines", description = "Máquinas de venda e seus produtos"),
        (name = "products", description = "Produtos e as máquinas onde são vendidos"),
        (name = "health", description = "Verificação do serviço")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        common::db_utils::test_pool,
        config::{AppState, Config},
        router,
    };

    #[test]
    fn every_route_is_documented_under_its_tag() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = &doc["paths"];

        for (path, method) in [
            ("/vending_machines", "get"),
            ("/vending_machines", "post"),
            ("/vending_machines_local", "get"),
            ("/vending_machines_search_product", "get"),
            ("/vending_machines/{id}", "put"),
            ("/vending_machines/{id}/products", "post"),
            ("/vending_machines/{id}/products/{product_id}", "delete"),
        ] {
            assert_eq!(paths[path][method]["tags"][0], "vending_machines", "{method} {path}");
        }

        for (path, method) in [
            ("/products", "get"),
            ("/products_search", "get"),
            ("/products/{id}", "delete"),
            ("/products/{id}/vending_machines", "post"),
            ("/products/{id}/vending_machines/{vending_machine_id}", "delete"),
        ] {
            assert_eq!(paths[path][method]["tags"][0], "products", "{method} {path}");
        }

        assert!(doc["components"]["schemas"]["Product"].is_object());
        assert!(doc["components"]["schemas"]["VendingMachinePayload"].is_object());
    }

    #[tokio::test]
    async fn openapi_json_is_served() {
        let app = router(AppState::from_pool(test_pool().await, &Config::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"]["/products_search"].is_object());
    }
}

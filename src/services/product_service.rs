// src/services/product_service.rs

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::{db_utils, error::AppError},
    config::LinkDeletePolicy,
    db::{LinkRepository, ProductRepository},
    models::vending::{Product, ProductPayload},
};

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    link_repo: LinkRepository,
    pool: SqlitePool,
    delete_policy: LinkDeletePolicy,
}

impl ProductService {
    pub fn new(
        product_repo: ProductRepository,
        link_repo: LinkRepository,
        pool: SqlitePool,
        delete_policy: LinkDeletePolicy,
    ) -> Self {
        Self {
            product_repo,
            link_repo,
            pool,
            delete_policy,
        }
    }

    pub async fn get_all(&self) -> Result<Vec<Product>, AppError> {
        self.product_repo
            .get_all()
            .await
            .map_err(|e| e.logged("buscar produtos"))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Product, AppError> {
        self.product_repo
            .find_by_id(&self.pool, id)
            .await
            .and_then(|product| product.ok_or(AppError::ProductNotFound(id)))
            .map_err(|e| e.logged("buscar produto por id"))
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Product>, AppError> {
        self.product_repo
            .search_by_name(term)
            .await
            .map_err(|e| e.logged("pesquisar produtos"))
    }

    /// Produtos vinculados à máquina. Máquina desconhecida devolve lista vazia.
    pub async fn list_by_vending_machine(
        &self,
        vending_machine_id: Uuid,
    ) -> Result<Vec<Product>, AppError> {
        self.product_repo
            .find_by_vending_machine(vending_machine_id)
            .await
            .map_err(|e| e.logged("buscar produtos da máquina"))
    }

    pub async fn create(&self, payload: &ProductPayload) -> Result<Product, AppError> {
        let product = self
            .product_repo
            .create(&self.pool, payload)
            .await
            .map_err(|e| e.logged("criar produto"))?;

        tracing::info!("Produto criado: {}", product.id);
        Ok(product)
    }

    /// Replace completo. Id desconhecido não é erro, só não muda nada.
    pub async fn update(&self, id: Uuid, payload: &ProductPayload) -> Result<(), AppError> {
        let affected = self
            .product_repo
            .update(&self.pool, id, payload)
            .await
            .map_err(|e| e.logged("atualizar produto"))?;

        if affected == 0 {
            tracing::info!("Atualização de produto não encontrou linha: {}", id);
        } else {
            tracing::info!("Produto atualizado: {}", id);
        }
        Ok(())
    }

    /// Apaga o produto seguindo a política de vínculos configurada.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.delete_with_links(id)
            .await
            .map_err(|e| e.logged("apagar produto"))
    }

    async fn delete_with_links(&self, id: Uuid) -> Result<(), AppError> {
        // 1. Inicia a transação já com o lock de escrita
        let mut tx = db_utils::begin_write(&self.pool).await?;

        // 2. Vínculos: remove junto (cascade) ou recusa (restrict)

        match self.delete_policy {
            LinkDeletePolicy::Cascade => {
                let removed = self.link_repo.delete_for_product(&mut *tx, id).await?;
                if removed > 0 {
                    tracing::info!("{} vínculo(s) do produto {} removido(s)", removed, id);
                }
            }
            LinkDeletePolicy::Restrict => {
                let links = self.link_repo.count_for_product(&mut *tx, id).await?;
                if links > 0 {
                    return Err(AppError::StillLinked {
                        entity: "Produto",
                        id,
                        links,
                    });
                }
            }
        }

        // 3. Apaga o produto e confirma
        self.product_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("Produto apagado: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::db_utils::test_pool,
        config::{AppState, Config},
        models::vending::VendingMachinePayload,
    };

    async fn state(policy: LinkDeletePolicy) -> AppState {
        let config = Config {
            link_delete_policy: policy,
            ..Config::default()
        };
        AppState::from_pool(test_pool().await, &config)
    }

    fn product_payload(name: &str) -> ProductPayload {
        ProductPayload {
            name: name.to_string(),
            description: String::new(),
            price: 0.0,
            size: 0,
            temperature: "frozen".into(),
        }
    }

    async fn linked_pair(state: &AppState) -> (Uuid, Uuid) {
        let machine = state
            .vending_machine_service
            .create(&VendingMachinePayload {
                name: "Office".into(),
                lat: 10.0,
                lng: 10.0,
                has_bin: None,
            })
            .await
            .unwrap();
        let product = state
            .product_service
            .create(&product_payload("Ice Cream"))
            .await
            .unwrap();
        state.link_service.add_link(machine.id, product.id).await.unwrap();
        (machine.id, product.id)
    }

    #[tokio::test]
    async fn get_by_id_of_unknown_product_is_not_found() {
        let state = state(LinkDeletePolicy::Cascade).await;
        let result = state.product_service.get_by_id(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn search_for_cola_skips_water() {
        let state = state(LinkDeletePolicy::Cascade).await;
        let service = &state.product_service;
        let cola = service.create(&product_payload("Coca Cola")).await.unwrap();
        service.create(&product_payload("Water")).await.unwrap();

        let names: Vec<String> = service
            .search("cola")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec![cola.name]);
    }

    #[tokio::test]
    async fn cascade_delete_removes_links_but_keeps_machine() {
        let state = state(LinkDeletePolicy::Cascade).await;
        let (machine_id, product_id) = linked_pair(&state).await;

        state.product_service.delete(product_id).await.unwrap();

        assert!(
            state
                .product_service
                .list_by_vending_machine(machine_id)
                .await
                .unwrap()
                .is_empty()
        );
        state.vending_machine_service.get_by_id(machine_id).await.unwrap();
    }

    #[tokio::test]
    async fn restrict_delete_keeps_linked_product() {
        let state = state(LinkDeletePolicy::Restrict).await;
        let (machine_id, product_id) = linked_pair(&state).await;

        let result = state.product_service.delete(product_id).await;
        assert!(matches!(result, Err(AppError::StillLinked { entity: "Produto", .. })));

        let stocked = state
            .product_service
            .list_by_vending_machine(machine_id)
            .await
            .unwrap();
        assert_eq!(stocked.len(), 1);
        assert_eq!(stocked[0].id, product_id);
    }
}

// src/services/link_service.rs

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::{db_utils, error::AppError},
    db::{LinkRepository, ProductRepository, VendingMachineRepository},
    models::vending::VendingItemLink,
};

/// Cuida do vínculo máquina <-> produto e do `updated_at` da máquina que
/// acompanha cada mudança.
#[derive(Clone)]
pub struct LinkService {
    link_repo: LinkRepository,
    machine_repo: VendingMachineRepository,
    product_repo: ProductRepository,
    pool: SqlitePool,
    touch_on_unlink: bool,
}

impl LinkService {
    pub fn new(
        link_repo: LinkRepository,
        machine_repo: VendingMachineRepository,
        product_repo: ProductRepository,
        pool: SqlitePool,
        touch_on_unlink: bool,
    ) -> Self {
        Self {
            link_repo,
            machine_repo,
            product_repo,
            pool,
            touch_on_unlink,
        }
    }

    pub async fn links_for_machine(
        &self,
        vending_machine_id: Uuid,
    ) -> Result<Vec<VendingItemLink>, AppError> {
        self.link_repo
            .find_for_machine(vending_machine_id)
            .await
            .map_err(|e| e.logged("buscar vínculos da máquina"))
    }

    /// Coloca `product_id` na máquina `vending_machine_id` e atualiza o
    /// `updated_at` dela, tudo numa transação. Vincular o mesmo par duas vezes
    /// cria uma segunda linha.
    pub async fn add_link(
        &self,
        vending_machine_id: Uuid,
        product_id: Uuid,
    ) -> Result<VendingItemLink, AppError> {
        let link = self
            .add_link_tx(vending_machine_id, product_id)
            .await
            .map_err(|e| e.logged("adicionar produto à máquina"))?;

        tracing::info!(
            "Produto {} adicionado à máquina {}",
            product_id,
            vending_machine_id
        );
        Ok(link)
    }

    async fn add_link_tx(
        &self,
        vending_machine_id: Uuid,
        product_id: Uuid,
    ) -> Result<VendingItemLink, AppError> {
        // 1. Transação de escrita. Começa com o lock já pego para que duas
        //    requisições simultâneas não tropecem uma na outra.
        let mut tx = db_utils::begin_write(&self.pool).await?;

        // 2. Os dois lados precisam existir
        if self
            .machine_repo
            .find_by_id(&mut *tx, vending_machine_id)
            .await?
            .is_none()
        {
            return Err(AppError::VendingMachineNotFound(vending_machine_id));
        }
        if self
            .product_repo
            .find_by_id(&mut *tx, product_id)
            .await?
            .is_none()
        {
            return Err(AppError::ProductNotFound(product_id));
        }

        // 3. Cria o vínculo e "toca" a máquina
        let link = self
            .link_repo
            .create(&mut *tx, vending_machine_id, product_id)
            .await?;
        self.machine_repo.touch(&mut *tx, vending_machine_id).await?;

        tx.commit().await?;
        Ok(link)
    }

    /// Remove todos os vínculos do par e devolve quantas linhas saíram (zero
    /// não é erro). A máquina só é tocada com `touch_on_unlink` ligado e se
    /// algo foi removido.
    pub async fn remove_link(
        &self,
        vending_machine_id: Uuid,
        product_id: Uuid,
    ) -> Result<u64, AppError> {
        let removed = self
            .remove_link_tx(vending_machine_id, product_id)
            .await
            .map_err(|e| e.logged("remover produto da máquina"))?;

        tracing::info!(
            "{} vínculo(s) do produto {} removido(s) da máquina {}",
            removed,
            product_id,
            vending_machine_id
        );
        Ok(removed)
    }

    async fn remove_link_tx(&self, vending_machine_id: Uuid, product_id: Uuid) -> Result<u64, AppError> {
        if !self.touch_on_unlink {
            return self
                .link_repo
                .delete_pair(&self.pool, vending_machine_id, product_id)
                .await;
        }

        let mut tx = db_utils::begin_write(&self.pool).await?;
        let removed = self
            .link_repo
            .delete_pair(&mut *tx, vending_machine_id, product_id)
            .await?;
        if removed > 0 {
            self.machine_repo.touch(&mut *tx, vending_machine_id).await?;
        }
        tx.commit().await?;
        Ok(removed)
    }
}

// src/services/vending_machine_service.rs

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::{db_utils, error::AppError},
    config::LinkDeletePolicy,
    db::{LinkRepository, VendingMachineRepository},
    models::vending::{BoundingBox, VendingMachine, VendingMachinePayload},
};

#[derive(Clone)]
pub struct VendingMachineService {
    machine_repo: VendingMachineRepository,
    link_repo: LinkRepository,
    pool: SqlitePool,
    delete_policy: LinkDeletePolicy,
}

impl VendingMachineService {
    pub fn new(
        machine_repo: VendingMachineRepository,
        link_repo: LinkRepository,
        pool: SqlitePool,
        delete_policy: LinkDeletePolicy,
    ) -> Self {
        Self {
            machine_repo,
            link_repo,
            pool,
            delete_policy,
        }
    }

    pub async fn get_all(&self) -> Result<Vec<VendingMachine>, AppError> {
        self.machine_repo
            .get_all()
            .await
            .map_err(|e| e.logged("buscar máquinas"))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<VendingMachine, AppError> {
        self.machine_repo
            .find_by_id(&self.pool, id)
            .await
            .and_then(|machine| machine.ok_or(AppError::VendingMachineNotFound(id)))
            .map_err(|e| e.logged("buscar máquina por id"))
    }

    pub async fn find_in_bounding_box(
        &self,
        bbox: BoundingBox,
    ) -> Result<Vec<VendingMachine>, AppError> {
        self.machine_repo
            .find_in_bounding_box(bbox)
            .await
            .map_err(|e| e.logged("buscar máquinas da região"))
    }

    /// Máquinas que vendem `product_id`. Produto desconhecido devolve lista vazia.
    pub async fn find_by_product(&self, product_id: Uuid) -> Result<Vec<VendingMachine>, AppError> {
        self.machine_repo
            .find_by_product(product_id)
            .await
            .map_err(|e| e.logged("buscar máquinas por produto"))
    }

    pub async fn create(&self, payload: &VendingMachinePayload) -> Result<VendingMachine, AppError> {
        let machine = self
            .machine_repo
            .create(&self.pool, payload)
            .await
            .map_err(|e| e.logged("criar máquina"))?;

        tracing::info!("Máquina criada: {}", machine.id);
        Ok(machine)
    }

    // Replace completo. Id desconhecido não é erro (igual ao serviço antigo).
    pub async fn update(&self, id: Uuid, payload: &VendingMachinePayload) -> Result<(), AppError> {
        let affected = self
            .machine_repo
            .update(&self.pool, id, payload)
            .await
            .map_err(|e| e.logged("atualizar máquina"))?;

        if affected == 0 {
            tracing::info!("Atualização de máquina não encontrou linha: {}", id);
        } else {
            tracing::info!("Máquina atualizada: {}", id);
        }
        Ok(())
    }

    /// Apaga a máquina seguindo a política de vínculos configurada.
    ///
    /// - `Cascade`: os vínculos da máquina vão embora na mesma transação.
    /// - `Restrict`: se ainda houver vínculos, devolve `StillLinked` e não
    ///   apaga nada.
    ///
    /// Id desconhecido não é erro.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.delete_with_links(id)
            .await
            .map_err(|e| e.logged("apagar máquina"))
    }

    async fn delete_with_links(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = db_utils::begin_write(&self.pool).await?;

        match self.delete_policy {
            LinkDeletePolicy::Cascade => {
                let removed = self.link_repo.delete_for_machine(&mut *tx, id).await?;
                if removed > 0 {
                    tracing::info!("{} vínculo(s) da máquina {} removido(s)", removed, id);
                }
            }
            LinkDeletePolicy::Restrict => {
                let links = self.link_repo.count_for_machine(&mut *tx, id).await?;
                if links > 0 {
                    // O drop do `tx` faz o rollback.
                    return Err(AppError::StillLinked {
                        entity: "Máquina de venda",
                        id,
                        links,
                    });
                }
            }
        }

        self.machine_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("Máquina apagada: {}", id);
        Ok(())
    }
}

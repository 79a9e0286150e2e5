// src/db/vending_machine_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::vending::{BoundingBox, VendingMachine, VendingMachinePayload},
};

#[derive(Clone)]
pub struct VendingMachineRepository {
    pool: SqlitePool,
}

impl VendingMachineRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras
    // ---
    // As listagens são uma única query, então rodam direto no pool.

    pub async fn get_all(&self) -> Result<Vec<VendingMachine>, AppError> {
        let machines = sqlx::query_as::<_, VendingMachine>("SELECT * FROM vending_machines")
            .fetch_all(&self.pool)
            .await?;
        Ok(machines)
    }

    /// Máquinas dentro da caixa (limites inclusivos). Limites invertidos não são trocados.
    pub async fn find_in_bounding_box(
        &self,
        bbox: BoundingBox,
    ) -> Result<Vec<VendingMachine>, AppError> {
        let machines = sqlx::query_as::<_, VendingMachine>(
            "SELECT * FROM vending_machines WHERE lat BETWEEN ? AND ? AND lng BETWEEN ? AND ?",
        )
        .bind(bbox.lat1)
        .bind(bbox.lat2)
        .bind(bbox.lng1)
        .bind(bbox.lng2)
        .fetch_all(&self.pool)
        .await?;
        Ok(machines)
    }

    /// Máquinas que vendem o produto, via tabela de vínculos.
    pub async fn find_by_product(&self, product_id: Uuid) -> Result<Vec<VendingMachine>, AppError> {
        let machines = sqlx::query_as::<_, VendingMachine>(
            r#"
            SELECT * FROM vending_machines
            WHERE id IN (SELECT vending_machine_id FROM vending_item_link WHERE product_id = ?)
            "#,
        )
        .bind(product_id.hyphenated())
        .fetch_all(&self.pool)
        .await?;
        Ok(machines)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<VendingMachine>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let machine =
            sqlx::query_as::<_, VendingMachine>("SELECT * FROM vending_machines WHERE id = ?")
                .bind(id.hyphenated())
                .fetch_optional(executor)
                .await?;
        Ok(machine)
    }

    // ---
    // Escritas
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &VendingMachinePayload,
    ) -> Result<VendingMachine, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let machine = sqlx::query_as::<_, VendingMachine>(
            r#"
            INSERT INTO vending_machines (id, name, lat, lng, "hasBin", created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().hyphenated())
        .bind(&payload.name)
        .bind(payload.lat)
        .bind(payload.lng)
        .bind(payload.has_bin)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(machine)
    }

    /// Substitui todos os campos. Retorna quantas linhas casaram (0 ou 1).
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &VendingMachinePayload,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE vending_machines
            SET name = ?, lat = ?, lng = ?, "hasBin" = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&payload.name)
        .bind(payload.lat)
        .bind(payload.lng)
        .bind(payload.has_bin)
        .bind(Utc::now())
        .bind(id.hyphenated())
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Atualiza só o `updated_at`.
    pub async fn touch<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE vending_machines SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id.hyphenated())
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM vending_machines WHERE id = ?")
            .bind(id.hyphenated())
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::db_utils::test_pool;

    fn payload(name: &str, lat: f64, lng: f64) -> VendingMachinePayload {
        VendingMachinePayload {
            name: name.to_string(),
            lat,
            lng,
            has_bin: Some(true),
        }
    }

    #[tokio::test]
    async fn create_then_find_returns_same_fields() {
        let pool = test_pool().await;
        let repo = VendingMachineRepository::new(pool.clone());

        let created = repo.create(&pool, &payload("Lobby", 12.5, 13.5)).await.unwrap();
        let found = repo.find_by_id(&pool, created.id).await.unwrap().unwrap();

        assert_eq!(found, created);
        assert_eq!(found.name, "Lobby");
        assert_eq!(found.lat, 12.5);
        assert_eq!(found.lng, 13.5);
        assert_eq!(found.has_bin, Some(true));
        assert_eq!(found.created_at, found.updated_at);
    }

    #[tokio::test]
    async fn find_by_id_of_unknown_machine_is_none() {
        let pool = test_pool().await;
        let repo = VendingMachineRepository::new(pool.clone());

        assert!(repo.find_by_id(&pool, Uuid::new_v4()).await.unwrap().is_none());
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bounding_box_is_inclusive_and_not_normalized() {
        let pool = test_pool().await;
        let repo = VendingMachineRepository::new(pool.clone());

        let inside = repo.create(&pool, &payload("inside", 15.0, 15.0)).await.unwrap();
        let edge = repo.create(&pool, &payload("edge", 10.0, 20.0)).await.unwrap();
        repo.create(&pool, &payload("outside", 15.0, 25.0)).await.unwrap();

        let mut ids: Vec<Uuid> = repo
            .find_in_bounding_box(BoundingBox { lat1: 10.0, lng1: 10.0, lat2: 20.0, lng2: 20.0 })
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        ids.sort();
        let mut expected = vec![inside.id, edge.id];
        expected.sort();
        assert_eq!(ids, expected);

        let reversed = repo
            .find_in_bounding_box(BoundingBox { lat1: 20.0, lng1: 10.0, lat2: 10.0, lng2: 20.0 })
            .await
            .unwrap();
        assert!(reversed.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields_and_refreshes_timestamp() {
        let pool = test_pool().await;
        let repo = VendingMachineRepository::new(pool.clone());
        let created = repo.create(&pool, &payload("Old", 1.0, 2.0)).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let new_fields = VendingMachinePayload {
            name: "New".into(),
            lat: 3.0,
            lng: 4.0,
            has_bin: None,
        };
        assert_eq!(repo.update(&pool, created.id, &new_fields).await.unwrap(), 1);

        let updated = repo.find_by_id(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "New");
        assert_eq!((updated.lat, updated.lng), (3.0, 4.0));
        assert_eq!(updated.has_bin, None);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_and_delete_of_unknown_id_match_zero_rows() {
        let pool = test_pool().await;
        let repo = VendingMachineRepository::new(pool.clone());
        let id = Uuid::new_v4();

        assert_eq!(repo.update(&pool, id, &payload("x", 0.0, 0.0)).await.unwrap(), 0);
        assert_eq!(repo.touch(&pool, id).await.unwrap(), 0);
        assert_eq!(repo.delete(&pool, id).await.unwrap(), 0);
    }
}

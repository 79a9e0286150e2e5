// src/db/link_repo.rs

use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{common::error::AppError, models::vending::VendingItemLink};

// Linhas de `vending_item_link`. Nada aqui mexe nas tabelas pai: timestamps
// e checagem de existência ficam no `LinkService`.
#[derive(Clone)]
pub struct LinkRepository {
    pool: SqlitePool,
}

impl LinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_for_machine(
        &self,
        vending_machine_id: Uuid,
    ) -> Result<Vec<VendingItemLink>, AppError> {
        let links = sqlx::query_as::<_, VendingItemLink>(
            "SELECT * FROM vending_item_link WHERE vending_machine_id = ?",
        )
        .bind(vending_machine_id.hyphenated())
        .fetch_all(&self.pool)
        .await?;
        Ok(links)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        vending_machine_id: Uuid,
        product_id: Uuid,
    ) -> Result<VendingItemLink, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let link = sqlx::query_as::<_, VendingItemLink>(
            r#"
            INSERT INTO vending_item_link (id, vending_machine_id, product_id)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().hyphenated())
        .bind(vending_machine_id.hyphenated())
        .bind(product_id.hyphenated())
        .fetch_one(executor)
        .await?;
        Ok(link)
    }

    /// Apaga todas as linhas do par, inclusive as duplicadas.
    pub async fn delete_pair<'e, E>(
        &self,
        executor: E,
        vending_machine_id: Uuid,
        product_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "DELETE FROM vending_item_link WHERE vending_machine_id = ? AND product_id = ?",
        )
        .bind(vending_machine_id.hyphenated())
        .bind(product_id.hyphenated())
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_for_machine<'e, E>(
        &self,
        executor: E,
        vending_machine_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM vending_item_link WHERE vending_machine_id = ?")
            .bind(vending_machine_id.hyphenated())
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_for_product<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM vending_item_link WHERE product_id = ?")
            .bind(product_id.hyphenated())
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_for_machine<'e, E>(
        &self,
        executor: E,
        vending_machine_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count: i64 =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vending_item_link WHERE vending_machine_id = ?")
                .bind(vending_machine_id.hyphenated())
                .fetch_one(executor)
                .await?;
        Ok(count)
    }

    pub async fn count_for_product<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count: i64 =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vending_item_link WHERE product_id = ?")
                .bind(product_id.hyphenated())
                .fetch_one(executor)
                .await?;
        Ok(count)
    }
}

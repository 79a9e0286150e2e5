// src/db/product_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::vending::{Product, ProductPayload},
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras
    // ---

    pub async fn get_all(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products")
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Busca por `LIKE '%termo%'` no nome. O LIKE do SQLite ignora maiúsculas
    /// (só ASCII) e `%`/`_` dentro do termo continuam valendo como curinga.
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE name LIKE ?")
            .bind(format!("%{term}%"))
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    // Produtos da máquina, via tabela de vínculos.
    pub async fn find_by_vending_machine(
        &self,
        vending_machine_id: Uuid,
    ) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE id IN (SELECT product_id FROM vending_item_link WHERE vending_machine_id = ?)
            "#,
        )
        .bind(vending_machine_id.hyphenated())
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id.hyphenated())
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    // ---
    // Escritas
    // ---

    pub async fn create<'e, E>(&self, executor: E, payload: &ProductPayload) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, name, description, price, size, temperature, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().hyphenated())
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(payload.size)
        .bind(&payload.temperature)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    /// Substitui todos os campos. Retorna quantas linhas casaram (0 ou 1).
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ProductPayload,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?, description = ?, price = ?, size = ?, temperature = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(payload.size)
        .bind(&payload.temperature)
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
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.hyphenated())
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

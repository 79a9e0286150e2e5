use std::{str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Sqlite, SqlitePool, Transaction,
};
use uuid::Uuid;

use crate::config::Config;

// ---
// Pool + schema
// ---

/// Abre o pool de conexões.
///
/// O driver liga `foreign_keys` em toda conexão (a tabela de vínculos depende
/// disso). Com WAL os leitores não bloqueiam o escritor, e o `busy_timeout`
/// faz uma escrita concorrente esperar pelo lock em vez de falhar na hora
/// com "database is locked".
pub(crate) async fn connect_pool(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
}

/// Abre uma transação de escrita (`BEGIN IMMEDIATE`).
///
/// Uma transação `DEFERRED` que lê antes de escrever não consegue promover o
/// lock de leitura quando outra escrita chega primeiro, e o SQLite devolve
/// SQLITE_BUSY sem esperar. Pegando o lock de escrita logo no início, a
/// concorrência fica por conta do `busy_timeout`.
pub(crate) async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Aplica as migrações embutidas em `migrations/`.
pub(crate) async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}

/// Deixa o banco pronto para uso: migrações e, em seguida, o ajuste de um
/// `db.sqlite3` criado pelo serviço antigo.
pub(crate) async fn prepare_database(pool: &SqlitePool) -> anyhow::Result<()> {
    run_migrations(pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    upgrade_legacy_schema(pool)
        .await
        .context("Falha ao atualizar o esquema legado")?;

    Ok(())
}

// ---
// Esquema legado
// ---
// O serviço antigo criava as tabelas sem `"hasBin"` em `vending_machines` e
// sem `created_at`/`updated_at` em `products`. Como a migração usa
// `CREATE TABLE IF NOT EXISTS`, essas tabelas continuam como estavam, então as
// colunas que faltam são adicionadas aqui.

const LEGACY_COLUMNS: &[(&str, &str, &str)] = &[
    ("vending_machines", "hasBin", "BOOLEAN"),
    ("products", "created_at", "TEXT"),
    ("products", "updated_at", "TEXT"),
];

async fn column_names(pool: &SqlitePool, table: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?)")
        .bind(table)
        .fetch_all(pool)
        .await
}

/// Adiciona as colunas que faltam e dá um id aos vínculos que o serviço
/// antigo gravou sem id. Em um banco criado pelas migrações não faz nada.
pub(crate) async fn upgrade_legacy_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for (table, column, sql_type) in LEGACY_COLUMNS {
        let columns = column_names(pool, table).await?;
        if columns.iter().any(|c| c == column) {
            continue;
        }

        // Nomes vêm da constante acima, nunca de entrada externa.
        let statement = format!(r#"ALTER TABLE {table} ADD COLUMN "{column}" {sql_type}"#);
        sqlx::query(&statement).execute(pool).await?;
        tracing::info!("Esquema legado: coluna {}.{} adicionada", table, column);
    }

    let orphans = sqlx::query_scalar::<_, i64>("SELECT rowid FROM vending_item_link WHERE id IS NULL")
        .fetch_all(pool)
        .await?;
    for rowid in &orphans {
        sqlx::query("UPDATE vending_item_link SET id = ? WHERE rowid = ?")
            .bind(Uuid::new_v4().hyphenated())
            .bind(*rowid)
            .execute(pool)
            .await?;
    }
    if !orphans.is_empty() {
        tracing::info!("Esquema legado: {} vínculo(s) sem id receberam um id", orphans.len());
    }

    Ok(())
}

/// Banco em memória para os testes. Uma única conexão que nunca é reciclada,
/// senão o banco some junto com ela.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await
        .unwrap();

    prepare_database(&pool).await.unwrap();
    pool
}

/// Banco em arquivo temporário, para testes que precisam de várias conexões.
/// O arquivo (e os `-wal`/`-shm`) é apagado no `Drop`.
#[cfg(test)]
pub(crate) struct TempDatabase {
    pub path: std::path::PathBuf,
}

#[cfg(test)]
impl TempDatabase {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("vending-test-{}.sqlite3", Uuid::new_v4()));
        Self { path }
    }

    pub fn config(&self) -> Config {
        Config {
            database_url: format!("sqlite://{}", self.path.display()),
            ..Config::default()
        }
    }
}

#[cfg(test)]
impl Drop for TempDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppState, models::vending::VendingItemLink};

    // Exatamente as tabelas que o serviço antigo criava no primeiro boot.
    const LEGACY_BOOTSTRAP: &[&str] = &[
        r#"CREATE TABLE IF NOT EXISTS vending_machines (
            id uuid primary key, name text, lat real, lng real,
            created_at text, updated_at text)"#,
        r#"CREATE TABLE IF NOT EXISTS products (
            id uuid primary key, name text, description text,
            price real, size number, temperature text)"#,
        r#"CREATE TABLE IF NOT EXISTS vending_item_link (
            id uuid primary key,
            vending_machine_id uuid references vending_machines(id),
            product_id uuid references products(id))"#,
    ];

    async fn legacy_pool(db: &TempDatabase) -> SqlitePool {
        let pool = connect_pool(&db.config()).await.unwrap();
        for statement in LEGACY_BOOTSTRAP {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }

        let machine_id = Uuid::new_v4().to_string();
        let product_id = Uuid::new_v4().to_string();
        // Linhas como o serviço antigo gravava: timestamp do Python, produto
        // sem `size` e vínculo sem id.
        sqlx::query(
            "INSERT INTO vending_machines (id, name, lat, lng, created_at, updated_at) \
             VALUES (?, 'Portaria', 15.0, 15.0, '2024-03-01 10:20:30.123456', '2024-03-01 10:20:30.123456')",
        )
        .bind(&machine_id)
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO products (id, name, description, price, temperature) \
             VALUES (?, 'Coca Cola', 'Lata', 1.5, 'gelado')",
        )
        .bind(&product_id)
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO vending_item_link (vending_machine_id, product_id) VALUES (?, ?)")
            .bind(&machine_id)
            .bind(&product_id)
            .execute(&pool)
            .await
            .unwrap();

        pool
    }

    #[tokio::test]
    async fn legacy_database_is_upgraded_and_readable() {
        let db = TempDatabase::new();
        let pool = legacy_pool(&db).await;

        prepare_database(&pool).await.unwrap();
        // Rodar de novo não pode falhar nem duplicar colunas.
        prepare_database(&pool).await.unwrap();

        let state = AppState::from_pool(pool.clone(), &Config::default());

        let products = state.product_service.get_all().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].size, None);
        assert_eq!(products[0].created_at, None);

        let machines = state.vending_machine_service.get_all().await.unwrap();
        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0].has_bin, None);

        let links: Vec<VendingItemLink> = state
            .link_service
            .links_for_machine(machines[0].id)
            .await
            .unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].product_id, products[0].id);

        let listed = state
            .product_service
            .list_by_vending_machine(machines[0].id)
            .await
            .unwrap();
        assert_eq!(listed, products);
    }

    #[tokio::test]
    async fn legacy_database_accepts_writes_after_upgrade() {
        use crate::models::vending::{ProductPayload, VendingMachinePayload};

        let db = TempDatabase::new();
        let pool = legacy_pool(&db).await;
        prepare_database(&pool).await.unwrap();
        let state = AppState::from_pool(pool, &Config::default());

        let machine = state
            .vending_machine_service
            .create(&VendingMachinePayload {
                name: "Recepção".into(),
                lat: 1.0,
                lng: 1.0,
                has_bin: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(machine.has_bin, Some(true));

        let product = state
            .product_service
            .create(&ProductPayload {
                name: "Água".into(),
                description: "Garrafa".into(),
                price: 1.0,
                size: 500,
                temperature: "ambiente".into(),
            })
            .await
            .unwrap();
        assert_eq!(product.size, Some(500));
        assert!(product.created_at.is_some());

        state.link_service.add_link(machine.id, product.id).await.unwrap();
    }

    #[tokio::test]
    async fn fresh_database_is_left_alone() {
        let pool = test_pool().await;
        for (table, column, _) in LEGACY_COLUMNS {
            let columns = column_names(&pool, table).await.unwrap();
            assert_eq!(columns.iter().filter(|c| c == column).count(), 1);
        }
    }

    #[tokio::test]
    async fn file_pool_uses_wal() {
        let db = TempDatabase::new();
        let pool = connect_pool(&db.config()).await.unwrap();

        let mode = sqlx::query_scalar::<_, String>("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}

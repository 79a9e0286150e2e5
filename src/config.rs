// src/config.rs

use std::{env, str::FromStr};

use anyhow::{anyhow, Context};
use sqlx::SqlitePool;

use crate::{
    common::db_utils,
    db::{LinkRepository, ProductRepository, VendingMachineRepository},
    services::{LinkService, ProductService, VendingMachineService},
};

// Mesmo arquivo do serviço antigo. Um `db.sqlite3` legado é atualizado no boot.
const DEFAULT_DATABASE_URL: &str = "sqlite://db.sqlite3?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// O que acontece com os vínculos quando uma máquina ou produto é apagado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkDeletePolicy {
    /// Apaga os vínculos junto.
    #[default]
    Cascade,
    /// Recusa apagar enquanto houver vínculos.
    Restrict,
}

impl FromStr for LinkDeletePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cascade" => Ok(Self::Cascade),
            "restrict" => Ok(Self::Restrict),
            other => Err(anyhow!("política de delete de vínculos desconhecida '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub link_delete_policy: LinkDeletePolicy,
    /// Atualiza o `updated_at` da máquina também ao remover vínculos, não só ao adicionar.
    pub touch_on_unlink: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            link_delete_policy: LinkDeletePolicy::default(),
            touch_on_unlink: false,
        }
    }
}

impl Config {
    /// Carrega o `.env` (se existir) e lê as variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado do `from_env` para os testes não dependerem do ambiente do processo.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido '{v}'"))?,
            None => defaults.max_connections,
        };
        let link_delete_policy = match lookup("LINK_DELETE_POLICY") {
            Some(v) => v.parse()?,
            None => defaults.link_delete_policy,
        };
        let touch_on_unlink = match lookup("TOUCH_ON_UNLINK") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("TOUCH_ON_UNLINK inválido '{v}'"))?,
            None => defaults.touch_on_unlink,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections,
            link_delete_policy,
            touch_on_unlink,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub vending_machine_service: VendingMachineService,
    pub product_service: ProductService,
    pub link_service: LinkService,
}

impl AppState {
    /// Conecta, prepara o banco e monta os serviços.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = db_utils::connect_pool(config)
            .await
            .with_context(|| format!("Falha ao conectar em {}", config.database_url))?;
        tracing::info!("✅ Conexão com o banco de dados estabelecida");

        db_utils::prepare_database(&db_pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    pub fn from_pool(db_pool: SqlitePool, config: &Config) -> Self {
        // Repositórios -> serviços. Todos compartilham o mesmo pool.
        let machine_repo = VendingMachineRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let link_repo = LinkRepository::new(db_pool.clone());

        let vending_machine_service = VendingMachineService::new(
            machine_repo.clone(),
            link_repo.clone(),
            db_pool.clone(),
            config.link_delete_policy,
        );
        let product_service = ProductService::new(
            product_repo.clone(),
            link_repo.clone(),
            db_pool.clone(),
            config.link_delete_policy,
        );
        let link_service = LinkService::new(
            link_repo,
            machine_repo,
            product_repo,
            db_pool.clone(),
            config.touch_on_unlink,
        );

        Self {
            db_pool,
            vending_machine_service,
            product_service,
            link_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.link_delete_policy, LinkDeletePolicy::Cascade);
        assert!(!config.touch_on_unlink);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://other.db"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("LINK_DELETE_POLICY", "Restrict"),
            ("TOUCH_ON_UNLINK", "true"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite://other.db");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.link_delete_policy, LinkDeletePolicy::Restrict);
        assert!(config.touch_on_unlink);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup_from(&[("LINK_DELETE_POLICY", "orphan")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DB_MAX_CONNECTIONS", "many")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("TOUCH_ON_UNLINK", "yes")])).is_err());
    }
}

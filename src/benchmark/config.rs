//! Database connection configuration

use serde::{Deserialize, Serialize};

/// PostgreSQL connection parameters and pool size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Host (default: "localhost")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port (default: 5432)
    #[serde(default = "default_port")]
    pub port: u16,

    /// User (default: "postgres")
    #[serde(default = "default_user")]
    pub user: String,

    /// Password (default: "postgres")
    #[serde(default = "default_password")]
    pub password: String,

    /// Database name (default: "hw4_db")
    #[serde(default = "default_dbname")]
    pub dbname: String,

    /// Maximum pooled connections (default: 16)
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_password() -> String {
    "postgres".to_string()
}

fn default_dbname() -> String {
    "hw4_db".to_string()
}

fn default_pool_size() -> usize {
    16
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: default_password(),
            dbname: default_dbname(),
            pool_size: default_pool_size(),
        }
    }
}

impl DatabaseConfig {
    /// Check every field, returning the first problem found
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("database.host must not be empty".to_string());
        }
        if self.port == 0 {
            return Err("database.port must be > 0".to_string());
        }
        if self.user.is_empty() {
            return Err("database.user must not be empty".to_string());
        }
        if self.dbname.is_empty() {
            return Err("database.dbname must not be empty".to_string());
        }
        if self.pool_size == 0 {
            return Err("database.pool_size must be > 0".to_string());
        }
        Ok(())
    }

    /// Copy with the password replaced, for printing
    pub fn redacted(&self) -> Self {
        Self {
            password: "********".to_string(),
            ..self.clone()
        }
    }

    /// deadpool-postgres configuration for these parameters
    pub fn to_pool_config(&self) -> deadpool_postgres::Config {
        let mut cfg = deadpool_postgres::Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.dbname = Some(self.dbname.clone());
        cfg.application_name = Some(env!("CARGO_PKG_NAME").to_string());
        cfg.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(self.pool_size));
        cfg
    }
}

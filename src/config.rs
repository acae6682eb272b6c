use std::fmt::{Debug, Formatter};
use std::net::SocketAddr;

use crate::{AppError, Result};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Which database backs the service and how to reach it.
#[derive(Clone, PartialEq, Eq)]
pub enum DbConfig {
    Sqlite {
        fname: String,
    },
    Postgres {
        user: String,
        password: String,
        host: String,
        port: u16,
        name: String,
    },
}

impl DbConfig {
    pub fn url(&self) -> String {
        match self {
            DbConfig::Sqlite { fname } if fname == ":memory:" => String::from("sqlite::memory:"),
            DbConfig::Sqlite { fname } => format!("sqlite://{fname}?mode=rwc"),
            DbConfig::Postgres {
                user,
                password,
                host,
                port,
                name,
            } => format!("postgres://{user}:{password}@{host}:{port}/{name}"),
        }
    }
    pub fn is_sqlite(&self) -> bool {
        matches!(self, DbConfig::Sqlite { .. })
    }
}

impl Debug for DbConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DbConfig::Sqlite { fname } => f.debug_struct("Sqlite").field("fname", fname).finish(),
            DbConfig::Postgres {
                user,
                host,
                port,
                name,
                ..
            } => f
                .debug_struct("Postgres")
                .field("user", user)
                .field("password", &"***")
                .field("host", host)
                .field("port", port)
                .field("name", name)
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub max_connections: u32,
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let db = match var("DB_DRIVER", "sqlite").as_str() {
            "sqlite" => DbConfig::Sqlite {
                fname: var("DB_FNAME", "default.db"),
            },
            "postgres" | "postgresql" => {
                let raw_port = var("DB_PORT", "5432");
                let port = raw_port
                    .parse::<u16>()
                    .map_err(|e| AppError::Config(format!("DB_PORT '{raw_port}': {e}")))?;
                DbConfig::Postgres {
                    user: var("DB_USER", "alvin"),
                    password: var("DB_PASSWORD", "password"),
                    host: var("DB_HOST", "localhost"),
                    port,
                    name: var("DB_NAME", "finance"),
                }
            }
            other => return Err(AppError::Config(format!("unsupported DB_DRIVER '{other}'"))),
        };
        let raw_max = var("DB_MAX_CONNECTIONS", &DEFAULT_MAX_CONNECTIONS.to_string());
        let max_connections = raw_max
            .parse::<u32>()
            .map_err(|e| AppError::Config(format!("DB_MAX_CONNECTIONS '{raw_max}': {e}")))?;
        let raw_addr = var("LISTEN_ADDR", DEFAULT_LISTEN_ADDR);
        let listen_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("LISTEN_ADDR '{raw_addr}': {e}")))?;
        Ok(Self {
            db,
            max_connections,
            listen_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_sqlite_file() -> Result<()> {
        let config = Config::from_lookup(lookup(&[]))?;
        assert_eq!(
            config.db,
            DbConfig::Sqlite {
                fname: "default.db".to_string()
            }
        );
        assert_eq!(config.db.url(), "sqlite://default.db?mode=rwc");
        assert_eq!(config.listen_addr, "0.0.0.0:8000".parse()?);
        assert_eq!(config.max_connections, 5);
        Ok(())
    }
    #[test]
    fn test_postgres_from_env() -> Result<()> {
        let config = Config::from_lookup(lookup(&[
            ("DB_DRIVER", "postgres"),
            ("DB_USER", "fx"),
            ("DB_PASSWORD", "secret"),
            ("DB_HOST", "db"),
            ("DB_PORT", "6543"),
            ("DB_NAME", "ledger"),
        ]))?;
        assert_eq!(config.db.url(), "postgres://fx:secret@db:6543/ledger");
        assert!(!format!("{:?}", config.db).contains("secret"));
        Ok(())
    }
    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("DB_DRIVER", "oracle")])).is_err());
        assert!(
            Config::from_lookup(lookup(&[("DB_DRIVER", "postgres"), ("DB_PORT", "port")]))
                .is_err()
        );
        assert!(Config::from_lookup(lookup(&[("LISTEN_ADDR", "nowhere")])).is_err());
    }
}

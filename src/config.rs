// src/config.rs
use crate::error::AppError;
use log::warn;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_ADDR: &str = "127.0.0.1:3030";
const DEFAULT_SECRET: &str = "change-me-stock-desk-secret";
const DEFAULT_TOKEN_HOURS: i64 = 24;

#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_expiry_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from whatever `lookup` returns for each variable name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("STOCK_DESK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let addr = lookup("STOCK_DESK_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let bind_addr = addr
            .parse()
            .map_err(|_| AppError::Config(format!("STOCK_DESK_ADDR is not an address: {}", addr)))?;

        let jwt_secret = match lookup("STOCK_DESK_JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("STOCK_DESK_JWT_SECRET not set, using the built-in development secret");
                DEFAULT_SECRET.to_string()
            }
        };

        Ok(Self {
            data_dir,
            bind_addr,
            jwt_secret,
            token_expiry_hours: parse_or(
                "STOCK_DESK_TOKEN_HOURS",
                lookup("STOCK_DESK_TOKEN_HOURS"),
                DEFAULT_TOKEN_HOURS,
            ),
        })
    }

    /// Config rooted at `data_dir` with every other setting at its default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            jwt_secret: DEFAULT_SECRET.to_string(),
            token_expiry_hours: DEFAULT_TOKEN_HOURS,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".stock_desk")
}

fn parse_or<T: FromStr>(name: &str, value: Option<String>, default: T) -> T {
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}={:?}", name, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn lookup_reads_every_variable() {
        let config = Config::from_lookup(lookup_from(&[
            ("STOCK_DESK_DATA_DIR", "/var/lib/desk"),
            ("STOCK_DESK_ADDR", "0.0.0.0:8080"),
            ("STOCK_DESK_JWT_SECRET", "s3cret"),
            ("STOCK_DESK_TOKEN_HOURS", "2"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/desk"));
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_expiry_hours, 2);
    }

    #[test]
    fn empty_lookup_uses_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_ADDR);
        assert_eq!(config.jwt_secret, DEFAULT_SECRET);
        assert_eq!(config.token_expiry_hours, DEFAULT_TOKEN_HOURS);
        assert!(config.data_dir.ends_with(".stock_desk"));
    }

    #[test]
    fn bad_address_is_a_config_error() {
        let result = Config::from_lookup(lookup_from(&[("STOCK_DESK_ADDR", "not-an-addr")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn empty_secret_and_bad_hours_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("STOCK_DESK_JWT_SECRET", ""),
            ("STOCK_DESK_TOKEN_HOURS", "soon"),
        ]))
        .unwrap();
        assert_eq!(config.jwt_secret, DEFAULT_SECRET);
        assert_eq!(config.token_expiry_hours, DEFAULT_TOKEN_HOURS);
    }

    #[test]
    fn parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or("X", Some("12".into()), 24i64), 12);
        assert_eq!(parse_or("X", Some(" 6 ".into()), 24i64), 6);
        assert_eq!(parse_or("X", Some("soon".into()), 24i64), 24);
        assert_eq!(parse_or::<i64>("X", None, 24), 24);
    }

    #[test]
    fn with_data_dir_uses_defaults() {
        let config = Config::with_data_dir("/tmp/desk");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/desk"));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_ADDR);
        assert_eq!(config.token_expiry_hours, DEFAULT_TOKEN_HOURS);
    }
}

use crate::error::{ParseFlagSnafu, ParseNumberSnafu, RosterError, RosterResult};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::IntoError;
use sqlx::postgres::PgConnectOptions;
use std::{
    num::ParseIntError,
    str::{FromStr, ParseBoolError},
    sync::Arc,
    time::Duration,
};

const DEFAULT_SERVER_IP: &str = "127.0.0.1:8080";

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    server_ip: Arc<str>,
    secure_cookies: bool,
    seed_demo_student: bool,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        Self::from_lookup(|name| var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source, falling back to defaults for anything `lookup` doesn't know.
    pub fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> RosterResult<Self> {
        Ok(Self {
            db_config: Arc::new(DbConfig::from_lookup(&lookup)?),
            server_ip: lookup("ROSTER_SERVER_IP")
                .unwrap_or_else(|| DEFAULT_SERVER_IP.to_string())
                .into(),
            secure_cookies: parse_or("ROSTER_SECURE_COOKIES", &lookup, false, parse_flag)?,
            seed_demo_student: parse_or("ROSTER_SEED_DEMO", &lookup, false, parse_flag)?,
        })
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    pub const fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    pub const fn seed_demo_student(&self) -> bool {
        self.seed_demo_student
    }
}

#[derive(Debug)]
pub struct DbConfig {
    user: String,
    password: SecretString,
    host: String,
    port: u16,
    database: String,
    acquire_timeout: Duration,
}

impl DbConfig {
    fn from_lookup(lookup: &impl Fn(&'static str) -> Option<String>) -> RosterResult<Self> {
        let get_env_var = |name, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let parse_number = |source: ParseIntError, name: &'static str, original: String| {
            ParseNumberSnafu { name, original }.into_error(source)
        };

        Ok(Self {
            user: get_env_var("DB_USERNAME", "postgres"),
            password: SecretString::from(get_env_var("DB_PASSWORD", "postgres")),
            host: get_env_var("DB_HOST", "localhost"),
            port: parse_or("DB_PORT", lookup, 5432, parse_number)?,
            database: get_env_var("DB_NAME", "roster_db"),
            acquire_timeout: Duration::from_secs(parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                lookup,
                5,
                parse_number,
            )?),
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(&self.database)
    }

    pub const fn acquire_timeout(&self) -> Duration {
        self.acquire_timeout
    }
}

fn parse_flag(source: ParseBoolError, name: &'static str, original: String) -> RosterError {
    ParseFlagSnafu { name, original }.into_error(source)
}

fn parse_or<T: FromStr>(
    name: &'static str,
    lookup: &impl Fn(&'static str) -> Option<String>,
    default: T,
    to_error: impl Fn(T::Err, &'static str, String) -> RosterError,
) -> RosterResult<T> {
    match lookup(name) {
        None => Ok(default),
        Some(original) => match original.trim().parse() {
            Ok(value) => Ok(value),
            Err(source) => Err(to_error(source, name, original)),
        },
    }
}

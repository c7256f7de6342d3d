use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use strum::{Display, EnumString};

use crate::notes::IndexWriteMode;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    /// `fs` or `memory`
    pub const OBJECT_STORE: &str = "OBJECT_STORE";
    /// Directory used as the bucket when `OBJECT_STORE=fs`
    pub const BUCKET_DIR: &str = "NOTES_BUCKET_DIR";
    /// Identity used for requests that carry no `X-User-Id` header.
    /// Unset means such requests are rejected.
    pub const ACTING_USER: &str = "NOTES_ACTING_USER";
    /// Base URL of the change-event consumer. Unset means events are only logged.
    pub const EVENTS_URL: &str = "NOTES_EVENTS_URL";
    /// `per_user_lock` or `unguarded`
    pub const INDEX_WRITE_MODE: &str = "INDEX_WRITE_MODE";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const BUCKET_DIR: &str = "./.bucket";
}

/// Which object store backs the notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ObjectStoreKind {
    #[default]
    Fs,
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub object_store: ObjectStoreKind,
    pub bucket_dir: PathBuf,
    pub acting_user: Option<String>,
    pub events_url: Option<String>,
    pub index_write_mode: IndexWriteMode,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| var(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            port: var(env_vars::PORT)
                .unwrap_or_else(|| defaults::PORT.to_string())
                .parse()
                .expect("PORT must be a valid number"),
            object_store: parse_or_default(env_vars::OBJECT_STORE, var(env_vars::OBJECT_STORE)),
            bucket_dir: PathBuf::from(
                var(env_vars::BUCKET_DIR).unwrap_or_else(|| defaults::BUCKET_DIR.to_string()),
            ),
            acting_user: non_empty(env_vars::ACTING_USER),
            events_url: non_empty(env_vars::EVENTS_URL),
            index_write_mode: parse_or_default(
                env_vars::INDEX_WRITE_MODE,
                var(env_vars::INDEX_WRITE_MODE),
            ),
        }
    }
}

fn parse_or_default<T>(name: &str, value: Option<String>) -> T
where
    T: FromStr + Default + std::fmt::Display,
{
    let Some(value) = value else {
        return T::default();
    };
    T::from_str(value.trim()).unwrap_or_else(|_| {
        let fallback = T::default();
        log::warn!("Unrecognized {}={:?}, using {}", name, value, fallback);
        fallback
    })
}

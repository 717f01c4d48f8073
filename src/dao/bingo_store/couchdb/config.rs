use std::env;

use reqwest::Url;

use super::error::{CouchDaoError, CouchResult};

const BASE_URL_VAR: &str = "COUCH_BASE_URL";
const DATABASE_VAR: &str = "COUCH_DB";
const USERNAME_VAR: &str = "COUCH_USERNAME";
const PASSWORD_VAR: &str = "COUCH_PASSWORD";
const DEFAULT_DATABASE: &str = "team_bingo";

/// Basic-auth pair sent with every request.
#[derive(Debug, Clone)]
pub struct CouchCredentials {
    /// CouchDB user.
    pub username: String,
    /// Password of [`Self::username`].
    pub password: String,
}

/// Where the bingo database lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Server root, e.g. `http://localhost:5984/`.
    pub base_url: Url,
    /// Database holding the missions, players and answers documents.
    pub database: String,
    /// Optional basic-auth credentials.
    pub credentials: Option<CouchCredentials>,
}

impl CouchConfig {
    /// Validate `base_url` and target `database`, without credentials.
    pub fn new(base_url: &str, database: impl Into<String>) -> CouchResult<Self> {
        let url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| CouchDaoError::InvalidBaseUrl {
                url: base_url.to_owned(),
            })?;

        Ok(Self {
            base_url: url,
            database: database.into(),
            credentials: None,
        })
    }

    /// Read `COUCH_BASE_URL` (required), `COUCH_DB` (defaults to `team_bingo`)
    /// and the optional `COUCH_USERNAME` / `COUCH_PASSWORD` pair.
    pub fn from_env() -> CouchResult<Self> {
        let base_url = env::var(BASE_URL_VAR)
            .map_err(|_| CouchDaoError::MissingEnvVar { var: BASE_URL_VAR })?;
        let database = env::var(DATABASE_VAR).unwrap_or_else(|_| DEFAULT_DATABASE.to_owned());

        let mut config = Self::new(&base_url, database)?;
        config.credentials = env::var(USERNAME_VAR)
            .ok()
            .zip(env::var(PASSWORD_VAR).ok())
            .map(|(username, password)| CouchCredentials { username, password });
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_must_address_documents() {
        assert!(CouchConfig::new("http://localhost:5984/", "bingo").is_ok());
        assert!(matches!(
            CouchConfig::new("mailto:admin@example.com", "bingo"),
            Err(CouchDaoError::InvalidBaseUrl { .. })
        ));
        assert!(CouchConfig::new("not a url", "bingo").is_err());
    }
}

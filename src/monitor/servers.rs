use crate::error::QueryError;
use crate::model::ServerRecord;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub trait ServerCatalog {
    fn lookup(&self, server_id: &str) -> Result<ServerRecord, QueryError>;
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(rename = "LogicalServers", default)]
    logical_servers: Vec<LogicalServer>,
}

#[derive(Deserialize)]
struct LogicalServer {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "EntryCountry", default)]
    entry_country: Option<String>,
    #[serde(rename = "City", default)]
    city: Option<String>,
}

/// `serverinfo.json` as cached by the CLI. Read fresh on every lookup.
pub struct JsonServerCatalog {
    path: PathBuf,
}

impl JsonServerCatalog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ServerCatalog for JsonServerCatalog {
    fn lookup(&self, server_id: &str) -> Result<ServerRecord, QueryError> {
        let bytes = fs::read(&self.path).map_err(|source| QueryError::Io {
            path: self.path.clone(),
            source,
        })?;
        let catalog: CatalogFile = serde_json::from_slice(&bytes)?;
        let server = catalog
            .logical_servers
            .into_iter()
            .find(|s| s.name == server_id)
            .ok_or_else(|| QueryError::UnknownServer(server_id.to_string()))?;

        let entry_country = server.entry_country.ok_or_else(|| QueryError::InvalidValue {
            key: "EntryCountry".to_string(),
            value: server_id.to_string(),
        })?;
        let city = server.city.ok_or_else(|| QueryError::InvalidValue {
            key: "City".to_string(),
            value: server_id.to_string(),
        })?;

        Ok(ServerRecord {
            server_id: server.name,
            entry_country,
            city,
        })
    }
}

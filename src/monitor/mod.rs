mod config_store;
mod probe;
mod servers;
mod usage;

pub use config_store::{ConfigStore, IniConfigStore};
pub use probe::{ConnectivityProbe, ProcessProbe};
pub use servers::{JsonServerCatalog, ServerCatalog};
pub use usage::{InterfaceUsage, UsageSource};

use crate::error::QueryError;
use crate::model::*;
use std::path::Path;

/// Polls the external sources once per tick. Nothing is cached between
/// polls and a failing query only blanks its own field.
pub struct StatusCollector {
    config: Box<dyn ConfigStore>,
    catalog: Box<dyn ServerCatalog>,
    probe: Box<dyn ConnectivityProbe>,
    usage: Box<dyn UsageSource>,
    show_usage: bool,
}

impl StatusCollector {
    pub fn new(
        config: Box<dyn ConfigStore>,
        catalog: Box<dyn ServerCatalog>,
        probe: Box<dyn ConnectivityProbe>,
        usage: Box<dyn UsageSource>,
        show_usage: bool,
    ) -> Self {
        Self {
            config,
            catalog,
            probe,
            usage,
            show_usage,
        }
    }

    /// Sources backed by the CLI's files under `pvpn_dir`.
    pub fn for_cli_dir(pvpn_dir: &Path, show_usage: bool) -> Self {
        Self::new(
            Box::new(IniConfigStore::new(pvpn_dir.join("pvpn-cli.cfg"))),
            Box::new(JsonServerCatalog::new(pvpn_dir.join("serverinfo.json"))),
            Box::new(ProcessProbe::new()),
            Box::new(InterfaceUsage),
            show_usage,
        )
    }

    pub fn poll(&mut self) -> StatusSnapshot {
        let is_connected = degrade("connection", self.probe.is_connected()).unwrap_or(false);

        let server_id = degrade("connected server", self.config.get("metadata", "connected_server"));

        let connected_since = degrade(
            "connected time",
            self.config
                .get("metadata", "connected_time")
                .and_then(|raw| parse_epoch("connected_time", &raw)),
        );

        let server = server_id
            .as_deref()
            .and_then(|id| degrade("server location", self.catalog.lookup(id)));

        let kill_switch = degrade("kill switch", self.config.get("USER", "killswitch"));
        let dns_leak_protection = degrade(
            "dns leak protection",
            self.config.get("USER", "dns_leak_protection"),
        );

        let usage = self.show_usage.then(|| {
            degrade("usage", self.usage.counters()).unwrap_or_else(UsageCounters::unavailable)
        });

        StatusSnapshot {
            connection: ConnectionSnapshot { is_connected },
            server_id,
            connected_since,
            server,
            kill_switch,
            dns_leak_protection,
            usage,
        }
    }
}

fn parse_epoch(key: &str, raw: &str) -> Result<u64, QueryError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| QueryError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
}

fn degrade<T>(field: &str, result: Result<T, QueryError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_absence() => {
            tracing::debug!(field, error = %e, "value unavailable");
            None
        }
        Err(e) => {
            tracing::warn!(field, error = %e, "status query failed");
            None
        }
    }
}

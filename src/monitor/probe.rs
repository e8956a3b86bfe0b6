use crate::error::QueryError;
use std::ffi::OsStr;
use sysinfo::{ProcessesToUpdate, System};

const OPENVPN_PROCESS: &str = "openvpn";

pub trait ConnectivityProbe {
    fn is_connected(&mut self) -> Result<bool, QueryError>;
}

/// The CLI drives an `openvpn` child; the tunnel is up while it runs.
pub struct ProcessProbe {
    sys: System,
}

impl ProcessProbe {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl ConnectivityProbe for ProcessProbe {
    fn is_connected(&mut self) -> Result<bool, QueryError> {
        self.sys.refresh_processes(ProcessesToUpdate::All, true);
        if self.sys.processes().is_empty() {
            return Err(QueryError::Probe("process table is empty".to_string()));
        }
        Ok(self
            .sys
            .processes()
            .values()
            .any(|p| p.name() == OsStr::new(OPENVPN_PROCESS)))
    }
}

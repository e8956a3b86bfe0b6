use std::fmt;

pub const PLACEHOLDER: &str = "-";

pub const AUTH_GLYPH: &str = "🔐   ";
pub const NETWORK_GLYPH: &str = "🔗   ";

/// Everything the collector saw on one tick. Each field degrades
/// independently: `None` means the query failed and was logged.
#[derive(Clone, Debug, Default)]
pub struct StatusSnapshot {
    pub connection: ConnectionSnapshot,
    pub server_id: Option<String>,
    pub connected_since: Option<u64>,
    pub server: Option<ServerRecord>,
    pub kill_switch: Option<String>,
    pub dns_leak_protection: Option<String>,
    /// Only populated when usage display is enabled.
    pub usage: Option<UsageCounters>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    pub is_connected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerRecord {
    pub server_id: String,
    pub entry_country: String,
    pub city: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsageCounters {
    pub sent: String,
    pub received: String,
}

impl UsageCounters {
    pub fn unavailable() -> Self {
        Self {
            sent: PLACEHOLDER.to_string(),
            received: PLACEHOLDER.to_string(),
        }
    }
}

/// Sticky connection flags. `connection_error` mirrors the last probe;
/// the other two latch until the next disconnected -> connected edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub connection_error: bool,
    pub auth_error: bool,
    pub network_error: bool,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            connection_error: true,
            auth_error: false,
            network_error: false,
        }
    }
}

impl ConnectionStatus {
    pub fn state(&self) -> LinkState {
        if self.connection_error {
            LinkState::Error
        } else if self.auth_error || self.network_error {
            LinkState::Degraded
        } else {
            LinkState::Clean
        }
    }

    pub fn glyph(&self) -> &'static str {
        if self.auth_error {
            AUTH_GLYPH
        } else if self.network_error {
            NETWORK_GLYPH
        } else {
            ""
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Clean,
    Error,
    Degraded,
}

/// Colour of the tray icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indicator {
    Connected,
    Error,
}

/// Text slots read by the tray. Rewritten wholesale every tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuDisplayState {
    pub elapsed_time: String,
    pub location: String,
    pub kill_switch: String,
    pub dns_leak_protection: String,
    pub reconnect_label: String,
    pub usage_label: String,
    pub tray_label: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VpnAction {
    QuickConnect,
    Reconnect,
    Disconnect,
}

impl VpnAction {
    pub fn subcommand(&self) -> &'static str {
        match self {
            VpnAction::QuickConnect => "connect",
            VpnAction::Reconnect => "reconnect",
            VpnAction::Disconnect => "disconnect",
        }
    }

    pub fn args(&self) -> &'static [&'static str] {
        match self {
            VpnAction::QuickConnect => &["-f"],
            VpnAction::Reconnect | VpnAction::Disconnect => &[],
        }
    }
}

impl fmt::Display for VpnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VpnAction::QuickConnect => write!(f, "quick connect"),
            VpnAction::Reconnect => write!(f, "reconnect"),
            VpnAction::Disconnect => write!(f, "disconnect"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    Timeout,
    AuthFailure,
    NetworkFailure,
    NoPriorConnection,
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOutcome {
    pub action: VpnAction,
    pub kind: OutcomeKind,
    pub raw_output_sample: String,
}

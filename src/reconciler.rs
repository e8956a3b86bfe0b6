use crate::model::*;
use std::time::{SystemTime, UNIX_EPOCH};

/// Owns the sticky connection flags and derives the menu text from each
/// snapshot. The icon only changes on a connected/disconnected edge.
pub struct StateReconciler {
    status: ConnectionStatus,
    last_server_id: Option<String>,
}

impl StateReconciler {
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::default(),
            last_server_id: None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Returns the icon change this tick caused, if any.
    pub fn reconcile(
        &mut self,
        snapshot: &StatusSnapshot,
        now: SystemTime,
        display: &mut MenuDisplayState,
    ) -> Option<Indicator> {
        let change = self.detect_edge(snapshot.connection.is_connected);

        if let Some(id) = &snapshot.server_id {
            self.last_server_id = Some(id.clone());
        }

        let connected = !self.status.connection_error;
        let usage_label = snapshot
            .usage
            .as_ref()
            .map(|u| format!("{} 🠕🠗 {}", u.sent, u.received))
            .unwrap_or_default();

        *display = MenuDisplayState {
            elapsed_time: snapshot
                .connected_since
                .filter(|_| connected)
                .map(|since| format_elapsed(elapsed_secs(since, now)))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            location: snapshot
                .server
                .as_ref()
                .filter(|_| connected)
                .map(|s| format!("{}, {}", s.city, s.entry_country))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            kill_switch: format!("Kill Switch: {}", toggle_text(snapshot.kill_switch.as_deref())),
            dns_leak_protection: format!(
                "DNS Leak Protection: {}",
                toggle_text(snapshot.dns_leak_protection.as_deref())
            ),
            reconnect_label: match &self.last_server_id {
                Some(id) => format!("Reconnect to {}", id),
                None => "Reconnect".to_string(),
            },
            tray_label: format!("{}{}", self.status.glyph(), usage_label),
            usage_label,
        };

        change
    }

    fn detect_edge(&mut self, is_connected: bool) -> Option<Indicator> {
        match (is_connected, self.status.connection_error) {
            (true, true) => {
                self.status = ConnectionStatus {
                    connection_error: false,
                    auth_error: false,
                    network_error: false,
                };
                tracing::info!("vpn connected");
                Some(Indicator::Connected)
            }
            (false, false) => {
                self.status.connection_error = true;
                tracing::info!("vpn disconnected");
                Some(Indicator::Error)
            }
            _ => None,
        }
    }

    /// Latches the sticky flags a finished command reported.
    pub fn apply_outcome(&mut self, outcome: &CommandOutcome) {
        match outcome.kind {
            OutcomeKind::NetworkFailure => self.status.network_error = true,
            OutcomeKind::AuthFailure => self.status.auth_error = true,
            _ => {}
        }
    }
}

fn toggle_text(flag: Option<&str>) -> &'static str {
    match flag {
        Some("1") => "On",
        Some(_) => "Off",
        None => PLACEHOLDER,
    }
}

fn elapsed_secs(since: u64, now: SystemTime) -> u64 {
    let now = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    now.saturating_sub(since)
}

/// `H:MM:SS`, with a `N day(s), ` prefix past a day.
pub fn format_elapsed(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let clock = format!("{}:{:02}:{:02}", hours, minutes, seconds);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::fakes::zurich;
    use std::time::Duration;

    const CONNECTED_AT: u64 = 1_600_000_000;

    fn at(offset: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(CONNECTED_AT + offset)
    }

    fn snapshot(is_connected: bool) -> StatusSnapshot {
        StatusSnapshot {
            connection: ConnectionSnapshot { is_connected },
            server_id: Some("CH#4".to_string()),
            connected_since: Some(CONNECTED_AT),
            server: Some(zurich()),
            kill_switch: Some("1".to_string()),
            dns_leak_protection: Some("0".to_string()),
            usage: None,
        }
    }

    fn outcome(kind: OutcomeKind) -> CommandOutcome {
        CommandOutcome {
            action: VpnAction::QuickConnect,
            kind,
            raw_output_sample: String::new(),
        }
    }

    fn run(reconciler: &mut StateReconciler, sequence: &[bool]) -> Vec<Option<Indicator>> {
        let mut display = MenuDisplayState::default();
        sequence
            .iter()
            .map(|&c| reconciler.reconcile(&snapshot(c), at(5), &mut display))
            .collect()
    }

    #[test]
    fn indicator_changes_only_on_transitions() {
        let mut reconciler = StateReconciler::new();
        let sequence = [true, true, true, false, false, true, false, false, false, true];
        let changes = run(&mut reconciler, &sequence);

        let emitted = changes.iter().filter(|c| c.is_some()).count();
        let mut previous = false;
        let mut transitions = 0;
        for &c in &sequence {
            if c != previous {
                transitions += 1;
            }
            previous = c;
        }
        assert_eq!(emitted, transitions);
        assert_eq!(changes[0], Some(Indicator::Connected));
        assert_eq!(changes[1], None);
        assert_eq!(changes[3], Some(Indicator::Error));
        assert_eq!(changes[4], None);
    }

    #[test]
    fn repeated_disconnects_from_start_emit_nothing() {
        let mut reconciler = StateReconciler::new();
        let changes = run(&mut reconciler, &[false, false, false]);
        assert!(changes.iter().all(Option::is_none));
        assert!(reconciler.status().connection_error);
    }

    #[test]
    fn connect_edge_clears_sticky_flags() {
        let mut reconciler = StateReconciler::new();
        reconciler.apply_outcome(&outcome(OutcomeKind::AuthFailure));
        reconciler.apply_outcome(&outcome(OutcomeKind::NetworkFailure));

        let changes = run(&mut reconciler, &[false, false, true]);

        assert_eq!(changes, vec![None, None, Some(Indicator::Connected)]);
        let status = reconciler.status();
        assert!(!status.connection_error);
        assert!(!status.auth_error);
        assert!(!status.network_error);
        assert_eq!(status.state(), LinkState::Clean);
    }

    #[test]
    fn sticky_flags_survive_until_the_next_connect_edge() {
        let mut reconciler = StateReconciler::new();
        run(&mut reconciler, &[true]);
        reconciler.apply_outcome(&outcome(OutcomeKind::NetworkFailure));

        run(&mut reconciler, &[true, true]);
        assert_eq!(reconciler.status().state(), LinkState::Degraded);

        run(&mut reconciler, &[false]);
        assert!(reconciler.status().network_error);

        run(&mut reconciler, &[true]);
        assert_eq!(reconciler.status().state(), LinkState::Clean);
    }

    #[test]
    fn auth_failure_shows_lock_on_next_tick() {
        let mut reconciler = StateReconciler::new();
        let mut display = MenuDisplayState::default();
        reconciler.reconcile(&snapshot(true), at(5), &mut display);
        assert_eq!(display.tray_label, "");

        reconciler.apply_outcome(&outcome(OutcomeKind::AuthFailure));
        reconciler.reconcile(&snapshot(true), at(6), &mut display);
        assert!(display.tray_label.starts_with(AUTH_GLYPH));
    }

    #[test]
    fn other_outcomes_leave_flags_alone() {
        let mut reconciler = StateReconciler::new();
        for kind in [
            OutcomeKind::Success,
            OutcomeKind::Timeout,
            OutcomeKind::NoPriorConnection,
            OutcomeKind::Unknown,
        ] {
            reconciler.apply_outcome(&outcome(kind));
        }
        assert_eq!(reconciler.status(), ConnectionStatus::default());
    }

    #[test]
    fn connected_display_shows_time_and_location() {
        let mut reconciler = StateReconciler::new();
        let mut display = MenuDisplayState::default();
        reconciler.reconcile(&snapshot(true), at(3 * 3600 + 65), &mut display);

        assert_eq!(display.elapsed_time, "3:01:05");
        assert_eq!(display.location, "Zurich, CH");
        assert_eq!(display.kill_switch, "Kill Switch: On");
        assert_eq!(display.dns_leak_protection, "DNS Leak Protection: Off");
        assert_eq!(display.reconnect_label, "Reconnect to CH#4");
        assert_eq!(display.usage_label, "");
    }

    #[test]
    fn disconnected_display_uses_placeholders() {
        let mut reconciler = StateReconciler::new();
        let mut display = MenuDisplayState::default();
        reconciler.reconcile(&snapshot(false), at(10), &mut display);

        assert_eq!(display.elapsed_time, PLACEHOLDER);
        assert_eq!(display.location, PLACEHOLDER);
        assert_eq!(display.kill_switch, "Kill Switch: On");
        assert_eq!(display.reconnect_label, "Reconnect to CH#4");
    }

    #[test]
    fn reconnect_label_remembers_last_server() {
        let mut reconciler = StateReconciler::new();
        let mut display = MenuDisplayState::default();
        let mut snap = snapshot(false);
        snap.server_id = None;
        reconciler.reconcile(&snap, at(1), &mut display);
        assert_eq!(display.reconnect_label, "Reconnect");

        reconciler.reconcile(&snapshot(false), at(2), &mut display);
        reconciler.reconcile(&snap, at(3), &mut display);
        assert_eq!(display.reconnect_label, "Reconnect to CH#4");
    }

    #[test]
    fn missing_toggles_render_placeholder() {
        let mut reconciler = StateReconciler::new();
        let mut display = MenuDisplayState::default();
        let mut snap = snapshot(true);
        snap.kill_switch = None;
        snap.dns_leak_protection = Some("2".to_string());
        reconciler.reconcile(&snap, at(1), &mut display);

        assert_eq!(display.kill_switch, "Kill Switch: -");
        assert_eq!(display.dns_leak_protection, "DNS Leak Protection: Off");
    }

    #[test]
    fn usage_label_tracks_counters_when_enabled() {
        let mut reconciler = StateReconciler::new();
        let mut display = MenuDisplayState::default();
        let mut snap = snapshot(true);
        snap.usage = Some(UsageCounters {
            sent: "1.5 MB".to_string(),
            received: "20 MB".to_string(),
        });
        reconciler.reconcile(&snap, at(1), &mut display);
        assert_eq!(display.usage_label, "1.5 MB 🠕🠗 20 MB");
        assert_eq!(display.tray_label, "1.5 MB 🠕🠗 20 MB");

        reconciler.apply_outcome(&outcome(OutcomeKind::NetworkFailure));
        snap.usage = Some(UsageCounters::unavailable());
        reconciler.reconcile(&snap, at(2), &mut display);
        assert_eq!(display.usage_label, "- 🠕🠗 -");
        assert_eq!(display.tray_label, format!("{}- 🠕🠗 -", NETWORK_GLYPH));
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(0), "0:00:00");
        assert_eq!(format_elapsed(59), "0:00:59");
        assert_eq!(format_elapsed(36_000), "10:00:00");
        assert_eq!(format_elapsed(86_400 + 61), "1 day, 0:01:01");
        assert_eq!(format_elapsed(3 * 86_400 + 3_599), "3 days, 0:59:59");
    }

    #[test]
    fn future_connect_time_clamps_to_zero() {
        assert_eq!(elapsed_secs(CONNECTED_AT + 100, at(0)), 0);
    }
}

use crate::error::QueryError;
use crate::model::UsageCounters;
use sysinfo::Networks;

const VPN_INTERFACES: [&str; 2] = ["proton0", "tun0"];

pub trait UsageSource {
    fn counters(&mut self) -> Result<UsageCounters, QueryError>;
}

/// Byte totals of the VPN adapter, `proton0` first then `tun0`.
pub struct InterfaceUsage;

impl UsageSource for InterfaceUsage {
    fn counters(&mut self) -> Result<UsageCounters, QueryError> {
        let networks = Networks::new_with_refreshed_list();
        let (tx, rx) = vpn_totals(
            networks
                .iter()
                .map(|(name, data)| (name.as_str(), data.total_transmitted(), data.total_received())),
        )
        .ok_or(QueryError::NoInterface)?;

        Ok(UsageCounters {
            sent: format_bytes(tx),
            received: format_bytes(rx),
        })
    }
}

fn vpn_totals<'a>(interfaces: impl Iterator<Item = (&'a str, u64, u64)>) -> Option<(u64, u64)> {
    let interfaces: Vec<_> = interfaces.collect();
    VPN_INTERFACES.iter().find_map(|wanted| {
        interfaces
            .iter()
            .find(|(name, _, _)| name == wanted)
            .map(|&(_, tx, rx)| (tx, rx))
    })
}

/// Decimal units, rounded to two places. Whole values keep their `.0`
/// (`999.0 B`, `3.0 GB`) the way the CLI prints its own totals.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [(u64, &str); 4] = [
        (1_000_000_000, "GB"),
        (1_000_000, "MB"),
        (1_000, "KB"),
        (1, "B"),
    ];
    if bytes == 0 {
        return "0B".to_string();
    }
    let (scale, unit) = UNITS
        .into_iter()
        .find(|&(scale, _)| bytes >= scale)
        .unwrap_or((1, "B"));
    format!("{:?} {}", round2(bytes as f64 / scale as f64), unit)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_decimal_magnitudes() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(1), "1.0 B");
        assert_eq!(format_bytes(999), "999.0 B");
        assert_eq!(format_bytes(1_500), "1.5 KB");
        assert_eq!(format_bytes(12_345_678), "12.35 MB");
        assert_eq!(format_bytes(3_000_000_000), "3.0 GB");
        assert_eq!(format_bytes(2_000_000), "2.0 MB");
        assert_eq!(format_bytes(1_999_999), "2.0 MB");
    }

    #[test]
    fn prefers_proton_interface_over_tun() {
        let found = vpn_totals(
            [("eth0", 9, 9), ("tun0", 1, 2), ("proton0", 30, 40)].into_iter(),
        );
        assert_eq!(found, Some((30, 40)));
    }

    #[test]
    fn falls_back_to_tun_then_nothing() {
        assert_eq!(vpn_totals([("tun0", 1, 2)].into_iter()), Some((1, 2)));
        assert_eq!(vpn_totals([("wlan0", 1, 2)].into_iter()), None);
    }
}

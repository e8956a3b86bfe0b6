use crate::cli::Args;
use crate::runner::ElevationTool;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CLI_BINARY: &str = "protonvpn";

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("protonvpn-tray")
}

pub fn default_pvpn_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pvpn-cli")
}

/// Optional settings file. Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    show_usage: bool,
    use_pkexec: bool,
    pvpn_dir: Option<PathBuf>,
    cli_binary: Option<String>,
    log_filter: Option<String>,
}

/// Options resolved once at startup and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub show_usage: bool,
    pub elevation: ElevationTool,
    pub pvpn_dir: PathBuf,
    pub cli_binary: String,
    pub log_filter: String,
}

impl Config {
    /// Returns the config plus a warning to log once logging is up.
    pub fn load(args: &Args) -> (Self, Option<String>) {
        let path = args
            .config
            .clone()
            .unwrap_or_else(|| config_dir().join("config.json"));
        let (file, warning) = match read_file(&path) {
            Ok(file) => (file, None),
            Err(e) => (FileConfig::default(), Some(e)),
        };
        (Self::resolve(args, file), warning)
    }

    fn resolve(args: &Args, file: FileConfig) -> Self {
        let use_pkexec = args.pkexec || file.use_pkexec;
        Self {
            show_usage: args.usage || file.show_usage,
            elevation: if use_pkexec {
                ElevationTool::Pkexec
            } else {
                ElevationTool::Sudo
            },
            pvpn_dir: args
                .pvpn_dir
                .clone()
                .or(file.pvpn_dir)
                .unwrap_or_else(default_pvpn_dir),
            cli_binary: file
                .cli_binary
                .unwrap_or_else(|| DEFAULT_CLI_BINARY.to_string()),
            log_filter: args
                .log
                .clone()
                .or(file.log_filter)
                .unwrap_or_else(|| "info".to_string()),
        }
    }
}

fn read_file(path: &Path) -> Result<FileConfig, String> {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content)
            .map_err(|e| format!("ignoring malformed {}: {}", path.display(), e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(e) => Err(format!("ignoring unreadable {}: {}", path.display(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("protonvpn-tray").chain(argv.iter().copied()))
    }

    #[test]
    fn defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.json");
        let (config, warning) = Config::load(&args(&["--config", missing.to_str().unwrap()]));

        assert!(warning.is_none());
        assert!(!config.show_usage);
        assert_eq!(config.elevation, ElevationTool::Sudo);
        assert_eq!(config.cli_binary, "protonvpn");
        assert_eq!(config.log_filter, "info");
        assert!(config.pvpn_dir.ends_with(".pvpn-cli"));
    }

    #[test]
    fn file_values_apply_and_flags_win() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"use_pkexec": true, "pvpn_dir": "/srv/pvpn", "cli_binary": "protonvpn-cli", "log_filter": "warn"}"#,
        )
        .unwrap();

        let (config, _) = Config::load(&args(&[
            "--config",
            path.to_str().unwrap(),
            "-u",
            "--pvpn-dir",
            "/tmp/pvpn",
        ]));

        assert!(config.show_usage);
        assert_eq!(config.elevation, ElevationTool::Pkexec);
        assert_eq!(config.pvpn_dir, PathBuf::from("/tmp/pvpn"));
        assert_eq!(config.cli_binary, "protonvpn-cli");
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn malformed_file_falls_back_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let (config, warning) = Config::load(&args(&["--config", path.to_str().unwrap(), "-p"]));

        assert!(warning.is_some());
        assert_eq!(config.elevation, ElevationTool::Pkexec);
    }
}

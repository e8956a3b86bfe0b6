use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "protonvpn-tray")]
#[command(about = "Tray status indicator for the ProtonVPN command-line client", long_about = None)]
pub struct Args {
    /// Show transferred data next to the tray icon
    #[arg(short = 'u', long)]
    pub usage: bool,

    /// Elevate with pkexec instead of sudo
    #[arg(short = 'p', long)]
    pub pkexec: bool,

    /// Directory holding pvpn-cli.cfg and serverinfo.json
    #[arg(long, value_name = "DIR")]
    pub pvpn_dir: Option<PathBuf>,

    /// Tray settings file (JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `protonvpn_tray=trace`
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

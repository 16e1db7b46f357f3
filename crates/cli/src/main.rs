use std::path::PathBuf;

use {
    clap::Parser,
    dazzlenodes::{
        load_commands::{LoadAction, handle_load},
        telemetry::init_telemetry,
    },
};

#[derive(Parser)]
#[command(name = "dazzlenodes", about = "DazzleNodes node loader")]
struct Cli {
    #[command(subcommand)]
    command: LoadAction,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Project root (defaults to the working directory).
    #[arg(long, global = true, env = "DAZZLENODES_ROOT")]
    root: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli.log_level, cli.json_logs);
    handle_load(cli.command, cli.root)
}

use {
    clap::Parser,
    dazzlenodes::{
        sync_commands::{SyncArgs, handle_sync},
        telemetry::{init_telemetry, report_level},
    },
};

#[derive(Parser)]
#[command(
    name = "sync-web",
    about = "Sync DazzleNodes web resources (per-node caching)"
)]
struct Cli {
    #[command(flatten)]
    args: SyncArgs,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(report_level(cli.args.verbose, cli.args.quiet), false);
    handle_sync(cli.args)
}

use std::process::ExitCode;

use {
    clap::Parser,
    dazzlenodes::{
        devmode_commands::{DevModeCli, handle_dev_mode},
        telemetry::{init_telemetry, report_level},
    },
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = DevModeCli::parse();
    init_telemetry(report_level(cli.verbose, false), false);
    handle_dev_mode(cli).await
}

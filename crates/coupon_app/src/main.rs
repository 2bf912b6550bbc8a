mod platform;

use std::path::PathBuf;

use clap::Parser;

use platform::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(
    name = "coupon-dispatch",
    about = "Fill in and submit a coupon dispatch request from the terminal"
)]
pub struct Cli {
    /// Settings file (RON). Missing file means defaults.
    #[arg(long, default_value = "coupon_dispatch.ron")]
    config: PathBuf,

    /// Backend base URL (overrides the settings file)
    #[arg(long)]
    api_base_url: Option<String>,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    log: LogDestination,

    /// Log every applied message (debug level)
    #[arg(long, short)]
    verbose: bool,

    /// Read commands from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Answer every confirmation with yes
    #[arg(long)]
    yes: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    platform::run_app(cli)
}

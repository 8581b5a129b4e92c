use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use coinconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ConvertOpts {
    /// Amount of the source asset to convert
    #[arg(default_value = "1")]
    amount: String,

    /// Source cryptocurrency symbol, e.g. BTC (default: last used)
    #[arg(short, long)]
    from: Option<String>,

    /// Target currency symbol, e.g. USD (default: last used)
    #[arg(short, long)]
    to: Option<String>,

    /// Use this rate instead of the live one
    #[arg(short, long)]
    rate: Option<String>,

    /// Show the rate as SOURCE per TARGET; a manual rate is given that way and divides
    #[arg(short, long)]
    invert: bool,
}

impl From<ConvertOpts> for coinconv::ConvertArgs {
    fn from(opts: ConvertOpts) -> Self {
        coinconv::ConvertArgs {
            amount: opts.amount,
            from: opts.from,
            to: opts.to,
            rate: opts.rate,
            invert: opts.invert,
        }
    }
}

impl From<Commands> for coinconv::AppCommand {
    fn from(cmd: Commands) -> coinconv::AppCommand {
        match cmd {
            Commands::Convert(opts) => coinconv::AppCommand::Convert(opts.into()),
            Commands::Watch(opts) => coinconv::AppCommand::Watch(opts.into()),
            Commands::Assets { filter } => coinconv::AppCommand::Assets { filter },
            Commands::Refresh => coinconv::AppCommand::Refresh,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount once and exit
    Convert(ConvertOpts),
    /// Keep converting with live rates until Ctrl-C
    Watch(ConvertOpts),
    /// List supported cryptocurrencies and currencies
    Assets {
        /// Only show symbols or ids containing this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Fetch the asset catalog again and store it
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => coinconv::cli::setup::setup(),
        Some(cmd) => coinconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

use crate::demo::{run_close_report, run_demo, CloseReportArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use revcycle::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Month-End Close Orchestrator",
    about = "Run and demonstrate the month-end close workflow service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Month-end close utilities
    Close {
        #[command(subcommand)]
        command: CloseCommand,
    },
    /// Run an end-to-end CLI demo covering one month's close cycle
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum CloseCommand {
    /// Assemble a month-end report pack from fixture data
    Report(CloseReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Close {
            command: CloseCommand::Report(args),
        } => run_close_report(args),
        Command::Demo(args) => run_demo(args),
    }
}

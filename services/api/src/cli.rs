use crate::report::{run_classify, run_report, ClassifyArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use headcount::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "headcount",
    about = "Build headcount, movement and turnover figures from the HR roster exports",
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
    /// Load both sheets and print the dashboard figures
    Report(ReportArgs),
    /// Show which department category free-text labels map to
    Classify(ClassifyArgs),
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
        Command::Report(args) => run_report(args).await,
        Command::Classify(args) => {
            run_classify(args);
            Ok(())
        }
    }
}

use crate::demo::{run_demo, run_score_report, DemoArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use guidance::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Career Guidance Service",
    about = "Run and demonstrate the candidate proficiency scoring service from the command line",
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
    /// Score a synthetic candidate against a seeded occupation
    Score(ScoreArgs),
    /// Run an end-to-end CLI demo covering the onboarding journey
    Demo(DemoArgs),
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
        Command::Score(args) => run_score_report(args),
        Command::Demo(args) => run_demo(args),
    }
}

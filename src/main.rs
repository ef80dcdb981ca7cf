use clap::Parser;
use sold_comps_mailer::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Generate(args) => cli::generate::run(args).await,
        Command::ClearCache => cli::clear_cache::run().await,
    }
}

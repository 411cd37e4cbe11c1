use anyhow::Result;
use clap::Parser;

use readmind::cli::handlers::{
    self, CommandContext, SyncParams, TodayParams, TotalParams,
};
use readmind::cli::{Cli, Commands};
use readmind::config::Config;
use readmind::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.command.verbose());

    let ctx = CommandContext::new(Config::from_env());

    match cli.command {
        Commands::Sync {
            dry_run,
            tag,
            reset,
            hours,
            verbose,
        } => handlers::handle_sync(
            &ctx,
            SyncParams {
                dry_run,
                tag,
                reset,
                hours,
                verbose,
            },
        ),
        Commands::Total {
            dry_run,
            tag,
            verbose,
        } => handlers::handle_total(
            &ctx,
            TotalParams {
                dry_run,
                tag,
                verbose,
            },
        ),
        Commands::Today {
            dry_run,
            tag,
            force,
            verbose,
        } => handlers::handle_today(
            &ctx,
            TodayParams {
                dry_run,
                tag,
                force,
                verbose,
            },
        ),
    }
}

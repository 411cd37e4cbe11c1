use anyhow::Result;

use super::CommandContext;
use crate::sync::{self, RunOptions, Variant};

/// Parameters for the today-counter sync
pub struct TodayParams {
    pub dry_run: bool,
    pub tag: Option<String>,
    pub force: bool,
    pub verbose: bool,
}

pub fn handle_today(ctx: &CommandContext, params: TodayParams) -> Result<()> {
    let opts = RunOptions {
        dry_run: params.dry_run,
        tag: ctx.config.resolve_tag(params.tag),
        force: params.force,
        verbose: params.verbose,
        ..Default::default()
    };
    sync::run(&ctx.config, &Variant::today(), &opts)?;
    Ok(())
}

use anyhow::Result;

use super::CommandContext;
use crate::sync::{self, RunOptions, Variant};

/// Parameters for the since-last-run sync
pub struct SyncParams {
    pub dry_run: bool,
    pub tag: Option<String>,
    pub reset: bool,
    pub hours: Option<i64>,
    pub verbose: bool,
}

pub fn handle_sync(ctx: &CommandContext, params: SyncParams) -> Result<()> {
    let opts = RunOptions {
        dry_run: params.dry_run,
        tag: ctx.config.resolve_tag(params.tag),
        hours: params.hours,
        reset: params.reset,
        force: false,
        verbose: params.verbose,
    };
    sync::run(&ctx.config, &Variant::since_last_run(), &opts)?;
    Ok(())
}

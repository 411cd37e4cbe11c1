use anyhow::Result;

use super::CommandContext;
use crate::sync::{self, RunOptions, Variant};

/// Parameters for the cumulative-total sync
pub struct TotalParams {
    pub dry_run: bool,
    pub tag: Option<String>,
    pub verbose: bool,
}

pub fn handle_total(ctx: &CommandContext, params: TotalParams) -> Result<()> {
    let opts = RunOptions {
        dry_run: params.dry_run,
        tag: ctx.config.resolve_tag(params.tag),
        verbose: params.verbose,
        ..Default::default()
    };
    sync::run(&ctx.config, &Variant::cumulative_total(), &opts)?;
    Ok(())
}

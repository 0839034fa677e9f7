//! `gputex plan`: preview the mip layout of a transcode.

use clap::Args;
use gputex::format::select_format;
use gputex::transcode::{EstimatedLevels, TranscodePlan};
use serde_json::json;

use super::common::{CapabilityFlags, ContentFlags};
use crate::error::CliError;

#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    /// Base level width in pixels
    #[arg(long)]
    pub width: u32,

    /// Base level height in pixels
    #[arg(long)]
    pub height: u32,

    /// Number of levels in the container (default: full chain)
    #[arg(long)]
    pub levels: Option<u32>,

    #[command(flatten)]
    pub content: ContentFlags,

    #[command(flatten)]
    pub caps: CapabilityFlags,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Run the plan command.
pub fn run(args: PlanArgs) -> Result<(), CliError> {
    println!("{}", render(&args)?);
    Ok(())
}

fn build(args: &PlanArgs) -> Result<TranscodePlan, CliError> {
    if args.width == 0 || args.height == 0 {
        return Err(CliError::Usage(
            "--width and --height must be greater than zero".to_string(),
        ));
    }

    let source = match args.levels {
        Some(0) => return Err(CliError::Usage("--levels must be at least 1".to_string())),
        Some(levels) => EstimatedLevels::new(args.width, args.height, levels),
        None => EstimatedLevels::full_chain(args.width, args.height),
    };

    let caps = args.caps.to_capabilities();
    let selection = select_format(args.content.alpha, &caps, args.content.separate_alpha)?;
    let plan = TranscodePlan::build(&source, selection, source.level_count());

    tracing::debug!(
        format = %plan.format(),
        levels = plan.levels().len(),
        bytes = plan.total_size(),
        "Plan built"
    );
    Ok(plan)
}

fn render(args: &PlanArgs) -> Result<String, CliError> {
    let plan = build(args)?;

    if args.json {
        let value = json!({
            "format": plan.format().name(),
            "needs_secondary_alpha": plan.needs_secondary_alpha(),
            "total_size": plan.total_size(),
            "levels": plan.levels(),
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let buffers = if plan.needs_secondary_alpha() { 2 } else { 1 };
    let mut out = format!(
        "Format: {}  Levels: {}  Total: {} bytes x {} buffer(s)\n",
        plan.format(),
        plan.levels().len(),
        plan.total_size(),
        buffers
    );
    out.push_str(&format!(
        "{:>5}  {:>11}  {:>10}  {:>10}",
        "level", "size", "offset", "bytes"
    ));
    for level in plan.levels() {
        out.push_str(&format!(
            "\n{:>5}  {:>11}  {:>10}  {:>10}",
            level.level,
            format!("{}x{}", level.width, level.height),
            level.offset,
            level.size
        ));
    }
    Ok(out)
}

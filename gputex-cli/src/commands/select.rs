//! `gputex select`: show the format chosen for a device.

use clap::Args;
use gputex::format::{select_format, FormatSelection};
use serde_json::json;

use super::common::{family_list, CapabilityFlags, ContentFlags};
use crate::error::CliError;

#[derive(Debug, Clone, Args)]
pub struct SelectArgs {
    #[command(flatten)]
    pub content: ContentFlags,

    #[command(flatten)]
    pub caps: CapabilityFlags,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Run the select command.
pub fn run(args: SelectArgs) -> Result<(), CliError> {
    println!("{}", render(&args)?);
    Ok(())
}

fn render(args: &SelectArgs) -> Result<String, CliError> {
    let caps = args.caps.to_capabilities();
    let selection = select_format(args.content.alpha, &caps, args.content.separate_alpha)?;
    tracing::debug!(format = %selection.format, "Format selected");

    if args.json {
        return Ok(serde_json::to_string_pretty(&to_json(&selection))?);
    }

    let descriptor = selection.format.descriptor();
    Ok(format!(
        "Capabilities:    {}\nFormat:          {}\nGL format:       0x{:04X}\nSecondary alpha: {}",
        family_list(&caps),
        selection.format,
        descriptor.gl_format,
        if selection.needs_secondary_alpha { "yes" } else { "no" },
    ))
}

fn to_json(selection: &FormatSelection) -> serde_json::Value {
    let descriptor = selection.format.descriptor();
    json!({
        "format": selection.format.name(),
        "transcoder_id": selection.format.transcoder_id(),
        "gl_format": descriptor.gl_format,
        "uncompressed": descriptor.uncompressed,
        "needs_secondary_alpha": selection.needs_secondary_alpha,
    })
}

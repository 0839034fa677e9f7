//! `gputex capabilities`: derive a capability set from extension names.

use clap::Args;
use gputex::capabilities::{FormatCapabilitySet, FormatFamily};
use serde_json::json;

use super::common::family_list;
use crate::error::CliError;

#[derive(Debug, Clone, Args)]
pub struct CapabilitiesArgs {
    /// Extension name reported by the GPU context (repeatable)
    #[arg(long = "extension", value_name = "NAME")]
    pub extensions: Vec<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Run the capabilities command.
pub fn run(args: CapabilitiesArgs) -> Result<(), CliError> {
    println!("{}", render(&args)?);
    Ok(())
}

fn render(args: &CapabilitiesArgs) -> Result<String, CliError> {
    let caps = FormatCapabilitySet::from_extensions(&args.extensions);

    if args.json {
        return Ok(serde_json::to_string_pretty(&json!(caps))?);
    }

    let mut out = format!("Supported: {}", family_list(&caps));
    for family in FormatFamily::ALL {
        let mark = if caps.supports(family) { "x" } else { " " };
        out.push_str(&format!(
            "\n  [{}] {:<6} {}",
            mark,
            format!("{:?}", family).to_lowercase(),
            family.extension()
        ));
    }
    Ok(out)
}

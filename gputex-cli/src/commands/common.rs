//! Common types and utilities shared across CLI commands.

use clap::Args;
use gputex::capabilities::{FormatCapabilitySet, FormatFamily};

/// Compressed-format families the target device supports.
#[derive(Debug, Clone, Default, Args)]
pub struct CapabilityFlags {
    /// Device supports S3TC (BC1/BC3)
    #[arg(long)]
    pub s3tc: bool,
    /// Device supports ETC1
    #[arg(long)]
    pub etc1: bool,
    /// Device supports ETC2/EAC
    #[arg(long)]
    pub etc2: bool,
    /// Device supports PVRTC1
    #[arg(long)]
    pub pvrtc: bool,
    /// Device supports ASTC
    #[arg(long)]
    pub astc: bool,
    /// Device supports BPTC (BC7)
    #[arg(long)]
    pub bptc: bool,
}

impl CapabilityFlags {
    pub fn to_capabilities(&self) -> FormatCapabilitySet {
        let flags = [
            (self.s3tc, FormatFamily::S3tc),
            (self.etc1, FormatFamily::Etc1),
            (self.etc2, FormatFamily::Etc2),
            (self.pvrtc, FormatFamily::Pvrtc),
            (self.astc, FormatFamily::Astc),
            (self.bptc, FormatFamily::Bptc),
        ];
        let families: Vec<_> = flags
            .into_iter()
            .filter_map(|(on, family)| on.then_some(family))
            .collect();
        FormatCapabilitySet::with_families(&families)
    }
}

/// Content options shared by `select` and `plan`.
#[derive(Debug, Clone, Default, Args)]
pub struct ContentFlags {
    /// The texture has an alpha channel
    #[arg(long)]
    pub alpha: bool,
    /// Allow alpha to be returned as a second texture
    #[arg(long)]
    pub separate_alpha: bool,
}

/// Formats a family list for display.
pub fn family_list(caps: &FormatCapabilitySet) -> String {
    let families = caps.families();
    if families.is_empty() {
        return "none".to_string();
    }
    families
        .iter()
        .map(|f| format!("{:?}", f).to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_families() {
        let flags = CapabilityFlags {
            s3tc: true,
            bptc: true,
            ..Default::default()
        };
        let caps = flags.to_capabilities();
        assert!(caps.supports(FormatFamily::S3tc));
        assert!(caps.supports(FormatFamily::Bptc));
        assert!(!caps.supports(FormatFamily::Etc1));
    }

    #[test]
    fn test_family_list() {
        assert_eq!(family_list(&FormatCapabilitySet::NONE), "none");
        let caps = FormatCapabilitySet::with_families(&[FormatFamily::Etc1, FormatFamily::Astc]);
        assert_eq!(family_list(&caps), "etc1, astc");
    }
}

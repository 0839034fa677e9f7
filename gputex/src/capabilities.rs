//! Compressed-texture capabilities of a GPU context.
//!
//! A [`FormatCapabilitySet`] is a snapshot taken once per context. When the
//! context changes the whole set is replaced; it is never patched in place.

use serde::{Deserialize, Serialize};

/// Extension that exposes S3TC (BC1-3).
pub const EXT_S3TC: &str = "WEBGL_compressed_texture_s3tc";
/// Extension that exposes ETC1.
pub const EXT_ETC1: &str = "WEBGL_compressed_texture_etc1";
/// Extension that exposes ETC2/EAC.
pub const EXT_ETC2: &str = "WEBGL_compressed_texture_etc";
/// Extension that exposes PVRTC1.
pub const EXT_PVRTC: &str = "WEBGL_compressed_texture_pvrtc";
/// Extension that exposes ASTC.
pub const EXT_ASTC: &str = "WEBGL_compressed_texture_astc";
/// Extension that exposes BPTC (BC7).
pub const EXT_BPTC: &str = "EXT_texture_compression_bptc";

/// A compressed-texture format family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatFamily {
    S3tc,
    Etc1,
    Etc2,
    Pvrtc,
    Astc,
    Bptc,
}

impl FormatFamily {
    /// Every family, in capability-probe order.
    pub const ALL: [FormatFamily; 6] = [
        FormatFamily::S3tc,
        FormatFamily::Etc1,
        FormatFamily::Etc2,
        FormatFamily::Pvrtc,
        FormatFamily::Astc,
        FormatFamily::Bptc,
    ];

    /// The extension whose presence enables this family.
    pub fn extension(self) -> &'static str {
        match self {
            FormatFamily::S3tc => EXT_S3TC,
            FormatFamily::Etc1 => EXT_ETC1,
            FormatFamily::Etc2 => EXT_ETC2,
            FormatFamily::Pvrtc => EXT_PVRTC,
            FormatFamily::Astc => EXT_ASTC,
            FormatFamily::Bptc => EXT_BPTC,
        }
    }
}

/// Source of extension availability, usually a live GPU context.
pub trait ExtensionQuery {
    /// Returns true if the named extension is available.
    fn has_extension(&self, name: &str) -> bool;
}

impl<S: AsRef<str>> ExtensionQuery for [S] {
    fn has_extension(&self, name: &str) -> bool {
        self.iter().any(|ext| ext.as_ref() == name)
    }
}

impl<S: AsRef<str>> ExtensionQuery for Vec<S> {
    fn has_extension(&self, name: &str) -> bool {
        self.as_slice().has_extension(name)
    }
}

/// Which compressed-texture families the current device supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatCapabilitySet {
    pub s3tc: bool,
    pub etc1: bool,
    pub etc2: bool,
    pub pvrtc: bool,
    pub astc: bool,
    pub bptc: bool,
}

impl FormatCapabilitySet {
    /// A set with no compressed family available.
    pub const NONE: FormatCapabilitySet = FormatCapabilitySet {
        s3tc: false,
        etc1: false,
        etc2: false,
        pvrtc: false,
        astc: false,
        bptc: false,
    };

    /// Probes `query` for each family's extension.
    pub fn from_extensions<Q: ExtensionQuery + ?Sized>(query: &Q) -> Self {
        Self {
            s3tc: query.has_extension(EXT_S3TC),
            etc1: query.has_extension(EXT_ETC1),
            etc2: query.has_extension(EXT_ETC2),
            pvrtc: query.has_extension(EXT_PVRTC),
            astc: query.has_extension(EXT_ASTC),
            bptc: query.has_extension(EXT_BPTC),
        }
    }

    /// Builds a set with only the given families enabled.
    pub fn with_families(families: &[FormatFamily]) -> Self {
        let mut caps = Self::NONE;
        for family in families {
            match family {
                FormatFamily::S3tc => caps.s3tc = true,
                FormatFamily::Etc1 => caps.etc1 = true,
                FormatFamily::Etc2 => caps.etc2 = true,
                FormatFamily::Pvrtc => caps.pvrtc = true,
                FormatFamily::Astc => caps.astc = true,
                FormatFamily::Bptc => caps.bptc = true,
            }
        }
        caps
    }

    /// Returns true if `family` is supported.
    pub fn supports(&self, family: FormatFamily) -> bool {
        match family {
            FormatFamily::S3tc => self.s3tc,
            FormatFamily::Etc1 => self.etc1,
            FormatFamily::Etc2 => self.etc2,
            FormatFamily::Pvrtc => self.pvrtc,
            FormatFamily::Astc => self.astc,
            FormatFamily::Bptc => self.bptc,
        }
    }

    /// Supported families, in probe order.
    pub fn families(&self) -> Vec<FormatFamily> {
        FormatFamily::ALL
            .iter()
            .copied()
            .filter(|f| self.supports(*f))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeContext {
        extensions: Vec<&'static str>,
    }

    impl ExtensionQuery for FakeContext {
        fn has_extension(&self, name: &str) -> bool {
            self.extensions.contains(&name)
        }
    }

    #[test]
    fn test_from_extensions_maps_each_family() {
        let ctx = FakeContext {
            extensions: vec![EXT_S3TC, EXT_BPTC, "OES_texture_float"],
        };
        let caps = FormatCapabilitySet::from_extensions(&ctx);
        assert!(caps.s3tc);
        assert!(caps.bptc);
        assert!(!caps.etc1);
        assert!(!caps.etc2);
        assert!(!caps.pvrtc);
        assert!(!caps.astc);
    }

    #[test]
    fn test_from_extensions_is_idempotent() {
        let ctx = FakeContext {
            extensions: vec![EXT_ETC1, EXT_ASTC],
        };
        assert_eq!(
            FormatCapabilitySet::from_extensions(&ctx),
            FormatCapabilitySet::from_extensions(&ctx)
        );
    }

    #[test]
    fn test_extension_list_query() {
        let extensions = vec![EXT_PVRTC.to_string()];
        let caps = FormatCapabilitySet::from_extensions(&extensions);
        assert_eq!(caps, FormatCapabilitySet::with_families(&[FormatFamily::Pvrtc]));
    }

    #[test]
    fn test_default_is_none() {
        assert_eq!(FormatCapabilitySet::default(), FormatCapabilitySet::NONE);
        assert!(FormatCapabilitySet::NONE.families().is_empty());
    }

    #[test]
    fn test_supports_matches_fields() {
        for family in FormatFamily::ALL {
            let caps = FormatCapabilitySet::with_families(&[family]);
            assert_eq!(caps.families(), vec![family]);
            assert!(caps.supports(family));
        }
    }

    #[test]
    fn test_serde_field_names() {
        let caps = FormatCapabilitySet::with_families(&[FormatFamily::S3tc]);
        let json = serde_json::to_value(caps).unwrap();
        assert_eq!(json["s3tc"], true);
        assert_eq!(json["etc2"], false);
    }
}

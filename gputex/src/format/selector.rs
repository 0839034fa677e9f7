//! GPU format selection.
//!
//! Selection walks one of two fixed priority chains and takes the first
//! rule whose family is supported. The order is a quality contract:
//! device-native formats ahead of emulated ones, and opaque formats for
//! opaque content so no storage is spent on an unused alpha channel.
//!
//! ```text
//!  has alpha                         opaque
//!  ─────────                         ──────
//!  etc2  → ETC2_RGBA                 etc1  → ETC1_RGB
//!  bptc  → BC7_RGBA                  bptc  → BC7_RGBA
//!  s3tc  → BC3_RGBA                  s3tc  → BC1_RGB
//!  astc  → ASTC_4x4_RGBA             etc2  → ETC2_RGBA
//!  pvrtc → PVRTC1_RGB + alpha pass   astc  → ASTC_4x4_RGBA
//!          (separate alpha allowed)  pvrtc → PVRTC1_RGB
//!  pvrtc → PVRTC1_RGBA               *     → RGB565
//!  etc1  → ETC1_RGB + alpha pass
//!          (separate alpha allowed)
//!  *     → RGBA32
//! ```

use crate::capabilities::{FormatCapabilitySet, FormatFamily};
use crate::transcode::TranscodeError;

use super::target::TargetFormat;

/// Outcome of format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSelection {
    /// The format every level is transcoded to.
    pub format: TargetFormat,
    /// True when alpha must be transcoded into a second, opaque buffer.
    pub needs_secondary_alpha: bool,
}

/// Whether a rule depends on the caller allowing a separate alpha texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeparateAlpha {
    Any,
    Allowed,
    Forbidden,
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    /// `None` matches unconditionally.
    family: Option<FormatFamily>,
    separate_alpha: SeparateAlpha,
    format: TargetFormat,
    needs_secondary_alpha: bool,
}

impl Rule {
    const fn when(family: FormatFamily, format: TargetFormat) -> Self {
        Self {
            family: Some(family),
            separate_alpha: SeparateAlpha::Any,
            format,
            needs_secondary_alpha: false,
        }
    }

    const fn fallback(format: TargetFormat) -> Self {
        Self {
            family: None,
            separate_alpha: SeparateAlpha::Any,
            format,
            needs_secondary_alpha: false,
        }
    }

    const fn separate(mut self, separate_alpha: SeparateAlpha, secondary: bool) -> Self {
        self.separate_alpha = separate_alpha;
        self.needs_secondary_alpha = secondary;
        self
    }

    fn matches(&self, caps: &FormatCapabilitySet, allow_separate_alpha: bool) -> bool {
        let family_ok = self.family.map_or(true, |f| caps.supports(f));
        let alpha_ok = match self.separate_alpha {
            SeparateAlpha::Any => true,
            SeparateAlpha::Allowed => allow_separate_alpha,
            SeparateAlpha::Forbidden => !allow_separate_alpha,
        };
        family_ok && alpha_ok
    }
}

const ALPHA_CHAIN: [Rule; 8] = [
    Rule::when(FormatFamily::Etc2, TargetFormat::Etc2Rgba),
    Rule::when(FormatFamily::Bptc, TargetFormat::Bc7Rgba),
    Rule::when(FormatFamily::S3tc, TargetFormat::Bc3Rgba),
    Rule::when(FormatFamily::Astc, TargetFormat::Astc4x4Rgba),
    Rule::when(FormatFamily::Pvrtc, TargetFormat::Pvrtc1Rgb).separate(SeparateAlpha::Allowed, true),
    Rule::when(FormatFamily::Pvrtc, TargetFormat::Pvrtc1Rgba)
        .separate(SeparateAlpha::Forbidden, false),
    Rule::when(FormatFamily::Etc1, TargetFormat::Etc1Rgb).separate(SeparateAlpha::Allowed, true),
    Rule::fallback(TargetFormat::Rgba32),
];

const OPAQUE_CHAIN: [Rule; 7] = [
    Rule::when(FormatFamily::Etc1, TargetFormat::Etc1Rgb),
    Rule::when(FormatFamily::Bptc, TargetFormat::Bc7Rgba),
    Rule::when(FormatFamily::S3tc, TargetFormat::Bc1Rgb),
    Rule::when(FormatFamily::Etc2, TargetFormat::Etc2Rgba),
    Rule::when(FormatFamily::Astc, TargetFormat::Astc4x4Rgba),
    Rule::when(FormatFamily::Pvrtc, TargetFormat::Pvrtc1Rgb),
    Rule::fallback(TargetFormat::Rgb565),
];

/// Chooses the transcode target for a texture.
///
/// # Arguments
///
/// * `has_alpha` - Whether the container carries an alpha channel
/// * `caps` - Compressed families supported by the device
/// * `allow_separate_alpha` - Whether the caller accepts a second alpha texture
///
/// # Errors
///
/// [`TranscodeError::NoSupportedFormat`] if no rule matches. Both chains end
/// in an unconditional raster fallback, so this is not expected in practice.
pub fn select_format(
    has_alpha: bool,
    caps: &FormatCapabilitySet,
    allow_separate_alpha: bool,
) -> Result<FormatSelection, TranscodeError> {
    let chain: &[Rule] = if has_alpha {
        &ALPHA_CHAIN
    } else {
        &OPAQUE_CHAIN
    };

    chain
        .iter()
        .find(|rule| rule.matches(caps, allow_separate_alpha))
        .map(|rule| FormatSelection {
            format: rule.format,
            needs_secondary_alpha: rule.needs_secondary_alpha,
        })
        .ok_or(TranscodeError::NoSupportedFormat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn caps(families: &[FormatFamily]) -> FormatCapabilitySet {
        FormatCapabilitySet::with_families(families)
    }

    fn select(has_alpha: bool, families: &[FormatFamily], separate: bool) -> FormatSelection {
        select_format(has_alpha, &caps(families), separate).unwrap()
    }

    #[test]
    fn test_alpha_s3tc_only_picks_bc3() {
        let selection = select(true, &[FormatFamily::S3tc], false);
        assert_eq!(selection.format, TargetFormat::Bc3Rgba);
        assert!(!selection.needs_secondary_alpha);
    }

    #[test]
    fn test_alpha_pvrtc_with_separate_alpha() {
        let selection = select(true, &[FormatFamily::Pvrtc], true);
        assert_eq!(selection.format, TargetFormat::Pvrtc1Rgb);
        assert!(selection.needs_secondary_alpha);
    }

    #[test]
    fn test_alpha_pvrtc_without_separate_alpha() {
        let selection = select(true, &[FormatFamily::Pvrtc], false);
        assert_eq!(selection.format, TargetFormat::Pvrtc1Rgba);
        assert!(!selection.needs_secondary_alpha);
    }

    #[test]
    fn test_alpha_etc1_requires_separate_alpha() {
        let selection = select(true, &[FormatFamily::Etc1], true);
        assert_eq!(selection.format, TargetFormat::Etc1Rgb);
        assert!(selection.needs_secondary_alpha);

        let selection = select(true, &[FormatFamily::Etc1], false);
        assert_eq!(selection.format, TargetFormat::Rgba32);
        assert!(!selection.needs_secondary_alpha);
    }

    #[test]
    fn test_alpha_priority_order() {
        let all = FormatFamily::ALL;
        assert_eq!(select(true, &all, true).format, TargetFormat::Etc2Rgba);
        assert_eq!(
            select(true, &[FormatFamily::Bptc, FormatFamily::S3tc], false).format,
            TargetFormat::Bc7Rgba
        );
        assert_eq!(
            select(true, &[FormatFamily::Astc, FormatFamily::S3tc], false).format,
            TargetFormat::Bc3Rgba
        );
        assert_eq!(
            select(true, &[FormatFamily::Astc, FormatFamily::Pvrtc], true).format,
            TargetFormat::Astc4x4Rgba
        );
        assert_eq!(
            select(true, &[FormatFamily::Pvrtc, FormatFamily::Etc1], true).format,
            TargetFormat::Pvrtc1Rgb
        );
    }

    #[test]
    fn test_opaque_priority_order() {
        assert_eq!(
            select(false, &FormatFamily::ALL, false).format,
            TargetFormat::Etc1Rgb
        );
        assert_eq!(
            select(false, &[FormatFamily::Bptc, FormatFamily::S3tc], false).format,
            TargetFormat::Bc7Rgba
        );
        assert_eq!(
            select(false, &[FormatFamily::S3tc, FormatFamily::Etc2], false).format,
            TargetFormat::Bc1Rgb
        );
        assert_eq!(
            select(false, &[FormatFamily::Etc2, FormatFamily::Astc], false).format,
            TargetFormat::Etc2Rgba
        );
        assert_eq!(
            select(false, &[FormatFamily::Astc, FormatFamily::Pvrtc], false).format,
            TargetFormat::Astc4x4Rgba
        );
        assert_eq!(
            select(false, &[FormatFamily::Pvrtc], true).format,
            TargetFormat::Pvrtc1Rgb
        );
    }

    #[test]
    fn test_no_capabilities_falls_back_to_raster() {
        for separate in [false, true] {
            let alpha = select(true, &[], separate);
            assert_eq!(alpha.format, TargetFormat::Rgba32);
            assert!(!alpha.needs_secondary_alpha);

            let opaque = select(false, &[], separate);
            assert_eq!(opaque.format, TargetFormat::Rgb565);
            assert!(!opaque.needs_secondary_alpha);
        }
    }

    #[test]
    fn test_every_chain_format_has_descriptor() {
        for rule in ALPHA_CHAIN.iter().chain(OPAQUE_CHAIN.iter()) {
            // descriptor() is total; this guards the uncompressed fallbacks
            let desc = rule.format.descriptor();
            assert_ne!(desc.gl_format, 0);
        }
    }

    fn arb_caps() -> impl Strategy<Value = FormatCapabilitySet> {
        (
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(s3tc, etc1, etc2, pvrtc, astc, bptc)| FormatCapabilitySet {
                s3tc,
                etc1,
                etc2,
                pvrtc,
                astc,
                bptc,
            })
    }

    proptest! {
        #[test]
        fn prop_selection_never_fails(caps in arb_caps(), alpha in any::<bool>(), separate in any::<bool>()) {
            prop_assert!(select_format(alpha, &caps, separate).is_ok());
        }

        #[test]
        fn prop_opaque_never_needs_secondary_alpha(caps in arb_caps(), separate in any::<bool>()) {
            let selection = select_format(false, &caps, separate).unwrap();
            prop_assert!(!selection.needs_secondary_alpha);
        }

        #[test]
        fn prop_alpha_follows_first_supported_family(caps in arb_caps(), separate in any::<bool>()) {
            let selection = select_format(true, &caps, separate).unwrap();
            let expected = if caps.etc2 {
                (TargetFormat::Etc2Rgba, false)
            } else if caps.bptc {
                (TargetFormat::Bc7Rgba, false)
            } else if caps.s3tc {
                (TargetFormat::Bc3Rgba, false)
            } else if caps.astc {
                (TargetFormat::Astc4x4Rgba, false)
            } else if caps.pvrtc && separate {
                (TargetFormat::Pvrtc1Rgb, true)
            } else if caps.pvrtc {
                (TargetFormat::Pvrtc1Rgba, false)
            } else if caps.etc1 && separate {
                (TargetFormat::Etc1Rgb, true)
            } else {
                (TargetFormat::Rgba32, false)
            };
            prop_assert_eq!((selection.format, selection.needs_secondary_alpha), expected);
        }

        #[test]
        fn prop_secondary_alpha_only_for_opaque_targets(caps in arb_caps(), alpha in any::<bool>(), separate in any::<bool>()) {
            let selection = select_format(alpha, &caps, separate).unwrap();
            if selection.needs_secondary_alpha {
                prop_assert!(alpha && separate);
                prop_assert!(!selection.format.carries_alpha());
            }
        }
    }
}

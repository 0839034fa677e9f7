//! Mip-level layout of a transcode.
//!
//! A [`TranscodePlan`] places every transcoded level back to back in one
//! buffer. Level 0 starts at offset 0 and each following level starts where
//! the previous one ends.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::format::{FormatSelection, TargetFormat};

use super::container::{LevelSource, IMAGE_INDEX};

/// Placement of one transcoded mip level in the output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MipLevelDescriptor {
    /// Mip level index, 0 is full resolution.
    pub level: u32,
    /// Byte offset into the output buffer.
    pub offset: usize,
    /// Byte size of the level.
    pub size: usize,
    pub width: u32,
    pub height: u32,
}

impl MipLevelDescriptor {
    /// Byte range of this level in the output buffer.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.size
    }
}

/// Number of levels to transcode.
///
/// Raster output only transcodes the top level; the GPU generates the rest
/// more cheaply than the transcoder would.
pub fn planned_level_count(format: TargetFormat, container_levels: u32) -> u32 {
    if format.is_uncompressed() {
        container_levels.min(1)
    } else {
        container_levels
    }
}

/// The chosen format and level layout for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodePlan {
    format: TargetFormat,
    needs_secondary_alpha: bool,
    levels: Vec<MipLevelDescriptor>,
    total_size: usize,
}

impl TranscodePlan {
    /// Builds a plan by querying `source` for each level of the first image.
    ///
    /// The planner only reads; invalid sizes are left for the caller to
    /// detect with [`TranscodePlan::first_invalid_level`].
    pub fn build<S: LevelSource + ?Sized>(
        source: &S,
        selection: FormatSelection,
        container_levels: u32,
    ) -> Self {
        let format = selection.format;
        let level_count = planned_level_count(format, container_levels);

        let mut levels = Vec::with_capacity(level_count as usize);
        let mut total_size = 0usize;

        for level in 0..level_count {
            let size = source.transcoded_size(IMAGE_INDEX, level, format) as usize;
            levels.push(MipLevelDescriptor {
                level,
                offset: total_size,
                size,
                width: source.level_width(IMAGE_INDEX, level),
                height: source.level_height(IMAGE_INDEX, level),
            });
            total_size += size;
        }

        Self {
            format,
            needs_secondary_alpha: selection.needs_secondary_alpha,
            levels,
            total_size,
        }
    }

    pub fn format(&self) -> TargetFormat {
        self.format
    }

    pub fn needs_secondary_alpha(&self) -> bool {
        self.needs_secondary_alpha
    }

    pub fn levels(&self) -> &[MipLevelDescriptor] {
        &self.levels
    }

    /// Sum of all level sizes.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Returns the first level whose size or dimensions are zero.
    pub fn first_invalid_level(&self) -> Option<&MipLevelDescriptor> {
        self.levels
            .iter()
            .find(|l| l.size == 0 || l.width == 0 || l.height == 0)
    }

    /// Consumes the plan, returning its level descriptors.
    pub fn into_levels(self) -> Vec<MipLevelDescriptor> {
        self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode::EstimatedLevels;
    use proptest::prelude::*;

    fn selection(format: TargetFormat) -> FormatSelection {
        FormatSelection {
            format,
            needs_secondary_alpha: false,
        }
    }

    #[test]
    fn test_plan_offsets_are_contiguous() {
        let source = EstimatedLevels::new(64, 64, 4);
        let plan = TranscodePlan::build(&source, selection(TargetFormat::Bc1Rgb), 4);

        let levels = plan.levels();
        assert_eq!(levels.len(), 4);
        assert_eq!(levels[0].offset, 0);
        assert_eq!(levels[0].size, 2048);
        assert_eq!(levels[1].offset, 2048);
        assert_eq!(levels[1].size, 512);
        assert_eq!(levels[2].offset, 2560);
        assert_eq!(levels[3].offset, 2688);
        assert_eq!(plan.total_size(), 2688 + 32);
    }

    #[test]
    fn test_plan_records_dimensions() {
        let source = EstimatedLevels::new(32, 8, 3);
        let plan = TranscodePlan::build(&source, selection(TargetFormat::Bc7Rgba), 3);
        let dims: Vec<_> = plan.levels().iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(dims, vec![(32, 8), (16, 4), (8, 2)]);
    }

    #[test]
    fn test_uncompressed_plan_has_single_level() {
        let source = EstimatedLevels::new(64, 64, 7);
        let plan = TranscodePlan::build(&source, selection(TargetFormat::Rgba32), 7);
        assert_eq!(plan.levels().len(), 1);
        assert_eq!(plan.total_size(), 64 * 64 * 4);
    }

    #[test]
    fn test_planned_level_count() {
        assert_eq!(planned_level_count(TargetFormat::Bc1Rgb, 5), 5);
        assert_eq!(planned_level_count(TargetFormat::Rgb565, 5), 1);
        assert_eq!(planned_level_count(TargetFormat::Rgba4444, 0), 0);
    }

    #[test]
    fn test_plan_carries_selection() {
        let source = EstimatedLevels::new(4, 4, 1);
        let plan = TranscodePlan::build(
            &source,
            FormatSelection {
                format: TargetFormat::Pvrtc1Rgb,
                needs_secondary_alpha: true,
            },
            1,
        );
        assert_eq!(plan.format(), TargetFormat::Pvrtc1Rgb);
        assert!(plan.needs_secondary_alpha());
        assert!(plan.first_invalid_level().is_none());
    }

    #[test]
    fn test_first_invalid_level_detects_zero_size() {
        struct Broken;
        impl LevelSource for Broken {
            fn transcoded_size(&self, _: u32, level: u32, _: TargetFormat) -> u32 {
                if level == 1 {
                    0
                } else {
                    8
                }
            }
            fn level_width(&self, _: u32, _: u32) -> u32 {
                4
            }
            fn level_height(&self, _: u32, _: u32) -> u32 {
                4
            }
        }

        let plan = TranscodePlan::build(&Broken, selection(TargetFormat::Bc1Rgb), 3);
        assert_eq!(plan.first_invalid_level().map(|l| l.level), Some(1));
    }

    proptest! {
        #[test]
        fn prop_plan_partitions_buffer(
            width in 1u32..4096,
            height in 1u32..4096,
            levels in 1u32..13,
            format_index in 0usize..TargetFormat::ALL.len(),
        ) {
            let format = TargetFormat::ALL[format_index];
            let source = EstimatedLevels::new(width, height, levels);
            let plan = TranscodePlan::build(&source, selection(format), levels);

            let mut expected_offset = 0usize;
            for descriptor in plan.levels() {
                prop_assert_eq!(descriptor.offset, expected_offset);
                expected_offset += descriptor.size;
            }
            prop_assert_eq!(expected_offset, plan.total_size());

            let sum: usize = plan.levels().iter().map(|l| l.size).sum();
            prop_assert_eq!(sum, plan.total_size());

            if format.is_uncompressed() {
                prop_assert_eq!(plan.levels().len(), 1);
            } else {
                prop_assert_eq!(plan.levels().len(), levels as usize);
            }
        }
    }
}

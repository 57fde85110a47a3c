//! Vertex reference width detection.
//!
//! Display lists carry no format tag for their vertex references. Three layouts
//! are known:
//!
//! - 3 bytes: `pos:u8, attr:u8, uv:u8`
//! - 4 bytes: `pos:u8, 0, 0, uv:u8` (normal/color slots unused)
//! - 6 bytes: `pos:u16, attr:u16, uv:u16`
//!
//! The width is inferred per mesh from the first draw command's leading
//! references, scored under every candidate width.

use super::display_list::RefSample;
use crate::options::DecodeOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Byte width of one vertex reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RefWidth {
    Three,
    Four,
    Six,
}

impl RefWidth {
    /// Candidates, narrowest first.
    pub const ALL: [RefWidth; 3] = [RefWidth::Three, RefWidth::Four, RefWidth::Six];

    #[must_use]
    pub fn bytes(self) -> usize {
        match self {
            RefWidth::Three => 3,
            RefWidth::Four => 4,
            RefWidth::Six => 6,
        }
    }

    /// Position index of a reference (first byte, or first u16 for 6-byte refs).
    #[must_use]
    pub fn position_index(self, reference: &[u8]) -> u16 {
        match self {
            RefWidth::Three | RefWidth::Four => u16::from(reference[0]),
            RefWidth::Six => u16::from_be_bytes([reference[0], reference[1]]),
        }
    }

    /// UV index of a reference (last byte, or last u16 for 6-byte refs).
    #[must_use]
    pub fn uv_index(self, reference: &[u8]) -> u16 {
        match self {
            RefWidth::Three => u16::from(reference[2]),
            RefWidth::Four => u16::from(reference[3]),
            RefWidth::Six => u16::from_be_bytes([reference[4], reference[5]]),
        }
    }

    /// Decode one reference of this width.
    #[must_use]
    pub fn decode(self, reference: &[u8]) -> VertexRef {
        VertexRef {
            position: self.position_index(reference),
            uv: self.uv_index(reference),
        }
    }
}

impl From<RefWidth> for u8 {
    fn from(width: RefWidth) -> Self {
        width.bytes() as u8
    }
}

impl TryFrom<u8> for RefWidth {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(RefWidth::Three),
            4 => Ok(RefWidth::Four),
            6 => Ok(RefWidth::Six),
            other => Err(format!("unsupported vertex reference width {other} (expected 3, 4 or 6)")),
        }
    }
}

impl std::fmt::Display for RefWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-byte", self.bytes())
    }
}

/// A decoded vertex reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRef {
    pub position: u16,
    pub uv: u16,
}

/// How a sample scores under one candidate width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidthScore {
    pub width: RefWidth,
    /// Sampled position indices.
    pub indices: Vec<u16>,
    /// Every sampled index is below the mesh's vertex count.
    pub valid: bool,
    /// More than one distinct index.
    pub varied: bool,
    /// Adjacent indices differ by at most the tolerance.
    pub sequential: bool,
}

impl WidthScore {
    #[must_use]
    pub fn passes(&self) -> bool {
        self.valid && self.varied && self.sequential
    }
}

/// Which rule picked the width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DetectionRule {
    /// 6-byte references are valid, varied and sequential.
    SixByteSequential,
    /// Bytes 1 and 2 are zero for most 4-byte references.
    ZeroPadding,
    /// 3- or 4-byte references are valid, varied and sequential.
    Sequential,
    /// Nothing matched.
    Default,
    /// Width supplied by the caller.
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Outcome of width detection for one mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatDetection {
    pub width: RefWidth,
    pub rule: DetectionRule,
    pub confidence: Confidence,
    /// Scores for 3, 4 and 6 bytes, in that order. Empty when forced.
    pub scores: Vec<WidthScore>,
    /// Bytes 1 and 2 were zero for a majority of 4-byte references.
    pub zero_padding: bool,
    /// The 6-byte and zero-padding rules both matched; the 6-byte rule won.
    pub conflict: bool,
}

impl FormatDetection {
    /// Detection result for a caller-supplied width.
    #[must_use]
    pub fn forced(width: RefWidth) -> Self {
        Self {
            width,
            rule: DetectionRule::Forced,
            confidence: Confidence::High,
            scores: Vec::new(),
            zero_padding: false,
            conflict: false,
        }
    }

    /// The competing rules disagreed and the result should be checked by hand.
    #[must_use]
    pub fn needs_review(&self) -> bool {
        self.conflict
    }

    #[must_use]
    pub fn score(&self, width: RefWidth) -> Option<&WidthScore> {
        self.scores.iter().find(|s| s.width == width)
    }
}

/// Scores sampled references against a mesh's vertex count.
#[derive(Debug, Clone, Copy)]
pub struct FormatDetector {
    vertex_count: usize,
    sample_refs: usize,
    tolerance: u32,
}

impl FormatDetector {
    #[must_use]
    pub fn new(vertex_count: usize, options: &DecodeOptions) -> Self {
        Self {
            vertex_count,
            sample_refs: options.sample_refs,
            tolerance: options.sequential_tolerance,
        }
    }

    /// Detect the width from a scanner sample. No sample yields the 3-byte default.
    #[must_use]
    pub fn detect_sample(&self, sample: Option<&RefSample<'_>>) -> FormatDetection {
        match sample {
            Some(s) => self.detect(s.bytes, usize::from(s.count)),
            None => self.detect(&[], 0),
        }
    }

    /// Detect the width of references starting at `bytes`, belonging to a
    /// command that declares `count` references.
    ///
    /// Priority: 6-byte if it passes every check, then 4-byte if the zero
    /// padding pattern holds, then the narrower of 3/4-byte that passes,
    /// otherwise 3-byte.
    #[must_use]
    pub fn detect(&self, bytes: &[u8], count: usize) -> FormatDetection {
        let wanted = count.min(self.sample_refs);
        let scores: Vec<WidthScore> = RefWidth::ALL
            .iter()
            .map(|&w| self.score(bytes, wanted, w))
            .collect();
        let zero_padding = zero_padding_majority(bytes, wanted);

        let three = &scores[0];
        let four = &scores[1];
        let six = &scores[2];

        let (width, rule, confidence, conflict) = if six.passes() {
            let conflict = zero_padding;
            let confidence = if conflict { Confidence::Low } else { Confidence::High };
            (RefWidth::Six, DetectionRule::SixByteSequential, confidence, conflict)
        } else if zero_padding {
            let confidence = if four.passes() { Confidence::High } else { Confidence::Medium };
            (RefWidth::Four, DetectionRule::ZeroPadding, confidence, false)
        } else if three.passes() {
            let confidence = if four.passes() { Confidence::Medium } else { Confidence::High };
            (RefWidth::Three, DetectionRule::Sequential, confidence, false)
        } else if four.passes() {
            (RefWidth::Four, DetectionRule::Sequential, Confidence::High, false)
        } else {
            (RefWidth::Three, DetectionRule::Default, Confidence::Low, false)
        };

        FormatDetection {
            width,
            rule,
            confidence,
            scores,
            zero_padding,
            conflict,
        }
    }

    /// Score the first `wanted` references of `bytes` read at `width`.
    #[must_use]
    pub fn score(&self, bytes: &[u8], wanted: usize, width: RefWidth) -> WidthScore {
        let indices: Vec<u16> = bytes
            .chunks_exact(width.bytes())
            .take(wanted)
            .map(|r| width.position_index(r))
            .collect();

        let valid = !indices.is_empty() && indices.iter().all(|&i| usize::from(i) < self.vertex_count);
        let varied = indices.iter().collect::<HashSet<_>>().len() > 1;
        let sequential = !indices.is_empty()
            && indices
                .windows(2)
                .all(|w| u32::from(w[0].abs_diff(w[1])) <= self.tolerance);

        WidthScore {
            width,
            indices,
            valid,
            varied,
            sequential,
        }
    }
}

/// Bytes 1 and 2 are both zero for more than half of the sampled 4-byte references.
fn zero_padding_majority(bytes: &[u8], wanted: usize) -> bool {
    let refs: Vec<&[u8]> = bytes.chunks_exact(4).take(wanted).collect();
    let zeros = refs.iter().filter(|r| r[1] == 0 && r[2] == 0).count();
    !refs.is_empty() && zeros * 2 > refs.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(vertex_count: usize) -> FormatDetector {
        FormatDetector::new(vertex_count, &DecodeOptions::default())
    }

    fn encode(width: RefWidth, refs: &[(u16, u16)]) -> Vec<u8> {
        let mut out = Vec::new();
        for &(pos, uv) in refs {
            match width {
                RefWidth::Three => out.extend_from_slice(&[pos as u8, 0x5A, uv as u8]),
                RefWidth::Four => out.extend_from_slice(&[pos as u8, 0, 0, uv as u8]),
                RefWidth::Six => {
                    out.extend_from_slice(&pos.to_be_bytes());
                    out.extend_from_slice(&[0x12, 0x34]);
                    out.extend_from_slice(&uv.to_be_bytes());
                }
            }
        }
        out
    }

    #[test]
    fn test_narrowest_sequential_width_wins() {
        // Indices 0..8 with zeroed attribute bytes, vertex count 8.
        let bytes: Vec<u8> = (0..8u8).flat_map(|i| [i, 0, 0]).collect();
        let result = detector(8).detect(&bytes, 8);
        assert_eq!(result.width, RefWidth::Three);
        assert_eq!(result.rule, DetectionRule::Sequential);
        assert!(!result.score(RefWidth::Six).unwrap().passes());
        assert!(!result.needs_review());
    }

    #[test]
    fn test_detects_four_byte_zero_padding() {
        let refs: Vec<(u16, u16)> = (0..8).map(|i| (i * 3, i)).collect();
        let bytes = encode(RefWidth::Four, &refs);
        let result = detector(40).detect(&bytes, 8);
        assert_eq!(result.width, RefWidth::Four);
        assert_eq!(result.rule, DetectionRule::ZeroPadding);
    }

    #[test]
    fn test_detects_six_byte() {
        let refs: Vec<(u16, u16)> = (300..308).map(|i| (i, i - 300)).collect();
        let bytes = encode(RefWidth::Six, &refs);
        let result = detector(400).detect(&bytes, 8);
        assert_eq!(result.width, RefWidth::Six);
        assert_eq!(result.confidence, Confidence::High);
    }

    #[test]
    fn test_three_byte_with_large_vertex_count() {
        // A mesh with more than 255 vertices whose command only touches a low range.
        let refs: Vec<(u16, u16)> = [10, 11, 12, 11, 12, 13, 12, 13].iter().map(|&p| (p, p)).collect();
        let bytes = encode(RefWidth::Three, &refs);
        let result = detector(600).detect(&bytes, 8);
        assert_eq!(result.width, RefWidth::Three);
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let bytes = [0xF0, 0x01, 0x02, 0x30, 0x03, 0x04, 0x90, 0x05, 0x06];
        let result = detector(4).detect(&bytes, 3);
        assert_eq!(result.width, RefWidth::Three);
        assert_eq!(result.rule, DetectionRule::Default);
        assert_eq!(result.confidence, Confidence::Low);

        let empty = detector(4).detect_sample(None);
        assert_eq!(empty.width, RefWidth::Three);
    }

    #[test]
    fn test_conflicting_rules_flag_review() {
        // 6-byte refs `00 ii 00 00 00 00` also read as zero-padded 4-byte refs.
        let mut bytes = Vec::new();
        for i in 0..8u8 {
            bytes.extend_from_slice(&[0, i, 0, 0, 0, 0]);
        }
        let result = detector(16).detect(&bytes, 8);
        assert_eq!(result.width, RefWidth::Six);
        assert!(result.zero_padding);
        assert!(result.needs_review());
    }

    #[test]
    fn test_sample_window_limits_refs() {
        let bytes: Vec<u8> = (0..20u8).flat_map(|i| [i, 0x7F, i]).collect();
        let result = detector(8).detect(&bytes, 20);
        // Only the first 8 references are sampled, all below 8.
        assert_eq!(result.score(RefWidth::Three).unwrap().indices.len(), 8);
        assert_eq!(result.width, RefWidth::Three);
    }

    #[test]
    fn test_width_config_round_trip() {
        assert_eq!(RefWidth::try_from(4u8), Ok(RefWidth::Four));
        assert!(RefWidth::try_from(5u8).is_err());
        assert_eq!(u8::from(RefWidth::Six), 6);
    }
}

//! Display-list scanning.
//!
//! A node's display list is a run of GX draw commands, optionally preceded by
//! setup bytes of unknown length. Each draw command is
//! `cmd:u8, count:u16, count x reference`, where the reference width is not
//! stored anywhere and has to be detected per mesh (see [`super::detect`]).
//!
//! Scanning is split in two stages that share no state:
//!
//! 1. [`DisplayListScanner::sample`] returns the raw bytes after the first
//!    command header, enough for every candidate width.
//! 2. [`DisplayListScanner::walk`] iterates the commands at a chosen width.

use super::cursor::ByteCursor;
use super::detect::RefWidth;
use serde::Serialize;
use std::borrow::Cow;

/// GX primitive kinds that carry triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Primitive {
    Quads,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Primitive {
    /// Map a command byte to a primitive.
    #[must_use]
    pub fn from_command(byte: u8) -> Option<Self> {
        match byte {
            0x80 => Some(Primitive::Quads),
            0x90 => Some(Primitive::Triangles),
            0x98 => Some(Primitive::TriangleStrip),
            0xA0 => Some(Primitive::TriangleFan),
            _ => None,
        }
    }

    #[must_use]
    pub fn command(self) -> u8 {
        match self {
            Primitive::Quads => 0x80,
            Primitive::Triangles => 0x90,
            Primitive::TriangleStrip => 0x98,
            Primitive::TriangleFan => 0xA0,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Quads => "quads",
            Primitive::Triangles => "triangles",
            Primitive::TriangleStrip => "strip",
            Primitive::TriangleFan => "fan",
        }
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Command byte plus 16-bit count.
const COMMAND_HEADER_SIZE: usize = 3;

/// One draw command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCommand<'a> {
    pub primitive: Primitive,
    /// Declared reference count.
    pub count: u16,
    /// Offset of the command byte within the display list.
    pub offset: usize,
    /// `count x width` reference bytes. Owned only when the command was
    /// truncated and the missing tail zero-filled.
    pub refs: Cow<'a, [u8]>,
}

impl DrawCommand<'_> {
    /// Iterate the reference records at `width`.
    pub fn references(&self, width: RefWidth) -> impl Iterator<Item = &[u8]> {
        self.refs.chunks_exact(width.bytes())
    }

    #[must_use]
    pub fn is_truncated(&self) -> bool {
        matches!(self.refs, Cow::Owned(_))
    }
}

/// Where the first draw command was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StartSource {
    /// The node's display-list header offset pointed at a command byte.
    Hint,
    /// Found by scanning forward for a plausible command.
    Scan,
    /// Nothing plausible; walking from offset 0.
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayListStart {
    pub offset: usize,
    pub source: StartSource,
}

/// Why a walk ended. Offsets are relative to the display list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ScanStop {
    /// The region was consumed exactly.
    Exhausted,
    /// Only zero bytes remained.
    Padding { offset: usize },
    /// A byte that is not a draw command.
    UnrecognizedCommand { offset: usize, byte: u8 },
    /// Fewer than three bytes left for a command header.
    IncompleteHeader { offset: usize },
    /// The declared count exceeds the configured maximum.
    ImplausibleCount { offset: usize, count: u16 },
    /// The reference block ran past the region; the command was zero-filled.
    TruncatedCommand {
        offset: usize,
        declared: usize,
        available: usize,
    },
}

impl ScanStop {
    /// The walk ended at the region end or in padding.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(self, ScanStop::Exhausted | ScanStop::Padding { .. })
    }
}

/// Leading references of the first draw command, for width detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefSample<'a> {
    pub offset: usize,
    pub primitive: Primitive,
    pub count: u16,
    /// Up to `n x 6` bytes following the command header.
    pub bytes: &'a [u8],
}

/// Scanner over one node's display-list region.
#[derive(Debug, Clone, Copy)]
pub struct DisplayListScanner<'a> {
    region: &'a [u8],
    hint: usize,
    max_draw_count: u16,
}

impl<'a> DisplayListScanner<'a> {
    /// `hint` is the node's display-list header offset, a count of leading setup bytes.
    #[must_use]
    pub fn new(region: &'a [u8], hint: u32, max_draw_count: u16) -> Self {
        Self {
            region,
            hint: hint as usize,
            max_draw_count,
        }
    }

    #[must_use]
    pub fn region(&self) -> &'a [u8] {
        self.region
    }

    /// Find the first draw command.
    ///
    /// The hint is trusted when it lands on a command byte. Otherwise the region
    /// is scanned from 0 for a command byte whose count is non-zero, at most
    /// the configured maximum, and small enough for the remaining bytes at the
    /// narrowest width. Failing both, offset 0 is used.
    #[must_use]
    pub fn locate_start(&self) -> DisplayListStart {
        if self
            .region
            .get(self.hint)
            .is_some_and(|&b| Primitive::from_command(b).is_some())
        {
            return DisplayListStart {
                offset: self.hint,
                source: StartSource::Hint,
            };
        }

        let narrowest = RefWidth::Three.bytes();
        let found = (0..self.region.len()).find(|&i| {
            let Some((_, count)) = self.command_header(i) else {
                return false;
            };
            let remaining = self.region.len() - i - COMMAND_HEADER_SIZE;
            count > 0 && count <= self.max_draw_count && usize::from(count) * narrowest <= remaining
        });

        match found {
            Some(offset) => DisplayListStart {
                offset,
                source: StartSource::Scan,
            },
            None => DisplayListStart {
                offset: 0,
                source: StartSource::Default,
            },
        }
    }

    /// Stage 1: raw bytes after the command header at `start`, enough for
    /// `refs` references at the widest width. `None` if no recognized command
    /// header sits at `start`.
    #[must_use]
    pub fn sample(&self, start: usize, refs: usize) -> Option<RefSample<'a>> {
        let (primitive, count) = self.command_header(start)?;
        let body = start + COMMAND_HEADER_SIZE;
        let wanted = refs.min(usize::from(count)) * RefWidth::Six.bytes();
        let end = body.saturating_add(wanted).min(self.region.len());
        Some(RefSample {
            offset: start,
            primitive,
            count,
            bytes: &self.region[body..end],
        })
    }

    /// Stage 2: walk the draw commands from `start` at `width`.
    #[must_use]
    pub fn walk(&self, start: usize, width: RefWidth) -> DrawCommands<'a> {
        DrawCommands {
            region: self.region,
            position: start,
            width,
            max_draw_count: self.max_draw_count,
            stop: None,
        }
    }

    fn command_header(&self, offset: usize) -> Option<(Primitive, u16)> {
        let mut cursor = ByteCursor::at(self.region, offset);
        let primitive = Primitive::from_command(cursor.read_u8().ok()?)?;
        let count = cursor.read_u16().ok()?;
        Some((primitive, count))
    }
}

/// Iterator over draw commands. Fused once a [`ScanStop`] is recorded.
#[derive(Debug, Clone)]
pub struct DrawCommands<'a> {
    region: &'a [u8],
    position: usize,
    width: RefWidth,
    max_draw_count: u16,
    stop: Option<ScanStop>,
}

impl DrawCommands<'_> {
    /// Why the walk ended, once it has.
    #[must_use]
    pub fn stop_reason(&self) -> Option<ScanStop> {
        self.stop
    }

    fn halt<T>(&mut self, reason: ScanStop) -> Option<T> {
        self.stop = Some(reason);
        None
    }
}

impl<'a> Iterator for DrawCommands<'a> {
    type Item = DrawCommand<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop.is_some() {
            return None;
        }

        let region = self.region;
        let offset = self.position;
        let Some(rest) = region.get(offset..).filter(|r| !r.is_empty()) else {
            return self.halt(ScanStop::Exhausted);
        };

        let mut cursor = ByteCursor::new(rest);
        let byte = rest[0];
        let Some(primitive) = Primitive::from_command(byte) else {
            if rest.iter().all(|&b| b == 0) {
                return self.halt(ScanStop::Padding { offset });
            }
            return self.halt(ScanStop::UnrecognizedCommand { offset, byte });
        };

        cursor.seek(1);
        let Ok(count) = cursor.read_u16() else {
            return self.halt(ScanStop::IncompleteHeader { offset });
        };
        if count > self.max_draw_count {
            return self.halt(ScanStop::ImplausibleCount { offset, count });
        }

        let declared = usize::from(count) * self.width.bytes();
        let available = cursor.remaining();
        let refs = if declared <= available {
            self.position = offset + COMMAND_HEADER_SIZE + declared;
            Cow::Borrowed(&rest[COMMAND_HEADER_SIZE..COMMAND_HEADER_SIZE + declared])
        } else {
            tracing::warn!(
                "Draw command at {:#x} declares {} reference bytes but only {} remain, zero-filling",
                offset,
                declared,
                available
            );
            self.stop = Some(ScanStop::TruncatedCommand {
                offset,
                declared,
                available,
            });
            let mut owned = rest[COMMAND_HEADER_SIZE..].to_vec();
            owned.resize(declared, 0);
            Cow::Owned(owned)
        };

        Some(DrawCommand {
            primitive,
            count,
            offset,
            refs,
        })
    }
}

impl std::iter::FusedIterator for DrawCommands<'_> {}

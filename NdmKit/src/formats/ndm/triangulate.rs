//! Primitive triangulation.

use super::detect::{RefWidth, VertexRef};
use super::display_list::{DrawCommand, Primitive};

/// Triangles of a primitive with `n` references, as reference positions.
///
/// Quads split along `v0-v2`, strips alternate winding, fans pivot on `v0`.
/// Incomplete trailing quads and triangles are ignored.
#[must_use]
pub fn primitive_triangles(primitive: Primitive, n: usize) -> Vec<[usize; 3]> {
    match primitive {
        Primitive::Quads => (0..n / 4)
            .flat_map(|q| {
                let b = q * 4;
                [[b, b + 1, b + 2], [b, b + 2, b + 3]]
            })
            .collect(),
        Primitive::Triangles => (0..n / 3).map(|t| [t * 3, t * 3 + 1, t * 3 + 2]).collect(),
        Primitive::TriangleStrip => (2..n)
            .map(|i| {
                if i % 2 == 0 {
                    [i - 2, i - 1, i]
                } else {
                    [i - 1, i - 2, i]
                }
            })
            .collect(),
        Primitive::TriangleFan => (1..n.saturating_sub(1)).map(|i| [0, i, i + 1]).collect(),
    }
}

/// Faces produced from a mesh's draw commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Triangulation {
    pub faces: Vec<[u32; 3]>,
    /// Index-aligned with `faces`. `None` marks an out-of-range UV index.
    pub uv_faces: Vec<[Option<u32>; 3]>,
    /// Triangles discarded for referencing a vertex past the vertex count.
    pub dropped_triangles: usize,
    /// Corners whose UV index was past the UV count.
    pub defaulted_uvs: usize,
    /// Triangles discarded for repeating a vertex (only when culling).
    pub culled_degenerate: usize,
}

/// Accumulates triangles from successive draw commands of one mesh.
#[derive(Debug)]
pub struct Triangulator {
    vertex_count: usize,
    uv_count: usize,
    cull_degenerate: bool,
    out: Triangulation,
}

impl Triangulator {
    #[must_use]
    pub fn new(vertex_count: usize, uv_count: usize, cull_degenerate: bool) -> Self {
        Self {
            vertex_count,
            uv_count,
            cull_degenerate,
            out: Triangulation::default(),
        }
    }

    /// Triangulate one draw command whose references are `width` bytes wide.
    pub fn push(&mut self, command: &DrawCommand<'_>, width: RefWidth) {
        let refs: Vec<VertexRef> = command.references(width).map(|r| width.decode(r)).collect();
        for corners in primitive_triangles(command.primitive, refs.len()) {
            let tri = corners.map(|c| refs[c]);
            self.emit(tri);
        }
    }

    fn emit(&mut self, tri: [VertexRef; 3]) {
        if tri.iter().any(|r| usize::from(r.position) >= self.vertex_count) {
            self.out.dropped_triangles += 1;
            return;
        }

        let face = tri.map(|r| u32::from(r.position));
        if self.cull_degenerate && (face[0] == face[1] || face[1] == face[2] || face[0] == face[2]) {
            self.out.culled_degenerate += 1;
            return;
        }

        let uv_face = tri.map(|r| (usize::from(r.uv) < self.uv_count).then_some(u32::from(r.uv)));
        self.out.defaulted_uvs += uv_face.iter().filter(|uv| uv.is_none()).count();

        self.out.faces.push(face);
        self.out.uv_faces.push(uv_face);
    }

    #[must_use]
    pub fn finish(self) -> Triangulation {
        self.out
    }
}

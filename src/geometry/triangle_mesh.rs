use crate::error::SpatialSplitError;
use crate::geometry::prim_info::PrimInfo;
use crate::geometry::prim_ref::PrimRef;
use crate::utilities::bounding_box::BoundingBox;
use glam::Vec3;

/// Read-only access to triangle geometry by (mesh id, primitive id).
///
/// Binning workers share one source, so implementations used with parallel binning must be `Sync`.
pub trait TriangleSource {
    /// Returns the three vertex positions of a triangle.
    fn triangle_vertices(&self, geom_id: u32, prim_id: u32) -> [Vec3; 3];
}

/// Indexed triangle mesh with validated indices.
#[derive(Clone, Debug, Default)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Creates a mesh, rejecting index triples that reference missing vertices.
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Result<Self, SpatialSplitError> {
        for (triangle, indices) in triangles.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(SpatialSplitError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }
        Ok(Self {
            vertices,
            triangles,
        })
    }

    #[inline(always)]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline(always)]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Gets the position of a vertex.
    #[inline(always)]
    pub fn vertex(&self, index: u32) -> Vec3 {
        self.vertices[index as usize]
    }

    /// Gets the vertex indices of a triangle.
    #[inline(always)]
    pub fn triangle(&self, prim_id: u32) -> [u32; 3] {
        self.triangles[prim_id as usize]
    }

    /// Gets the vertex positions of a triangle.
    #[inline(always)]
    pub fn vertices_of(&self, prim_id: u32) -> [Vec3; 3] {
        let [a, b, c] = self.triangle(prim_id);
        [self.vertex(a), self.vertex(b), self.vertex(c)]
    }

    /// Computes the bounding box of a triangle.
    #[inline]
    pub fn triangle_bounds(&self, prim_id: u32) -> BoundingBox {
        BoundingBox::from_points(&self.vertices_of(prim_id))
    }

    /// Whether every vertex of the triangle has finite coordinates.
    #[inline]
    pub fn is_valid(&self, prim_id: u32) -> bool {
        self.vertices_of(prim_id).iter().all(|v| v.is_finite())
    }
}

/// Single meshes can act as a source directly; the mesh id is ignored.
impl TriangleSource for TriangleMesh {
    #[inline(always)]
    fn triangle_vertices(&self, _geom_id: u32, prim_id: u32) -> [Vec3; 3] {
        self.vertices_of(prim_id)
    }
}

/// Collection of meshes addressed by their position in the scene.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    meshes: Vec<TriangleMesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mesh and returns its id.
    pub fn add_mesh(&mut self, mesh: TriangleMesh) -> u32 {
        self.meshes.push(mesh);
        (self.meshes.len() - 1) as u32
    }

    #[inline(always)]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Looks up a mesh by id.
    pub fn mesh(&self, geom_id: u32) -> Result<&TriangleMesh, SpatialSplitError> {
        self.meshes
            .get(geom_id as usize)
            .ok_or(SpatialSplitError::UnknownMesh { geom_id })
    }

    /// Creates one reference per valid triangle of every mesh, along with the summary of all of them.
    ///
    /// Triangles with non-finite vertices are skipped.
    pub fn create_prim_refs(&self) -> (Vec<PrimRef>, PrimInfo) {
        let mut prims = Vec::with_capacity(self.meshes.iter().map(TriangleMesh::triangle_count).sum());
        let mut info = PrimInfo::empty();
        for (geom_id, mesh) in self.meshes.iter().enumerate() {
            for prim_id in 0..mesh.triangle_count() as u32 {
                if !mesh.is_valid(prim_id) {
                    continue;
                }
                let bounds = mesh.triangle_bounds(prim_id);
                info.add(&bounds);
                prims.push(PrimRef::new(bounds, geom_id as u32, prim_id));
            }
        }
        (prims, info)
    }
}

impl TriangleSource for Scene {
    #[inline(always)]
    fn triangle_vertices(&self, geom_id: u32, prim_id: u32) -> [Vec3; 3] {
        debug_assert!(
            (geom_id as usize) < self.meshes.len(),
            "Primitive references must point into the scene they were created from."
        );
        self.meshes[geom_id as usize].vertices_of(prim_id)
    }
}

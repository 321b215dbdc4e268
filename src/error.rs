use thiserror::Error;

/// Errors reported by mesh storage and parallel binning.
///
/// Numerical degeneracy (flat axes, empty clip fragments, no beneficial split) is never an
/// error; it shows up as data in the binning results instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpatialSplitError {
    #[error("triangle {triangle} references vertex {index}, but the mesh only has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("the scene has no mesh with id {geom_id}")]
    UnknownMesh { geom_id: u32 },
    #[error("a spatial binning worker panicked")]
    WorkerPanicked,
}

pub mod prim_info;
pub mod prim_ref;
pub mod triangle_mesh;

pub use self::prim_info::PrimInfo;
pub use self::prim_ref::PrimRef;
pub use self::triangle_mesh::{Scene, TriangleMesh, TriangleSource};

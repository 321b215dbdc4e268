use crate::builders::spatial_bin_mapping::SpatialBinMapping;
use crate::builders::spatial_bin_split::{Axis, SpatialBinSplit};
use crate::builders::triangle_splitter::split_triangle;
use crate::geometry::prim_info::PrimInfo;
use crate::geometry::prim_ref::PrimRef;
use crate::geometry::triangle_mesh::TriangleSource;
use crate::utilities::bounding_box::BoundingBox;
use crate::utilities::math_helper;
use glam::{UVec3, Vec3};
use log::{debug, trace};
use std::ops::Range;

/// Stores all binning information for spatial splits.
///
/// Every axis is binned independently: `bounds[bin][dim]` holds the clipped fragments that
/// fell into `bin` along `dim`, and lane `dim` of `num_begin`/`num_end` counts the primitives
/// whose fragments start/end in that bin. Summed over the bins, each lane of `num_begin` and
/// `num_end` equals the number of primitives binned.
#[repr(C, align(64))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialBinInfo<const BINS: usize> {
    bounds: [[BoundingBox; 3]; BINS],
    num_begin: [UVec3; BINS],
    num_end: [UVec3; BINS],
}

impl<const BINS: usize> Default for SpatialBinInfo<BINS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BINS: usize> SpatialBinInfo<BINS> {
    /// Creates cleared bins.
    #[inline]
    pub fn new() -> Self {
        let () = SpatialBinMapping::<BINS>::BIN_COUNT_CHECK;
        Self {
            bounds: [[BoundingBox::EMPTY; 3]; BINS],
            num_begin: [UVec3::ZERO; BINS],
            num_end: [UVec3::ZERO; BINS],
        }
    }

    /// Clears the bin info.
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Bounds of the fragments binned into `bin` along `dim`.
    #[inline(always)]
    pub fn bin_bounds(&self, bin: usize, dim: usize) -> &BoundingBox {
        &self.bounds[bin][dim]
    }

    /// Per bin count of primitives whose fragments start in that bin along `dim`.
    pub fn num_begin(&self, dim: usize) -> [u32; BINS] {
        std::array::from_fn(|bin| self.num_begin[bin][dim])
    }

    /// Per bin count of primitives whose fragments end in that bin along `dim`.
    pub fn num_end(&self, dim: usize) -> [u32; BINS] {
        std::array::from_fn(|bin| self.num_end[bin][dim])
    }

    /// Bins an array of triangle references.
    ///
    /// References straddling bin boundaries are clipped against each boundary using the exact
    /// triangle geometry, so every bin only receives the part of the triangle inside it.
    pub fn bin<S: TriangleSource + ?Sized>(
        &mut self,
        source: &S,
        prims: &[PrimRef],
        mapping: &SpatialBinMapping<BINS>,
    ) {
        for prim in prims {
            let vertices = source.triangle_vertices(prim.geom_id, prim.prim_id);
            let bin0 = mapping.bin(prim.bounds.min);
            let bin1 = mapping.bin(prim.bounds.max);

            for dim in 0..3 {
                let first = bin0[dim] as usize;
                let last = bin1[dim] as usize;
                debug_assert!(first <= last);

                if first == last {
                    self.bounds[first][dim].extend(&prim.bounds);
                    self.num_begin[first][dim] += 1;
                    self.num_end[first][dim] += 1;
                    continue;
                }

                // The primitive is counted from the first bin that received a non-empty fragment
                // to the last one; a sliver that clips to nothing must not occupy a boundary bin.
                let mut occupied: Option<(usize, usize)> = None;
                let mut rest = *prim;
                for bin in first..last {
                    let pos = mapping.pos(bin + 1, dim);
                    let (left, right) = split_triangle(&rest, dim, pos, &vertices);
                    if !left.is_empty() {
                        self.bounds[bin][dim].extend(&left.bounds);
                        occupied = Some(occupied.map_or((bin, bin), |(l, _)| (l, bin)));
                    }
                    rest = right;
                }
                if !rest.is_empty() {
                    self.bounds[last][dim].extend(&rest.bounds);
                    occupied = Some(occupied.map_or((last, last), |(l, _)| (l, last)));
                }

                // Clipping can only lose the whole primitive if its bounds miss its own geometry.
                let (l, r) = occupied.unwrap_or((first, last));
                self.num_begin[l][dim] += 1;
                self.num_end[r][dim] += 1;
            }
        }
    }

    /// Bins a range of references inside an array.
    #[inline]
    pub fn bin_range<S: TriangleSource + ?Sized>(
        &mut self,
        source: &S,
        prims: &[PrimRef],
        range: Range<usize>,
        mapping: &SpatialBinMapping<BINS>,
    ) {
        self.bin(source, &prims[range], mapping);
    }

    /// Merges in other binning information.
    ///
    /// Bounds are combined by box union and counts by addition, so merging is associative and
    /// commutative; partial results may be merged in any order.
    pub fn merge(&mut self, other: &Self) {
        for i in 0..BINS {
            self.num_begin[i] += other.num_begin[i];
            self.num_end[i] += other.num_end[i];
            for dim in 0..3 {
                self.bounds[i][dim].extend(&other.bounds[i][dim]);
            }
        }
    }

    /// Finds the best split by scanning the binning information.
    ///
    /// All three axes are swept in lockstep, one vector lane each. Equal costs resolve to the
    /// lowest boundary and then to the first axis in x, y, z order. Returns the invalid split if
    /// no axis has a usable boundary or if the best split costs more than keeping `pinfo` as
    /// one leaf.
    pub fn best(
        &self,
        pinfo: &PrimInfo,
        mapping: &SpatialBinMapping<BINS>,
        blocks_shift: u32,
    ) -> SpatialBinSplit<BINS> {
        debug_assert!(pinfo.size() > 0, "Cannot split an empty range.");

        // Sweep from right to left and compute the suffix areas and counts.
        let mut r_areas = [Vec3::ZERO; BINS];
        let mut r_counts = [UVec3::ZERO; BINS];
        let mut count = UVec3::ZERO;
        let mut sweep = [BoundingBox::EMPTY; 3];
        for i in (1..BINS).rev() {
            count += self.num_end[i];
            r_counts[i] = count;
            r_areas[i] = Self::extend_sweep(&mut sweep, &self.bounds[i]);
        }

        // Sweep from left to right and compute the SAH of every boundary.
        let mut best_sah = Vec3::splat(f32::INFINITY);
        let mut best_pos = UVec3::ZERO;
        count = UVec3::ZERO;
        sweep = [BoundingBox::EMPTY; 3];
        for i in 1..BINS {
            count += self.num_begin[i - 1];
            let l_area = Self::extend_sweep(&mut sweep, &self.bounds[i - 1]);
            let l_blocks = math_helper::block_count(count, blocks_shift);
            let r_blocks = math_helper::block_count(r_counts[i], blocks_shift);
            let sah = l_area * l_blocks.as_vec3() + r_areas[i] * r_blocks.as_vec3();
            // Boundaries with nothing on one side are not splits.
            let improves = sah.cmplt(best_sah) & count.cmpne(UVec3::ZERO) & r_counts[i].cmpne(UVec3::ZERO);
            best_pos = UVec3::select(improves, UVec3::splat(i as u32), best_pos);
            best_sah = Vec3::select(improves, sah, best_sah);
        }
        trace!("spatial split sweep: best sah {} at bins {}", best_sah, best_pos);

        // Find the best dimension.
        let mut best: Option<(Axis, f32, usize)> = None;
        for axis in Axis::ALL {
            let dim = axis.index();
            // Ignore zero sized dimensions.
            if mapping.invalid(dim) || best_pos[dim] == 0 {
                continue;
            }
            if best.map_or(true, |(_, sah, _)| best_sah[dim] < sah) {
                best = Some((axis, best_sah[dim], best_pos[dim] as usize));
            }
        }

        match best {
            Some((dim, sah, pos)) if sah <= pinfo.leaf_sah(blocks_shift) => {
                SpatialBinSplit::new(sah, dim, pos, *mapping)
            }
            Some((dim, sah, pos)) => {
                debug!(
                    "spatial split along {:?} at bin {} costs {}, more than a leaf ({})",
                    dim,
                    pos,
                    sah,
                    pinfo.leaf_sah(blocks_shift)
                );
                SpatialBinSplit::default()
            }
            None => {
                debug!("no spatial split found for {} primitives", pinfo.size());
                SpatialBinSplit::default()
            }
        }
    }

    /// Extends each axis' running box with that axis' bin bounds and returns the half areas.
    #[inline(always)]
    fn extend_sweep(sweep: &mut [BoundingBox; 3], bounds: &[BoundingBox; 3]) -> Vec3 {
        for (running, bin_bounds) in sweep.iter_mut().zip(bounds) {
            running.extend(bin_bounds);
        }
        Vec3::new(sweep[0].half_area(), sweep[1].half_area(), sweep[2].half_area())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::triangle_mesh::{Scene, TriangleMesh};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const SEED: u64 = 0x6246_A426_A242_4AC1;

    /// Triangles scattered through a cube, large enough that most straddle several bins.
    fn random_scene(count: usize, space_size: f32, triangle_size: f32) -> Scene {
        let mut rng = ChaCha8Rng::seed_from_u64(SEED);
        let mut random = || Vec3::new(rng.gen(), rng.gen(), rng.gen());
        let mut vertices = Vec::with_capacity(count * 3);
        for _ in 0..count {
            let center = random() * space_size;
            for _ in 0..3 {
                vertices.push(center + (random() - Vec3::splat(0.5)) * triangle_size);
            }
        }
        let triangles = (0..count as u32).map(|i| [3 * i, 3 * i + 1, 3 * i + 2]).collect();
        let mut scene = Scene::new();
        scene.add_mesh(TriangleMesh::new(vertices, triangles).unwrap());
        scene
    }

    fn mesh_of(triangles: &[[Vec3; 3]]) -> TriangleMesh {
        let vertices = triangles.iter().flatten().copied().collect();
        let indices = (0..triangles.len() as u32).map(|i| [3 * i, 3 * i + 1, 3 * i + 2]).collect();
        TriangleMesh::new(vertices, indices).unwrap()
    }

    fn prims_of(mesh: &TriangleMesh) -> (Vec<PrimRef>, PrimInfo) {
        let prims: Vec<_> = (0..mesh.triangle_count() as u32)
            .map(|i| PrimRef::new(mesh.triangle_bounds(i), 0, i))
            .collect();
        let pinfo = PrimInfo::from_prims(&prims);
        (prims, pinfo)
    }

    fn sum(counts: &[u32]) -> u32 {
        counts.iter().sum()
    }

    #[test]
    fn test_count_conservation() {
        let scene = random_scene(500, 10.0, 3.0);
        let (prims, pinfo) = scene.create_prim_refs();
        let mapping = SpatialBinMapping::<16>::new(&pinfo);
        let mut info = SpatialBinInfo::<16>::new();
        info.bin(&scene, &prims, &mapping);

        for dim in 0..3 {
            assert_eq!(sum(&info.num_begin(dim)), prims.len() as u32);
            assert_eq!(sum(&info.num_end(dim)), prims.len() as u32);
        }
    }

    #[test]
    fn test_fragments_stay_inside_bins() {
        let scene = random_scene(200, 10.0, 4.0);
        let (prims, pinfo) = scene.create_prim_refs();
        let mapping = SpatialBinMapping::<8>::new(&pinfo);
        let mut info = SpatialBinInfo::<8>::new();
        info.bin(&scene, &prims, &mapping);

        for dim in 0..3 {
            for bin in 0..8 {
                let bounds = info.bin_bounds(bin, dim);
                if bounds.is_empty() {
                    continue;
                }
                assert!(pinfo.geom_bounds.encloses(bounds));
                // Unclipped primitives are placed by the forward mapping, which may round by an ulp.
                if bin > 0 {
                    assert!(bounds.min[dim] >= mapping.pos(bin, dim) - 1e-4);
                }
                if bin + 1 < 8 {
                    assert!(bounds.max[dim] <= mapping.pos(bin + 1, dim) + 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let scene = random_scene(300, 8.0, 2.5);
        let (prims, pinfo) = scene.create_prim_refs();
        let mapping = SpatialBinMapping::<16>::new(&pinfo);

        let mut whole = SpatialBinInfo::<16>::new();
        whole.bin(&scene, &prims, &mapping);

        let mut a = SpatialBinInfo::<16>::new();
        a.bin_range(&scene, &prims, 0..117, &mapping);
        let mut b = SpatialBinInfo::<16>::new();
        b.bin_range(&scene, &prims, 117..prims.len(), &mapping);

        let mut ab = a;
        ab.merge(&b);
        let mut ba = b;
        ba.merge(&a);

        assert_eq!(ab, whole);
        assert_eq!(ba, whole);
    }

    #[test]
    fn test_clear() {
        let scene = random_scene(10, 4.0, 1.0);
        let (prims, pinfo) = scene.create_prim_refs();
        let mapping = SpatialBinMapping::<4>::new(&pinfo);
        let mut info = SpatialBinInfo::<4>::new();
        info.bin(&scene, &prims, &mapping);
        info.clear();
        assert_eq!(info, SpatialBinInfo::<4>::default());
    }

    /// Four triangles, each inside its own bin along x and spanning the unit square in y and z.
    fn four_in_a_row() -> TriangleMesh {
        let ranges = [(0.0, 0.96), (1.06, 1.97), (2.07, 2.98), (3.08, 4.0)];
        let triangles: Vec<_> = ranges
            .iter()
            .map(|&(x0, x1)| {
                [
                    Vec3::new(x0, 0.0, 0.0),
                    Vec3::new(x1, 0.0, 0.0),
                    Vec3::new(x0, 1.0, 1.0),
                ]
            })
            .collect();
        mesh_of(&triangles)
    }

    #[test]
    fn test_balanced_split() {
        let mesh = four_in_a_row();
        let (prims, pinfo) = prims_of(&mesh);
        let mapping = SpatialBinMapping::<4>::new(&pinfo);
        let mut info = SpatialBinInfo::<4>::new();
        info.bin(&mesh, &prims, &mapping);
        assert_eq!(info.num_begin(0), [1, 1, 1, 1]);
        assert_eq!(info.num_end(0), [1, 1, 1, 1]);

        let split = info.best(&pinfo, &mapping, 0);
        assert!(split.is_valid());
        assert_eq!(split.dim, Some(Axis::X));
        assert_eq!(split.pos, 2);

        let left = BoundingBox::create_merged_boxes(&prims[0].bounds, &prims[1].bounds);
        let right = BoundingBox::create_merged_boxes(&prims[2].bounds, &prims[3].bounds);
        let expected = left.half_area() * 2.0 + right.half_area() * 2.0;
        assert!((split.sah - expected).abs() <= expected * 1e-6);
        assert!(split.sah <= pinfo.leaf_sah(0));
    }

    #[test]
    fn test_blocks_shift() {
        let mesh = four_in_a_row();
        let (prims, pinfo) = prims_of(&mesh);
        let mapping = SpatialBinMapping::<4>::new(&pinfo);
        let mut info = SpatialBinInfo::<4>::new();
        info.bin(&mesh, &prims, &mapping);

        // Blocks of two: the balanced split needs one block per side.
        let split = info.best(&pinfo, &mapping, 1);
        assert_eq!((split.dim, split.pos), (Some(Axis::X), 2));

        // Blocks of four: all four primitives fit one block on either side, so duplicating them
        // into two thin halves along y beats separating them along x.
        let split = info.best(&pinfo, &mapping, 2);
        assert_eq!((split.dim, split.pos), (Some(Axis::Y), 2));
        assert!(split.sah <= pinfo.leaf_sah(2));
    }

    #[test]
    fn test_sliver_in_upper_bin() {
        let mapping = SpatialBinMapping::<4>::from_bounds(&BoundingBox::new(Vec3::ZERO, Vec3::splat(4.0)));
        let vertices = [
            Vec3::new(0.0, 0.5, 0.5),
            Vec3::new(0.4, 0.6, 0.5),
            Vec3::new(0.3, 0.7, 0.9),
        ];
        let mesh = mesh_of(&[vertices]);
        // The reference's box reaches into bin 1 even though the triangle does not.
        let mut bounds = mesh.triangle_bounds(0);
        bounds.max.x = 1.5;
        let prim = PrimRef::new(bounds, 0, 0);
        assert_eq!(mapping.bin(bounds.max).x, 1);

        let mut info = SpatialBinInfo::<4>::new();
        info.bin(&mesh, &[prim], &mapping);
        assert_eq!(info.num_begin(0), [1, 0, 0, 0]);
        assert_eq!(info.num_end(0), [1, 0, 0, 0]);
        assert!(info.bin_bounds(1, 0).is_empty());
        assert_eq!(*info.bin_bounds(0, 0), mesh.triangle_bounds(0));
    }

    #[test]
    fn test_vertex_touching_boundary() {
        let mapping = SpatialBinMapping::<4>::from_bounds(&BoundingBox::new(Vec3::ZERO, Vec3::splat(4.0)));
        let boundary = mapping.pos(1, 0);
        let mesh = mesh_of(&[[
            Vec3::new(0.2, 0.5, 0.5),
            Vec3::new(boundary, 0.6, 0.5),
            Vec3::new(0.3, 0.7, 0.9),
        ]]);
        let prim = PrimRef::new(mesh.triangle_bounds(0), 0, 0);

        let mut info = SpatialBinInfo::<4>::new();
        info.bin(&mesh, &[prim], &mapping);
        // Whether the tip rounds into bin 1 or not, the triangle only occupies bin 0.
        assert_eq!(info.num_begin(0), [1, 0, 0, 0]);
        assert_eq!(info.num_end(0), [1, 0, 0, 0]);
        assert!(info.bin_bounds(1, 0).is_empty());
    }

    #[test]
    fn test_sliver_in_lower_bin() {
        let mapping = SpatialBinMapping::<4>::from_bounds(&BoundingBox::new(Vec3::ZERO, Vec3::splat(4.0)));
        let mesh = mesh_of(&[[
            Vec3::new(3.5, 0.5, 0.5),
            Vec3::new(3.9, 0.6, 0.5),
            Vec3::new(3.6, 0.7, 0.9),
        ]]);
        let mut bounds = mesh.triangle_bounds(0);
        bounds.min.x = 1.5;
        let prim = PrimRef::new(bounds, 0, 0);

        let mut info = SpatialBinInfo::<4>::new();
        info.bin(&mesh, &[prim], &mapping);
        assert_eq!(info.num_begin(0), [0, 0, 0, 1]);
        assert_eq!(info.num_end(0), [0, 0, 0, 1]);
        assert!(info.bin_bounds(1, 0).is_empty());
        assert!(info.bin_bounds(2, 0).is_empty());
    }

    #[test]
    fn test_degenerate_axis_excluded() {
        // Every triangle lies in the plane z = 2.
        let mut rng = ChaCha8Rng::seed_from_u64(SEED);
        let triangles: Vec<_> = (0..64)
            .map(|_| {
                let base = Vec3::new(rng.gen::<f32>() * 10.0, rng.gen::<f32>() * 10.0, 2.0);
                [base, base + Vec3::new(0.5, 0.0, 0.0), base + Vec3::new(0.0, 0.5, 0.0)]
            })
            .collect();
        let mesh = mesh_of(&triangles);
        let (prims, pinfo) = prims_of(&mesh);
        let mapping = SpatialBinMapping::<16>::new(&pinfo);
        assert!(mapping.invalid(2));

        let mut info = SpatialBinInfo::<16>::new();
        info.bin(&mesh, &prims, &mapping);
        let split = info.best(&pinfo, &mapping, 0);
        assert!(split.is_valid());
        assert_ne!(split.dim, Some(Axis::Z));
    }

    #[test]
    fn test_cost_never_exceeds_leaf() {
        let scene = random_scene(400, 10.0, 6.0);
        let (prims, pinfo) = scene.create_prim_refs();
        let mapping = SpatialBinMapping::<32>::new(&pinfo);
        let mut info = SpatialBinInfo::<32>::new();
        info.bin(&scene, &prims, &mapping);
        for blocks_shift in 0..4 {
            let split = info.best(&pinfo, &mapping, blocks_shift);
            if split.is_valid() {
                assert!(split.sah >= 0.0);
                assert!(split.sah <= pinfo.leaf_sah(blocks_shift));
            } else {
                assert_eq!(split.sah, f32::INFINITY);
            }
        }
    }

    /// The closed surface of the cube `[0, 4]^3`, two triangles per face.
    fn cube_surface() -> TriangleMesh {
        let s = 4.0;
        let faces = [
            [[0.0, 0.0, 0.0], [0.0, s, 0.0], [0.0, s, s], [0.0, 0.0, s]],
            [[s, 0.0, 0.0], [s, s, 0.0], [s, s, s], [s, 0.0, s]],
            [[0.0, 0.0, 0.0], [s, 0.0, 0.0], [s, 0.0, s], [0.0, 0.0, s]],
            [[0.0, s, 0.0], [s, s, 0.0], [s, s, s], [0.0, s, s]],
            [[0.0, 0.0, 0.0], [s, 0.0, 0.0], [s, s, 0.0], [0.0, s, 0.0]],
            [[0.0, 0.0, s], [s, 0.0, s], [s, s, s], [0.0, s, s]],
        ];
        let triangles: Vec<_> = faces
            .iter()
            .flat_map(|face| {
                let [a, b, c, d] = (*face).map(Vec3::from_array);
                [[a, b, c], [a, c, d]]
            })
            .collect();
        mesh_of(&triangles)
    }

    #[test]
    fn test_closed_box_yields_no_split() {
        // Every plane cuts through the four side faces, so both halves keep the full cross
        // section and ten of the twelve triangles; that is never cheaper than one leaf.
        let mesh = cube_surface();
        let (prims, pinfo) = prims_of(&mesh);
        let mapping = SpatialBinMapping::<8>::new(&pinfo);
        let mut info = SpatialBinInfo::<8>::new();
        info.bin(&mesh, &prims, &mapping);
        for dim in 0..3 {
            assert_eq!(info.num_begin(dim), [10, 0, 0, 0, 0, 0, 0, 2]);
            assert_eq!(info.num_end(dim), [2, 0, 0, 0, 0, 0, 0, 10]);
        }

        let split = info.best(&pinfo, &mapping, 0);
        assert!(!split.is_valid());
        assert_eq!(split.sah, f32::INFINITY);
    }

    /// Two unit cubes' worth of fragments in the outer bins along every axis.
    fn symmetric_bins() -> (SpatialBinInfo<4>, PrimInfo, SpatialBinMapping<4>) {
        let outer = BoundingBox::new(Vec3::ZERO, Vec3::splat(4.0));
        let mut info = SpatialBinInfo::<4>::new();
        info.bounds[0] = [BoundingBox::new(Vec3::ZERO, Vec3::ONE); 3];
        info.bounds[3] = [BoundingBox::new(Vec3::splat(3.0), Vec3::splat(4.0)); 3];
        info.num_begin[0] = UVec3::ONE;
        info.num_end[0] = UVec3::ONE;
        info.num_begin[3] = UVec3::ONE;
        info.num_end[3] = UVec3::ONE;
        let pinfo = PrimInfo::new(0, 2, outer, outer);
        (info, pinfo, SpatialBinMapping::from_bounds(&outer))
    }

    #[test]
    fn test_ties_prefer_lowest_boundary_and_first_axis() {
        let (info, pinfo, mapping) = symmetric_bins();
        let split = info.best(&pinfo, &mapping, 0);
        assert_eq!(split.dim, Some(Axis::X));
        assert_eq!(split.pos, 1);
        assert_eq!(split.sah, 6.0);
    }

    #[test]
    fn test_ties_skip_degenerate_axis() {
        let (info, pinfo, _) = symmetric_bins();
        let flat_x = BoundingBox::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 4.0));
        let mapping = SpatialBinMapping::from_bounds(&flat_x);
        let split = info.best(&pinfo, &mapping, 0);
        assert_eq!(split.dim, Some(Axis::Y));
        assert_eq!(split.pos, 1);
    }

    #[test]
    #[should_panic(expected = "Cannot split an empty range.")]
    fn test_best_on_empty_range() {
        let (info, _, mapping) = symmetric_bins();
        info.best(&PrimInfo::empty(), &mapping, 0);
    }
}

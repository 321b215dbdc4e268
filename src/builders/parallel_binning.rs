use crate::builders::settings::SpatialBinningSettings;
use crate::builders::spatial_bin_info::SpatialBinInfo;
use crate::builders::spatial_bin_mapping::SpatialBinMapping;
use crate::builders::spatial_bin_split::SpatialBinSplit;
use crate::error::SpatialSplitError;
use crate::geometry::prim_info::PrimInfo;
use crate::geometry::prim_ref::PrimRef;
use crate::geometry::triangle_mesh::TriangleSource;
use crossbeam_utils::thread;
use log::debug;

/// Bins `prims` on up to `settings.worker_count` threads and merges the partial results.
///
/// Each worker owns its bins and only reads `source` and `mapping`. Merging is a box union, so
/// the result equals single-threaded binning of the whole slice.
pub fn bin_parallel<S, const BINS: usize>(
    source: &S,
    prims: &[PrimRef],
    mapping: &SpatialBinMapping<BINS>,
    settings: &SpatialBinningSettings,
) -> Result<SpatialBinInfo<BINS>, SpatialSplitError>
where
    S: TriangleSource + Sync + ?Sized,
{
    let worker_count = settings.worker_count.max(1);
    let chunk_size = prims
        .len()
        .div_ceil(worker_count)
        .max(settings.minimum_task_size.max(1));

    let mut merged = SpatialBinInfo::new();
    if prims.len() <= chunk_size {
        merged.bin(source, prims, mapping);
        return Ok(merged);
    }

    debug!(
        "binning {} primitive references in {} chunks of up to {}",
        prims.len(),
        prims.len().div_ceil(chunk_size),
        chunk_size
    );
    let partials = thread::scope(|scope| {
        let handles: Vec<_> = prims
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move |_| {
                    let mut local = SpatialBinInfo::<BINS>::new();
                    local.bin(source, chunk, mapping);
                    local
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Result<Vec<_>, _>>()
    })
    .map_err(|_| SpatialSplitError::WorkerPanicked)?
    .map_err(|_| SpatialSplitError::WorkerPanicked)?;

    for partial in &partials {
        merged.merge(partial);
    }
    Ok(merged)
}

/// Computes the mapping for `pinfo`, bins `prims` and returns the best spatial split.
///
/// `prims` must be the references summarized by `pinfo`.
pub fn find_spatial_split<S, const BINS: usize>(
    source: &S,
    prims: &[PrimRef],
    pinfo: &PrimInfo,
    settings: &SpatialBinningSettings,
) -> Result<SpatialBinSplit<BINS>, SpatialSplitError>
where
    S: TriangleSource + Sync + ?Sized,
{
    debug_assert_eq!(prims.len(), pinfo.size());
    let mapping = SpatialBinMapping::<BINS>::new(pinfo);
    let bins = bin_parallel(source, prims, &mapping, settings)?;
    Ok(bins.best(pinfo, &mapping, settings.blocks_shift))
}

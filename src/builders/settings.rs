use std::num::NonZeroUsize;

/// Tunables for spatial split binning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpatialBinningSettings {
    /// Leaves store primitives in blocks of `1 << blocks_shift`; the SAH counts blocks, not primitives.
    pub blocks_shift: u32,
    /// Smallest number of primitive references handed to a single binning worker.
    pub minimum_task_size: usize,
    /// Upper bound on the number of binning workers.
    pub worker_count: usize,
}

impl Default for SpatialBinningSettings {
    fn default() -> Self {
        Self {
            blocks_shift: 0,
            minimum_task_size: 1024,
            worker_count: std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
        }
    }
}

impl SpatialBinningSettings {
    /// Settings that bin everything on the calling thread.
    pub fn single_threaded() -> Self {
        Self {
            worker_count: 1,
            ..Self::default()
        }
    }

    pub fn with_blocks_shift(mut self, blocks_shift: u32) -> Self {
        self.blocks_shift = blocks_shift;
        self
    }

    pub fn with_workers(mut self, worker_count: usize, minimum_task_size: usize) -> Self {
        self.worker_count = worker_count;
        self.minimum_task_size = minimum_task_size;
        self
    }

    /// Number of primitives per leaf block.
    #[inline(always)]
    pub fn block_size(&self) -> usize {
        1 << self.blocks_shift
    }
}

use anyhow::Result;
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::io::SectorImage;

pub struct ParallelProcessor {
    num_workers: usize,
    chunk_size: usize,
}

impl ParallelProcessor {
    pub fn new(num_workers: Option<usize>) -> Self {
        let num_workers = num_workers.filter(|&n| n > 0).unwrap_or_else(|| {
            let cpus = num_cpus::get();
            cpus.min(8) // Cap at 8 workers for (probably) diminishing returns
        });

        // Chunk size optimized for cache efficiency
        let chunk_size = 64; // Process 64 sectors at a time

        Self { num_workers, chunk_size }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Maps every sector of `image` through `work` in parallel batches, then hands the results to
    /// `sink` in sector order.
    pub fn run<T, W, S>(
        &self,
        image: &SectorImage,
        progress: Option<&ProgressBar>,
        work: W,
        mut sink: S,
    ) -> Result<()>
    where
        T: Send,
        W: Fn(usize, &[u8]) -> Result<T> + Sync,
        S: FnMut(usize, T) -> Result<()>,
    {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(self.num_workers).build()?;
        let total_sectors = image.total_sectors();
        let sectors_per_batch = self.chunk_size * self.num_workers;

        for batch_start in (0..total_sectors).step_by(sectors_per_batch) {
            let batch_end = (batch_start + sectors_per_batch).min(total_sectors);

            // Indexed parallel iterators collect in order, so no re-sorting is needed
            let results: Vec<T> = pool.install(|| {
                (batch_start..batch_end)
                    .into_par_iter()
                    .with_min_len(self.chunk_size)
                    .map(|lba| {
                        let data = image
                            .read_sector(lba)
                            .ok_or_else(|| anyhow::anyhow!("Sector {lba} is out of range"))?;
                        work(lba, data)
                    })
                    .collect::<Result<_>>()
            })?;

            for (lba, result) in (batch_start..batch_end).zip(results) {
                sink(lba, result)?;

                if let Some(pb) = progress {
                    pb.inc(1);
                }
            }
        }

        Ok(())
    }
}

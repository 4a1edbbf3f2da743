use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use memmap2::{Mmap, MmapOptions};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Read-only, memory-mapped disc image made of fixed-size sectors.
pub struct SectorImage {
    // Empty images are not mapped
    mmap: Option<Mmap>,
    sector_size: usize,
    total_sectors: usize,
}

impl SectorImage {
    pub fn open<P: AsRef<Path>>(path: P, sector_size: usize) -> Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open image file: {}", path.as_ref().display()))?;

        let metadata = file.metadata()?;
        let file_size = metadata.len() as usize;

        if !file_size.is_multiple_of(sector_size) {
            anyhow::bail!(
                "Invalid image file size: {} is not a multiple of {}",
                file_size,
                sector_size
            );
        }

        if file_size == 0 {
            log::warn!("Image file is empty: {}", path.as_ref().display());
            return Ok(Self { mmap: None, sector_size, total_sectors: 0 });
        }

        // SAFETY: the mapping is read-only and the file is not expected to change while mapped
        let mmap = unsafe {
            MmapOptions::new()
                .map(&file)
                .with_context(|| "Failed to memory-map image file")?
        };
        let mmap = Some(mmap);

        Ok(Self { mmap, sector_size, total_sectors: file_size / sector_size })
    }

    pub fn sector_size(&self) -> usize {
        self.sector_size
    }

    pub fn total_sectors(&self) -> usize {
        self.total_sectors
    }

    pub fn read_sector(&self, sector_index: usize) -> Option<&[u8]> {
        if sector_index >= self.total_sectors {
            return None;
        }

        let offset = sector_index * self.sector_size;
        self.mmap.as_ref().map(|mmap| &mmap[offset..offset + self.sector_size])
    }
}

/// Returns true if `a` and `b` name the same file on disk, through any mix of relative paths,
/// symlinks or hard links. A path that does not exist is never the same file.
pub fn is_same_file<A: AsRef<Path>, B: AsRef<Path>>(a: A, b: B) -> Result<bool> {
    let (a, b) = (a.as_ref(), b.as_ref());
    if !a.exists() || !b.exists() {
        return Ok(false);
    }

    Ok(file_identity(a)? == file_identity(b)?)
}

#[cfg(unix)]
fn file_identity(path: &Path) -> Result<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;

    let metadata =
        fs::metadata(path).with_context(|| format!("Failed to stat {}", path.display()))?;
    Ok((metadata.dev(), metadata.ino()))
}

#[cfg(not(unix))]
fn file_identity(path: &Path) -> Result<std::path::PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve {}", path.display()))
}

pub struct SectorWriter {
    writer: BufWriter<File>,
    sector_size: usize,
    sectors_written: usize,
}

impl SectorWriter {
    pub fn create<P: AsRef<Path>>(path: P, sector_size: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| {
                format!("Failed to create output file: {}", path.as_ref().display())
            })?;

        Ok(Self {
            writer: BufWriter::with_capacity(1024 * 1024, file), // 1MB buffer
            sector_size,
            sectors_written: 0,
        })
    }

    pub fn write_sector(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != self.sector_size {
            anyhow::bail!(
                "Invalid sector size: expected {}, got {}",
                self.sector_size,
                data.len()
            );
        }

        self.writer.write_all(data)?;
        self.sectors_written += 1;
        Ok(())
    }

    /// Flushes buffered sectors and returns how many were written.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush().context("Failed to flush output file")?;
        Ok(self.sectors_written)
    }
}

pub fn create_progress_bar(total_sectors: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total_sectors as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(concat!(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] ",
                "{pos}/{len} sectors ({eta})",
            ))
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

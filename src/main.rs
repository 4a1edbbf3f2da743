use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use cdrecalc::edc_ecc::init_tables;
use cdrecalc::io::{create_progress_bar, is_same_file, SectorImage, SectorWriter};
use cdrecalc::parallel::ParallelProcessor;
use cdrecalc::sector::{
    self, SectorAddress, SectorCheck, SectorKind, ISO_SECTOR_SIZE, RAW_SECTOR_SIZE,
};
use cdrecalc::RecalcConfig;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use indicatif::ProgressBar;

#[derive(Parser, Debug)]
#[command(name = "cdrecalc")]
#[command(
    about = "Recalculate CD-ROM sector EDC/ECC in raw (2352-byte) disc images",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite the EDC/ECC fields of every data sector into a new image
    Recalc {
        /// Input raw image path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output image path (defaults to input with .recalc.bin extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        policy: PolicyArgs,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Report sectors whose stored EDC/ECC does not match their contents
    Verify {
        /// Input raw image path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Convert an ISO (2048-byte sectors) to a raw MODE1/2352 image
    Convert {
        /// Input ISO file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output RAW file path (defaults to input with .bin extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args, Debug)]
struct PolicyArgs {
    /// Leave the optional EDC of Mode 2 Form 2 sectors untouched
    #[arg(long)]
    no_form2_edc: bool,
}

impl PolicyArgs {
    fn config(&self) -> RecalcConfig {
        RecalcConfig { form2_edc: !self.no_form2_edc }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Number of worker threads (defaults to number of CPU cores)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Disable progress bar
    #[arg(short, long)]
    quiet: bool,
}

impl RunArgs {
    fn progress(&self, total_sectors: usize) -> Result<Option<ProgressBar>> {
        if self.quiet {
            return Ok(None);
        }
        create_progress_bar(total_sectors).map(Some)
    }
}

fn output_path(input: &Path, output: Option<PathBuf>, extension: &str) -> Result<PathBuf> {
    let output = output.unwrap_or_else(|| input.with_extension(extension));

    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    // Truncating the output would pull the mapped input out from under the reader
    if input == output || is_same_file(input, &output)? {
        anyhow::bail!("Input and output files cannot be the same");
    }

    Ok(output)
}

fn log_throughput(start_time: Instant, image: &SectorImage) {
    let elapsed = start_time.elapsed();
    let bytes = image.total_sectors() * image.sector_size();
    let mb_per_sec = bytes as f64 / (1024.0 * 1024.0) / elapsed.as_secs_f64();
    log::info!("Completed in {elapsed:.2?} ({mb_per_sec:.2} MB/s)");
}

fn log_kind_counts(counts: &HashMap<SectorKind, usize>) {
    for kind in SectorKind::ALL {
        if let Some(count) = counts.get(&kind) {
            log::info!("  {kind}: {count} sectors");
        }
    }
}

fn recalc(
    input: &Path,
    output: Option<PathBuf>,
    config: RecalcConfig,
    run: &RunArgs,
) -> Result<()> {
    let output = output_path(input, output, "recalc.bin")?;
    log::info!("Recalculating {} into {}", input.display(), output.display());

    let start_time = Instant::now();
    let tables = init_tables();

    let image = SectorImage::open(input, RAW_SECTOR_SIZE)?;
    let total_sectors = image.total_sectors();
    log::info!("Total sectors: {total_sectors}");

    let mut writer = SectorWriter::create(&output, RAW_SECTOR_SIZE)?;
    let progress = run.progress(total_sectors)?;
    let processor = ParallelProcessor::new(run.threads);
    log::info!("Using {} worker threads", processor.num_workers());

    let mut counts: HashMap<SectorKind, usize> = HashMap::new();
    processor.run(
        &image,
        progress.as_ref(),
        |_, data| {
            let mut sector = data.to_vec();
            let kind = sector::regenerate(tables, &mut sector, &config)?;
            Ok((kind, sector))
        },
        |_, (kind, sector)| {
            *counts.entry(kind).or_default() += 1;
            writer.write_sector(&sector)
        },
    )?;
    writer.finish()?;

    if let Some(pb) = progress {
        pb.finish_with_message("Recalculation complete");
    }

    log_kind_counts(&counts);
    log_throughput(start_time, &image);
    log::info!("Output file: {}", output.display());

    Ok(())
}

fn verify(input: &Path, config: RecalcConfig, run: &RunArgs) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    log::info!("Verifying {}", input.display());

    let start_time = Instant::now();
    let tables = init_tables();

    let image = SectorImage::open(input, RAW_SECTOR_SIZE)?;
    let total_sectors = image.total_sectors();
    let progress = run.progress(total_sectors)?;
    let processor = ParallelProcessor::new(run.threads);

    let mut counts: HashMap<SectorKind, usize> = HashMap::new();
    let mut bad_sectors = 0usize;
    processor.run(
        &image,
        progress.as_ref(),
        |_, data| Ok(sector::check(tables, data, &config)?),
        |lba, status: SectorCheck| {
            *counts.entry(status.kind).or_default() += 1;
            if !status.is_valid() {
                bad_sectors += 1;
                log::warn!(
                    "Sector {lba} ({}): EDC {}, ECC {}",
                    status.kind,
                    if status.edc_ok { "ok" } else { "mismatch" },
                    if status.ecc_ok { "ok" } else { "mismatch" },
                );
            }
            Ok(())
        },
    )?;

    if let Some(pb) = progress {
        pb.finish_with_message("Verification complete");
    }

    log_kind_counts(&counts);
    log_throughput(start_time, &image);

    if bad_sectors > 0 {
        anyhow::bail!("{bad_sectors} of {total_sectors} sectors have invalid EDC/ECC");
    }

    log::info!("All {total_sectors} sectors have valid EDC/ECC");
    Ok(())
}

fn convert(input: &Path, output: Option<PathBuf>, run: &RunArgs) -> Result<()> {
    let output = output_path(input, output, "bin")?;
    log::info!("Converting {} to {}", input.display(), output.display());

    let start_time = Instant::now();
    let tables = init_tables();

    let iso = SectorImage::open(input, ISO_SECTOR_SIZE)?;
    let total_sectors = iso.total_sectors();
    if total_sectors > SectorAddress::MAX_LBA as usize + 1 {
        anyhow::bail!(
            "ISO has {total_sectors} sectors; only {} fit in a 99:59:74 address range",
            SectorAddress::MAX_LBA + 1
        );
    }
    log::info!(
        "Total sectors: {} ({:.2} MB)",
        total_sectors,
        (total_sectors * iso.sector_size()) as f64 / (1024.0 * 1024.0)
    );

    let mut writer = SectorWriter::create(&output, RAW_SECTOR_SIZE)?;
    let progress = run.progress(total_sectors)?;
    let processor = ParallelProcessor::new(run.threads);
    log::info!("Using {} worker threads", processor.num_workers());

    processor.run(
        &iso,
        progress.as_ref(),
        |lba, data| {
            let lba = u32::try_from(lba)?;
            Ok(sector::build_mode1_sector(tables, lba, data)?)
        },
        |_, raw_sector| writer.write_sector(&raw_sector),
    )?;
    writer.finish()?;

    if let Some(pb) = progress {
        pb.finish_with_message("Conversion complete");
    }

    log_throughput(start_time, &iso);
    log::info!("Output file: {}", output.display());

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Recalc { input, output, policy, run } => {
            recalc(&input, output, policy.config(), &run)
        }
        Command::Verify { input, policy, run } => verify(&input, policy.config(), &run),
        Command::Convert { input, output, run } => convert(&input, output, &run),
    }
}

use anyhow::Context;
use clap::Parser;
use fatcarve_core::{Fat16Geometry, RecoveryReport};
use fatcarve_filesystems::{CarveOptions, DirectorySink, Fat16Carver, FileImage};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fatcarve")]
#[command(about = "Recover files from a FAT16 image using only its cluster chains", long_about = None)]
struct Cli {
    /// Raw FAT16 volume image, starting with the first FAT
    image: PathBuf,

    /// Directory receiving recovered_file_<cluster>.dat files
    #[arg(short, long, default_value = "recovered_files")]
    output: PathBuf,

    /// Write every decoded FAT entry, one decimal value per line
    #[arg(long)]
    dump_table: Option<PathBuf>,

    /// Write the run report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// JSON file with base geometry values
    #[arg(long)]
    geometry: Option<PathBuf>,

    #[arg(long)]
    bytes_per_sector: Option<u32>,

    #[arg(long)]
    sectors_per_cluster: Option<u32>,

    #[arg(long)]
    reserved_sectors: Option<u32>,

    #[arg(long)]
    fat_count: Option<u32>,

    /// FAT size in sectors
    #[arg(long)]
    fat_size: Option<u32>,

    #[arg(long)]
    root_entries: Option<u32>,

    /// Worker threads for extraction
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Keep trailing zero padding in recovered files
    #[arg(long)]
    keep_padding: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn geometry(&self) -> anyhow::Result<Fat16Geometry> {
        let mut geometry = match &self.geometry {
            Some(path) => Fat16Geometry::from_json_file(path)
                .with_context(|| format!("Failed to load geometry from {}", path.display()))?,
            None => Fat16Geometry::default(),
        };

        let overrides = [
            (self.bytes_per_sector, &mut geometry.bytes_per_sector),
            (self.sectors_per_cluster, &mut geometry.sectors_per_cluster),
            (self.reserved_sectors, &mut geometry.reserved_sector_count),
            (self.fat_count, &mut geometry.fat_count),
            (self.fat_size, &mut geometry.fat_size_sectors),
            (self.root_entries, &mut geometry.root_entry_count),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }

        geometry.validate()?;
        Ok(geometry)
    }
}

fn print_report(report: &RecoveryReport) {
    println!("File start locations: {:?}", report.file_starts);
    println!("Beginnings of chains: {:?}", report.beginnings);
    println!("Endings of chains: {:?}", report.endings);
    println!();
    println!(
        "Recovered {} of {} files from {} FAT entries",
        report.recovered_count(),
        report.file_starts.len(),
        report.table_entries
    );

    if !report.failures.is_empty() {
        println!("Problems:");
        for failure in &report.failures {
            match failure.start_cluster {
                Some(cluster) => println!("  - cluster {}: {}", cluster, failure.message),
                None => println!("  - {}", failure.message),
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let geometry = cli.geometry()?;
    let options = CarveOptions {
        jobs: cli.jobs,
        trim_padding: !cli.keep_padding,
    };

    let mut sink = DirectorySink::create(&cli.output)
        .with_context(|| format!("Cannot use output directory {}", cli.output.display()))?;
    if let Some(dump) = &cli.dump_table {
        sink = sink.with_table_dump(dump);
    }

    let carver = Fat16Carver::new(geometry, options)?;
    let image = FileImage::new(&cli.image);
    let output_dir = sink.directory().to_path_buf();

    let report = tokio::task::spawn_blocking(move || carver.run(&image, &sink))
        .await
        .context("Carving task panicked")?
        .with_context(|| format!("Failed to carve {}", cli.image.display()))?;

    print_report(&report);
    println!("Recovered files written to {}", output_dir.display());

    if let Some(path) = &cli.report {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

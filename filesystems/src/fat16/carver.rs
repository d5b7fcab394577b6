// FAT16 carving pipeline
// load table -> detect chain boundaries -> classify file starts -> extract chains

use chrono::Utc;
use fatcarve_core::{
    CarveError, ExtractionFailure, Fat16Geometry, PipelineStage, RecoveredFileSummary, RecoveryReport,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::thread;

use super::chain_boundaries::ChainBoundaryDetector;
use super::extractor::ClusterChainExtractor;
use super::file_starts::FileStartClassifier;
use super::table_loader::{ClusterPointerTable, FatTableLoader};
use crate::fat_common::VolumeLayout;
use crate::image_reader::{ImageReader, ImageSource};
use crate::output::RecoverySink;

/// Tuning knobs that do not change which files are found
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarveOptions {
    /// Worker threads used for extraction, 1 runs sequentially
    pub jobs: usize,
    /// Strip trailing zero bytes from each recovered file
    pub trim_padding: bool,
}

impl Default for CarveOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            trim_padding: true,
        }
    }
}

/// Result of one chain, successful or not
struct ChainOutcome {
    summary: Option<RecoveredFileSummary>,
    failures: Vec<ExtractionFailure>,
}

pub struct Fat16Carver {
    geometry: Fat16Geometry,
    layout: VolumeLayout,
    options: CarveOptions,
}

impl Fat16Carver {
    pub fn new(geometry: Fat16Geometry, options: CarveOptions) -> Result<Self, CarveError> {
        let layout = VolumeLayout::from_geometry(&geometry)?;

        info!("FAT16 carving layout:");
        info!("  FAT size: {} bytes x {}", layout.fat_size_bytes, geometry.fat_count);
        info!("  Root directory: {:#x}, {} bytes", layout.root_dir_start, layout.root_dir_size);
        info!("  Data area: {:#x}", layout.data_area_offset());
        info!("  Cluster size: {} bytes", layout.cluster_size);

        Ok(Self {
            geometry,
            layout,
            options,
        })
    }

    /// Run the whole pipeline against `source`, persisting through `sink`.
    ///
    /// Only table loading can abort the run. Chain and output problems are
    /// collected into the report's failures.
    pub fn run<S: ImageSource>(&self, source: &S, sink: &dyn RecoverySink) -> Result<RecoveryReport, CarveError> {
        let started_at = Utc::now();
        info!("Carving files from {}", source.describe());

        let table = self.load_table(source).map_err(|e| e.in_stage(PipelineStage::LoadTable))?;

        let mut failures = Vec::new();
        let table_dump = match sink.persist_table(&table) {
            Ok(path) => path,
            Err(e) => {
                warn!("Could not write FAT dump: {}", e);
                failures.push(ExtractionFailure::new(None, &e));
                None
            }
        };

        let boundaries = ChainBoundaryDetector::detect(&table);
        let file_starts = FileStartClassifier::classify(&boundaries, &table);
        info!(
            "Found {} file starts ({} beginnings, {} endings)",
            file_starts.len(),
            boundaries.beginnings.len(),
            boundaries.endings.len()
        );

        let outcomes = self
            .extract_all(source, &table, &file_starts, sink)
            .map_err(|e| e.in_stage(PipelineStage::Extract))?;

        let mut recovered = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            recovered.extend(outcome.summary);
            failures.extend(outcome.failures);
        }

        info!(
            "Recovered {} of {} files, {} problems reported",
            recovered.len(),
            file_starts.len(),
            failures.len()
        );

        Ok(RecoveryReport {
            geometry: self.geometry.clone(),
            table_entries: table.len(),
            beginnings: boundaries.beginnings,
            endings: boundaries.endings,
            file_starts,
            recovered,
            failures,
            table_dump,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn load_table<S: ImageSource>(&self, source: &S) -> Result<ClusterPointerTable, CarveError> {
        let mut reader = ImageReader::new(source.open()?);
        FatTableLoader::new(self.layout.fat_size_bytes).load(&mut reader)
    }

    fn extract_all<S: ImageSource>(
        &self,
        source: &S,
        table: &ClusterPointerTable,
        starts: &[usize],
        sink: &dyn RecoverySink,
    ) -> Result<Vec<ChainOutcome>, CarveError> {
        let extractor = ClusterChainExtractor::new(table, self.layout, self.options.trim_padding)?;
        let jobs = self.options.jobs.clamp(1, starts.len().max(1));

        if jobs == 1 {
            return Ok(self.extract_chunk(source, &extractor, starts, sink));
        }

        // Contiguous chunks keep the merged outcomes in start order
        let chunk_size = (starts.len() + jobs - 1) / jobs;
        info!("Extracting with {} workers, {} chains each", jobs, chunk_size);

        let extractor = &extractor;
        let outcomes: Vec<ChainOutcome> = thread::scope(|scope| {
            let workers: Vec<_> = starts
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || self.extract_chunk(source, extractor, chunk, sink)))
                .collect();

            workers
                .into_iter()
                .flat_map(|worker| worker.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        Ok(outcomes)
    }

    fn extract_chunk<S: ImageSource>(
        &self,
        source: &S,
        extractor: &ClusterChainExtractor<'_>,
        starts: &[usize],
        sink: &dyn RecoverySink,
    ) -> Vec<ChainOutcome> {
        let mut reader = match source.open() {
            Ok(handle) => ImageReader::new(handle),
            Err(e) => {
                warn!("Could not open image for extraction: {}", e);
                return starts
                    .iter()
                    .map(|&start| ChainOutcome {
                        summary: None,
                        failures: vec![ExtractionFailure::new(Some(start), &e)],
                    })
                    .collect();
            }
        };

        starts
            .iter()
            .map(|&start| {
                let mut failures = Vec::new();

                let extraction = match extractor.extract(&mut reader, start) {
                    Ok(extraction) => extraction,
                    Err(e) => {
                        warn!("Failed to extract chain at cluster {}: {}", start, e);
                        failures.push(ExtractionFailure::new(Some(start), &e));
                        return ChainOutcome { summary: None, failures };
                    }
                };

                if let Some(interruption) = &extraction.interruption {
                    failures.push(ExtractionFailure::new(Some(start), interruption));
                }

                let file = &extraction.file;
                let summary = match sink.persist_file(file) {
                    Ok(path) => Some(RecoveredFileSummary {
                        start_cluster: start,
                        clusters_read: file.clusters_read,
                        raw_length: file.raw_length,
                        length: file.data.len() as u64,
                        crc32: crc32fast::hash(&file.data),
                        path,
                    }),
                    Err(e) => {
                        warn!("Failed to persist file at cluster {}: {}", start, e);
                        failures.push(ExtractionFailure::new(Some(start), &e));
                        None
                    }
                };

                ChainOutcome { summary, failures }
            })
            .collect()
    }
}

// File start classification
// A beginning that some ending points into continues a fragmented chain

use log::debug;
use std::collections::HashSet;

use super::chain_boundaries::ChainBoundaries;
use super::table_loader::ClusterPointerTable;

pub struct FileStartClassifier;

impl FileStartClassifier {
    /// Keep the beginnings no ending's pointer targets, preserving their order
    pub fn classify(boundaries: &ChainBoundaries, table: &ClusterPointerTable) -> Vec<usize> {
        let continued: HashSet<usize> = boundaries
            .endings
            .iter()
            .filter_map(|&ending| table.get(ending))
            .map(usize::from)
            .collect();

        let starts: Vec<usize> = boundaries
            .beginnings
            .iter()
            .copied()
            .filter(|beginning| !continued.contains(beginning))
            .collect();

        debug!(
            "{} of {} chain beginnings are file starts",
            starts.len(),
            boundaries.beginnings.len()
        );
        starts
    }
}

// Chain boundary detection
//
// Unallocated entries in the target images point at the next index, so any
// entry that breaks the "i -> i + 1" pattern marks a boundary. This is a
// property of that image family, not of FAT16 in general.

use log::debug;

use super::table_loader::ClusterPointerTable;

/// Candidate chain beginnings and endings, both in ascending index order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainBoundaries {
    pub beginnings: Vec<usize>,
    pub endings: Vec<usize>,
}

pub struct ChainBoundaryDetector;

impl ChainBoundaryDetector {
    /// Classify indices `1..len` in one pass; index 0 is reserved and never classified.
    ///
    /// `i` begins a chain when entry `i - 1` does not point at `i`, and ends one
    /// when entry `i` does not point at `i + 1`.
    pub fn detect(table: &ClusterPointerTable) -> ChainBoundaries {
        let entries = table.entries();
        let mut boundaries = ChainBoundaries::default();

        for i in 1..entries.len() {
            if entries[i - 1] as usize != i {
                boundaries.beginnings.push(i);
            }
            if entries[i] as usize != i + 1 {
                boundaries.endings.push(i);
            }
        }

        debug!(
            "Detected {} chain beginnings and {} chain endings",
            boundaries.beginnings.len(),
            boundaries.endings.len()
        );
        boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sequential_table;

    #[test]
    fn test_sequential_background_has_no_boundaries() {
        let table = ClusterPointerTable::from(sequential_table(64));
        let boundaries = ChainBoundaryDetector::detect(&table);

        assert!(boundaries.beginnings.is_empty());
        assert!(boundaries.endings.is_empty());
    }

    #[test]
    fn test_index_zero_never_classified() {
        let table = ClusterPointerTable::from(vec![0xFFF8, 0xFFFF, 0xFFFF, 0x0000]);
        let boundaries = ChainBoundaryDetector::detect(&table);

        assert_eq!(boundaries.beginnings, vec![1, 2, 3]);
        assert_eq!(boundaries.endings, vec![1, 2, 3]);
        assert!(!boundaries.beginnings.contains(&0));
        assert!(!boundaries.endings.contains(&0));
    }

    #[test]
    fn test_single_chain_boundaries() {
        let mut entries = sequential_table(16);
        entries[4] = 0xFFFF;
        entries[5] = 6;
        entries[6] = 7;
        entries[7] = 0xFFFF;

        let boundaries = ChainBoundaryDetector::detect(&ClusterPointerTable::from(entries));
        assert_eq!(boundaries.beginnings, vec![5, 8]);
        assert_eq!(boundaries.endings, vec![4, 7]);
    }

    #[test]
    fn test_fragmented_chain_asymmetry() {
        // 3 -> 4 -> 10 -> 11 -> end
        let mut entries = sequential_table(16);
        entries[2] = 0xFFFF;
        entries[4] = 10;
        entries[9] = 0xFFFF;
        entries[11] = 0xFFFF;

        let boundaries = ChainBoundaryDetector::detect(&ClusterPointerTable::from(entries));
        assert_eq!(boundaries.beginnings, vec![3, 5, 10, 12]);
        assert_eq!(boundaries.endings, vec![2, 4, 9, 11]);
    }

    #[test]
    fn test_empty_and_single_entry_tables() {
        let empty = ChainBoundaryDetector::detect(&ClusterPointerTable::from(Vec::new()));
        assert_eq!(empty, ChainBoundaries::default());

        let single = ChainBoundaryDetector::detect(&ClusterPointerTable::from(vec![0xFFFF]));
        assert_eq!(single, ChainBoundaries::default());
    }
}

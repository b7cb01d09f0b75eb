use crate::core_modules::record::StudyRecord;
use crate::error::{ReplayError, ReplayResult};

/// Logical coordinate of one frame inside the nested
/// (replications x time_points) structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePointer {
    pub replication: usize,
    pub time: usize,
}

/// The ordered list of frames an animation will visit.
///
/// Pure precomputation: built once from a record, immutable afterwards. The
/// driver walks it linearly, but any frame can also be resolved at random.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameIndex {
    pointers: Vec<FramePointer>,
}

impl FrameIndex {
    /// Every time point of every replication, replication-major.
    pub fn all_replications(record: &StudyRecord) -> Self {
        let pointers = record
            .replications
            .iter()
            .enumerate()
            .flat_map(|(replication, rep)| {
                (0..rep.time_points.len()).map(move |time| FramePointer { replication, time })
            })
            .collect();
        Self { pointers }
    }

    /// One replication's time points, in order, carrying that replication's
    /// fixed index.
    pub fn single_replication(record: &StudyRecord, replication: usize) -> ReplayResult<Self> {
        let rep = record.replications.get(replication).ok_or_else(|| {
            ReplayError::schema(format!(
                "replication {replication} out of range ({} recorded)",
                record.replications.len()
            ))
        })?;
        let pointers = (0..rep.time_points.len())
            .map(|time| FramePointer { replication, time })
            .collect();
        Ok(Self { pointers })
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<FramePointer> {
        self.pointers.get(step).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = FramePointer> + '_ {
        self.pointers.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::record::{Informant, Outcome, Replication, StudyRecord, TimePoint, Unit};

    fn record_with_lengths(lengths: &[usize]) -> StudyRecord {
        let network = vec![crate::core_modules::record::Node { x: 0.0, y: 0.0 }];
        let replications = lengths
            .iter()
            .map(|&n| Replication {
                outcome: Outcome::Time,
                time_points: vec![
                    TimePoint {
                        evader: Unit { loc: 0 },
                        pursuers: vec![],
                        informant: Informant::default(),
                        posterior: vec![1.0],
                    };
                    n
                ],
            })
            .collect();
        StudyRecord {
            network,
            replications,
        }
    }

    #[test]
    fn all_replications_concatenates_in_order() {
        let record = record_with_lengths(&[2, 3]);
        let index = FrameIndex::all_replications(&record);
        assert_eq!(index.len(), 5);
        let pointers: Vec<_> = index.iter().collect();
        assert_eq!(
            pointers[0],
            FramePointer {
                replication: 0,
                time: 0
            }
        );
        assert_eq!(
            pointers[1],
            FramePointer {
                replication: 0,
                time: 1
            }
        );
        assert_eq!(
            pointers[2],
            FramePointer {
                replication: 1,
                time: 0
            }
        );
        assert_eq!(
            pointers[4],
            FramePointer {
                replication: 1,
                time: 2
            }
        );
    }

    #[test]
    fn single_replication_keeps_its_fixed_index() {
        let record = record_with_lengths(&[2, 3]);
        let index = FrameIndex::single_replication(&record, 1).unwrap();
        assert_eq!(index.len(), 3);
        assert!(index.iter().all(|p| p.replication == 1));
    }

    #[test]
    fn single_replication_rejects_bad_index() {
        let record = record_with_lengths(&[2]);
        assert!(FrameIndex::single_replication(&record, 1).is_err());
    }

    #[test]
    fn lengths_sum_across_replications() {
        let record = record_with_lengths(&[4, 0, 7]);
        assert_eq!(FrameIndex::all_replications(&record).len(), 11);
        assert_eq!(
            FrameIndex::single_replication(&record, 1).unwrap().len(),
            0
        );
    }

    #[test]
    fn get_past_the_end_is_none() {
        let record = record_with_lengths(&[1]);
        let index = FrameIndex::all_replications(&record);
        assert!(index.get(0).is_some());
        assert!(index.get(1).is_none());
    }
}

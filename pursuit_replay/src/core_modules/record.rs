// THEORY:
// The `record` module is the read-only foundation of the replay pipeline. It
// defines the decoded, in-memory shape of a completed simulation study: one
// shared spatial network plus any number of independent replications, each a
// time-ordered sequence of snapshots. Everything downstream (interpolation,
// tip regions, frame building) consumes this structure by reference and
// never mutates it.
//
// Key architectural principles:
// 1.  **Decode once, validate once**: A `StudyRecord` is produced in a single
//     atomic step from a binary blob. Validation of all cross-references
//     (posterior lengths, node indices) happens immediately after decode and
//     again before any animation starts, so rendering code can index freely.
// 2.  **Indices as foreign keys**: Node identity is position in the network
//     sequence. Evader, pursuers, informant tips and the posterior all refer
//     to nodes by that index.
// 3.  **Record everything the study produced**: Replication outcomes and the
//     informant's tip-quality mixture are part of the record even though the
//     frame renderer does not draw them; the study summary consumes them.

use serde::{Deserialize, Serialize};

use crate::error::{ReplayError, ReplayResult};

/// A single node of the spatial network, with coordinates in [0, 1] x [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub x: f64,
    pub y: f64,
}

/// One mobile unit (the evader or a pursuer) pinned to a network node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Index into `StudyRecord::network`.
    pub loc: usize,
}

/// The informant's disclosure at one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Informant {
    /// Whether a tip was disclosed at this snapshot.
    pub has_tip: bool,
    /// Candidate node indices for the evader's location. Ignored when
    /// `has_tip` is false.
    #[serde(default)]
    pub locs: Vec<usize>,
    /// Mixture weight of the reliable tip source.
    #[serde(default)]
    pub reliable: f64,
    /// Mixture weight of the deceitful tip source.
    #[serde(default)]
    pub deceitful: f64,
    /// Mixture weight of the noisy tip source.
    #[serde(default)]
    pub noisy: f64,
}

/// One simulation instant within a replication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// The evader's true location.
    pub evader: Unit,
    /// Zero or more pursuer units.
    pub pursuers: Vec<Unit>,
    /// The informant's disclosure, if any.
    pub informant: Informant,
    /// Belief weight per node, aligned by index with the network.
    pub posterior: Vec<f64>,
}

/// How a replication ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The pursuers captured the evader.
    Caught,
    /// The evader reached its goal.
    Goal,
    /// The time horizon expired.
    Time,
}

/// One independent run of the simulated pursuit-evasion process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replication {
    pub outcome: Outcome,
    pub time_points: Vec<TimePoint>,
}

/// The complete decoded output of one simulation study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRecord {
    /// The shared spatial network. Node identity is position in this list.
    pub network: Vec<Node>,
    /// All recorded replications, in recording order.
    pub replications: Vec<Replication>,
}

impl StudyRecord {
    /// Decode a study record from its binary serialized form and validate
    /// every cross-reference. Fails atomically: no partially-populated
    /// record is ever returned.
    pub fn decode(bytes: &[u8]) -> ReplayResult<Self> {
        let record: StudyRecord =
            serde_cbor::from_slice(bytes).map_err(|err| ReplayError::Decode(err.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    /// Serialize a record into the binary form `decode` accepts.
    pub fn encode(&self) -> ReplayResult<Vec<u8>> {
        serde_cbor::to_vec(self).map_err(|err| ReplayError::Encode(err.to_string()))
    }

    /// Check every index and length invariant of the schema.
    ///
    /// Invariants: `posterior.len() == network.len()` at every snapshot, and
    /// every evader, pursuer and tip location is a valid node index.
    pub fn validate(&self) -> ReplayResult<()> {
        let num_nodes = self.network.len();
        for (rep_index, rep) in self.replications.iter().enumerate() {
            for (time_index, tp) in rep.time_points.iter().enumerate() {
                let at = |what: &str, loc: usize| {
                    ReplayError::schema(format!(
                        "rep {rep_index} time {time_index}: {what} references node {loc} \
                         but the network has {num_nodes} nodes"
                    ))
                };
                if tp.posterior.len() != num_nodes {
                    return Err(ReplayError::schema(format!(
                        "rep {rep_index} time {time_index}: posterior has {} entries \
                         but the network has {num_nodes} nodes",
                        tp.posterior.len()
                    )));
                }
                if tp.evader.loc >= num_nodes {
                    return Err(at("evader", tp.evader.loc));
                }
                if let Some(unit) = self.out_of_range(&tp.pursuers) {
                    return Err(at("pursuer", unit.loc));
                }
                for &loc in &tp.informant.locs {
                    if loc >= num_nodes {
                        return Err(at("informant tip", loc));
                    }
                }
            }
        }
        Ok(())
    }

    /// Fetch one snapshot by (replication, time) coordinates.
    pub fn snapshot(&self, replication: usize, time: usize) -> ReplayResult<&TimePoint> {
        let rep = self.replications.get(replication).ok_or_else(|| {
            ReplayError::schema(format!(
                "replication {replication} out of range ({} recorded)",
                self.replications.len()
            ))
        })?;
        rep.time_points.get(time).ok_or_else(|| {
            ReplayError::schema(format!(
                "time point {time} out of range in replication {replication} \
                 ({} recorded)",
                rep.time_points.len()
            ))
        })
    }

    /// Total number of snapshots across all replications.
    pub fn total_snapshots(&self) -> usize {
        self.replications.iter().map(|r| r.time_points.len()).sum()
    }

    fn out_of_range<'a>(&self, units: &'a [Unit]) -> Option<&'a Unit> {
        units.iter().find(|u| u.loc >= self.network.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_record() -> StudyRecord {
        StudyRecord {
            network: vec![
                Node { x: 0.0, y: 0.0 },
                Node { x: 1.0, y: 0.0 },
                Node { x: 0.0, y: 1.0 },
                Node { x: 1.0, y: 1.0 },
            ],
            replications: vec![Replication {
                outcome: Outcome::Caught,
                time_points: vec![TimePoint {
                    evader: Unit { loc: 0 },
                    pursuers: vec![Unit { loc: 1 }, Unit { loc: 2 }],
                    informant: Informant::default(),
                    posterior: vec![0.25; 4],
                }],
            }],
        }
    }

    #[test]
    fn decode_roundtrip() {
        let record = unit_square_record();
        let bytes = record.encode().unwrap();
        let decoded = StudyRecord::decode(&bytes).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn validate_accepts_well_formed_record() {
        assert!(unit_square_record().validate().is_ok());
    }

    #[test]
    fn validate_rejects_posterior_length_mismatch() {
        let mut record = unit_square_record();
        record.replications[0].time_points[0].posterior.pop();
        let err = record.validate().unwrap_err();
        assert!(matches!(err, ReplayError::Schema(_)), "got {err:?}");
    }

    #[test]
    fn validate_rejects_out_of_range_evader() {
        let mut record = unit_square_record();
        record.replications[0].time_points[0].evader.loc = 4;
        assert!(matches!(
            record.validate().unwrap_err(),
            ReplayError::Schema(_)
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_tip_location() {
        let mut record = unit_square_record();
        let informant = &mut record.replications[0].time_points[0].informant;
        informant.has_tip = true;
        informant.locs = vec![0, 17];
        assert!(matches!(
            record.validate().unwrap_err(),
            ReplayError::Schema(_)
        ));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            StudyRecord::decode(b"not a record").unwrap_err(),
            ReplayError::Decode(_)
        ));
    }

    #[test]
    fn snapshot_rejects_bad_coordinates() {
        let record = unit_square_record();
        assert!(record.snapshot(0, 0).is_ok());
        assert!(record.snapshot(1, 0).is_err());
        assert!(record.snapshot(0, 1).is_err());
    }
}

//! Alignment records as delivered by the backend: reads, their differences
//! from the reference, pairs, and rows of pairs packed into a stack.
//!
//! These are immutable inputs; scenes only read them.

use serde::{Deserialize, Serialize};

use crate::genomics::{GenomicInterval, GenomicRegion};

/// A difference between an aligned read and the reference.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum SequenceDiff {
    /// One or more substituted bases.
    Mismatch {
        /// Reference bases replaced.
        interval: GenomicInterval,
        /// Read bases at those positions.
        sequence: String,
    },
    /// Bases present in the read but not in the reference. The interval is
    /// the zero-length insertion point.
    #[serde(alias = "ins")]
    Insertion {
        /// Insertion point.
        interval: GenomicInterval,
        /// Inserted bases.
        sequence: String,
    },
    /// Reference bases missing from the read.
    #[serde(alias = "del")]
    Deletion {
        /// Deleted reference bases.
        interval: GenomicInterval,
    },
    /// Read bases present in the data but not aligned to the reference.
    SoftClip {
        /// Reference positions the clipped bases would cover.
        interval: GenomicInterval,
        /// Clipped bases.
        sequence: String,
    },
    /// Reference bases skipped by the alignment, e.g. introns.
    RefSkip {
        /// Skipped reference bases.
        interval: GenomicInterval,
    },
}

impl SequenceDiff {
    /// Reference interval of the diff.
    pub fn interval(&self) -> &GenomicInterval {
        match self {
            SequenceDiff::Mismatch { interval, .. }
            | SequenceDiff::Insertion { interval, .. }
            | SequenceDiff::Deletion { interval }
            | SequenceDiff::SoftClip { interval, .. }
            | SequenceDiff::RefSkip { interval } => interval,
        }
    }

    /// Read bases carried by the diff, if any.
    pub fn sequence(&self) -> Option<&str> {
        match self {
            SequenceDiff::Mismatch { sequence, .. }
            | SequenceDiff::Insertion { sequence, .. }
            | SequenceDiff::SoftClip { sequence, .. } => Some(sequence),
            SequenceDiff::Deletion { .. } | SequenceDiff::RefSkip { .. } => None,
        }
    }
}

/// A single aligned read.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedRead {
    /// Unique id, e.g. `qname/1`.
    pub id: String,
    /// Aligned region, extended over soft clips.
    pub region: GenomicRegion,
    /// Start of the mate, if the read is paired and the mate is mapped.
    #[serde(default)]
    pub mate_pos: Option<GenomicRegion>,
    /// CIGAR string, displayed verbatim.
    pub cigar_string: String,
    /// Differences from the reference, normally ordered by start.
    #[serde(default)]
    pub diffs: Vec<SequenceDiff>,
    /// Whether the read aligned to the reverse strand.
    pub is_reverse: bool,
}

impl AlignedRead {
    /// Whether [`diffs`](Self::diffs) is already ordered by start position.
    pub fn diffs_sorted(&self) -> bool {
        self.diffs.is_sorted_by_key(|diff| diff.interval().start)
    }
}

/// Two reads of a pair aligned to the same sequence.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairedReads {
    /// First read.
    pub read1: AlignedRead,
    /// Mate, `None` when it lies outside the loaded window.
    #[serde(default)]
    pub read2: Option<AlignedRead>,
    /// Envelope of both reads (or of read1 and the mate position).
    pub interval: GenomicInterval,
}

/// A read without an aligned mate.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpairedRead {
    /// The read.
    pub read: AlignedRead,
    /// Envelope of the read.
    pub interval: GenomicInterval,
}

/// A read whose mate aligned to a different sequence.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordantRead {
    /// The read.
    pub read: AlignedRead,
    /// Envelope of the read.
    pub interval: GenomicInterval,
}

/// One entry of a stack row.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum AlignedPair {
    /// Two reads on the same sequence.
    #[serde(alias = "pairedReadsKind")]
    PairedReads(PairedReads),
    /// A single read without a mate.
    #[serde(alias = "unpairedReadKind")]
    UnpairedRead(UnpairedRead),
    /// A read whose mate is elsewhere.
    #[serde(alias = "discordantReadKind")]
    DiscordantRead(DiscordantRead),
}

/// Which read of a pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mate {
    /// `read1`, or the only read.
    First,
    /// `read2` of a [`PairedReads`].
    Second,
}

impl AlignedPair {
    /// Genomic envelope of the pair.
    pub fn interval(&self) -> &GenomicInterval {
        match self {
            AlignedPair::PairedReads(PairedReads { interval, .. })
            | AlignedPair::UnpairedRead(UnpairedRead { interval, .. })
            | AlignedPair::DiscordantRead(DiscordantRead { interval, .. }) => interval,
        }
    }

    /// Look up one read of the pair.
    pub fn read(&self, mate: Mate) -> Option<&AlignedRead> {
        match (self, mate) {
            (AlignedPair::PairedReads(pair), Mate::First) => Some(&pair.read1),
            (AlignedPair::PairedReads(pair), Mate::Second) => pair.read2.as_ref(),
            (
                AlignedPair::UnpairedRead(UnpairedRead { read, .. })
                | AlignedPair::DiscordantRead(DiscordantRead { read, .. }),
                Mate::First,
            ) => Some(read),
            (_, Mate::Second) => None,
        }
    }

    /// The non-null reads of the pair, in draw order.
    pub fn reads(&self) -> impl Iterator<Item = (Mate, &AlignedRead)> {
        [Mate::First, Mate::Second]
            .into_iter()
            .filter_map(move |mate| self.read(mate).map(|read| (mate, read)))
    }

    /// Whether both reads of a pair are present, so a pair line is drawn.
    pub fn has_both_mates(&self) -> bool {
        matches!(self, AlignedPair::PairedReads(PairedReads { read2: Some(_), .. }))
    }
}

/// Pairs packed into non-overlapping rows, top to bottom.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentStack {
    /// Stack id assigned by the backend.
    pub id: String,
    /// Rows of non-overlapping pairs.
    pub rows: Vec<Vec<AlignedPair>>,
    /// Region loaded around the focused region. Contains every pair.
    pub buffered_region: GenomicRegion,
}

impl AlignmentStack {
    /// Look up one read by row, column and mate.
    pub fn read(&self, row: usize, col: usize, mate: Mate) -> Option<&AlignedRead> {
        self.rows.get(row)?.get(col)?.read(mate)
    }

    /// Number of pairs across all rows.
    pub fn count_pairs(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STACK_JSON: &str = r#"{
        "id": "stack-1",
        "bufferedRegion": {"seqName": "chr1", "interval": {"start": 0, "end": 300}},
        "rows": [[
            {
                "type": "pairedReads",
                "read1": {
                    "id": "r1/1",
                    "region": {"seqName": "chr1", "interval": {"start": 10, "end": 60}},
                    "matePos": {"seqName": "chr1", "interval": {"start": 200, "end": 201}},
                    "cigarString": "50M",
                    "diffs": [
                        {"type": "mismatch", "interval": {"start": 12, "end": 13}, "sequence": "T"},
                        {"type": "del", "interval": {"start": 20, "end": 25}}
                    ],
                    "isReverse": false
                },
                "read2": null,
                "interval": {"start": 10, "end": 201}
            },
            {
                "type": "unpairedRead",
                "read": {
                    "id": "r2",
                    "region": {"seqName": "chr1", "interval": {"start": 220, "end": 260}},
                    "cigarString": "40M",
                    "isReverse": true
                },
                "interval": {"start": 220, "end": 260}
            }
        ]]
    }"#;

    #[test]
    fn deserializes_backend_payload() {
        let stack: AlignmentStack = serde_json::from_str(STACK_JSON).unwrap();
        assert_eq!(stack.count_pairs(), 2);
        let read = stack.read(0, 0, Mate::First).unwrap();
        assert_eq!(read.diffs.len(), 2);
        assert!(matches!(read.diffs[1], SequenceDiff::Deletion { .. }));
        assert!(stack.read(0, 0, Mate::Second).is_none());
        assert!(stack.read(0, 1, Mate::First).unwrap().is_reverse);
        assert!(stack.read(1, 0, Mate::First).is_none());
    }

    #[test]
    fn unpaired_mate_has_no_pair_line() {
        let stack: AlignmentStack = serde_json::from_str(STACK_JSON).unwrap();
        let pair = &stack.rows[0][0];
        assert!(!pair.has_both_mates());
        assert_eq!(pair.reads().count(), 1);
        assert_eq!(pair.interval().len(), 191);
    }

    #[test]
    fn diff_accessors() {
        let insertion = SequenceDiff::Insertion {
            interval: GenomicInterval::new(5, 5).unwrap(),
            sequence: "AC".to_owned(),
        };
        assert_eq!(insertion.sequence(), Some("AC"));
        assert!(insertion.interval().is_empty());
        let deletion = SequenceDiff::Deletion {
            interval: GenomicInterval::new(5, 9).unwrap(),
        };
        assert_eq!(deletion.sequence(), None);
        assert_eq!(deletion.interval().len(), 4);
    }

    #[test]
    fn detects_unsorted_diffs() {
        let mut stack: AlignmentStack = serde_json::from_str(STACK_JSON).unwrap();
        let AlignedPair::PairedReads(pair) = &mut stack.rows[0][0] else {
            panic!("expected paired reads");
        };
        assert!(pair.read1.diffs_sorted());
        pair.read1.diffs.reverse();
        assert!(!pair.read1.diffs_sorted());
    }
}

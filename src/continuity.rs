//! Sequence continuity: contiguous runs and the gaps between them.
//!
//! Strip images are numbered sequentially by the acquisition system, so a
//! missing number usually means a lost or not-yet-copied frame. Given the
//! numbers that are present, [`analyze`] returns the maximal runs of
//! consecutive numbers ([`Segment`]s) and the ranges missing between
//! neighbouring runs ([`Gap`]s).
//!
//! ```text
//! ids:       1 2 3 . . . 7 8 . 10
//! segments:  (1,3)       (7,8) (10,10)
//! gaps:            (4,6)     (9,9)
//! ```
//!
//! Both lists are in ascending order. Report consumers print them top to
//! bottom, so the order is part of the contract.
//!
//! An empty input produces no segments and a single `(0, 0)` gap. That gap
//! is a "no data" sentinel, not a real missing range; check
//! [`Continuity::is_empty_sentinel`] before treating it as one.

use serde::Serialize;

/// Inclusive run of present identifiers. `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
}

/// Inclusive run of absent identifiers between two segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gap {
    pub start: u64,
    pub end: u64,
}

impl Segment {
    pub fn count(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl Gap {
    pub fn count(&self) -> u64 {
        self.end - self.start + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Continuity {
    pub segments: Vec<Segment>,
    pub gaps: Vec<Gap>,
}

impl Continuity {
    /// True for the result of analyzing an empty input.
    pub fn is_empty_sentinel(&self) -> bool {
        self.segments.is_empty() && self.gaps == [Gap { start: 0, end: 0 }]
    }

    /// Total count of identifiers covered by segments.
    pub fn present_count(&self) -> u64 {
        self.segments.iter().map(Segment::count).sum()
    }

    /// Total count of identifiers covered by real gaps.
    pub fn missing_count(&self) -> u64 {
        if self.is_empty_sentinel() {
            return 0;
        }
        self.gaps.iter().map(Gap::count).sum()
    }
}

/// Compute contiguous segments and the gaps between them.
pub fn analyze(ids: &[u64]) -> Continuity {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let Some((&first, rest)) = sorted.split_first() else {
        return Continuity {
            segments: Vec::new(),
            gaps: vec![Gap { start: 0, end: 0 }],
        };
    };

    let mut segments = Vec::new();
    let mut start = first;
    let mut prev = first;
    for &id in rest {
        if id == prev + 1 {
            prev = id;
        } else {
            segments.push(Segment { start, end: prev });
            start = id;
            prev = id;
        }
    }
    segments.push(Segment { start, end: prev });

    let gaps = segments
        .windows(2)
        .filter(|pair| pair[1].start - pair[0].end > 1)
        .map(|pair| Gap {
            start: pair[0].end + 1,
            end: pair[1].start - 1,
        })
        .collect();

    Continuity { segments, gaps }
}

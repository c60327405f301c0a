//! # Reference Tuning Table
//!
//! Holds the named target pitches the live signal is scored against. Each
//! entry carries its expected period in samples and a running difference
//! score. Entries never move once built; the current ranking is a separate
//! permutation that is only reordered when an assessment window closes.

use crate::error::{TunerError, TunerResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named target pitch as supplied in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSpec {
    /// Identifier, e.g. "e2"
    pub name: String,
    /// Target frequency in Hz
    pub frequency: f32,
}

impl ReferenceSpec {
    pub fn new(name: impl Into<String>, frequency: f32) -> Self {
        Self {
            name: name.into(),
            frequency,
        }
    }
}

/// A reference pitch resolved against a sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTuning {
    name: String,
    target_frequency: f32,
    expected_offset: usize,
    /// Period-weighted difference accumulated over the current assessment window.
    pub accumulated_difference: f32,
}

impl ReferenceTuning {
    /// Resolves `spec` to a period of `round(sample_rate / frequency)` samples.
    pub fn new(spec: &ReferenceSpec, sample_rate: u32) -> TunerResult<Self> {
        let invalid = || TunerError::InvalidReferenceFrequency {
            name: spec.name.clone(),
            frequency: spec.frequency,
        };
        if !spec.frequency.is_finite() || spec.frequency <= 0.0 {
            return Err(invalid());
        }
        let offset = (sample_rate as f64 / spec.frequency as f64).round();
        if offset < 1.0 {
            return Err(invalid());
        }
        Ok(Self {
            name: spec.name.clone(),
            target_frequency: spec.frequency,
            expected_offset: offset as usize,
            accumulated_difference: 0.0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_frequency(&self) -> f32 {
        self.target_frequency
    }

    /// Samples per period of the target frequency.
    pub fn expected_offset(&self) -> usize {
        self.expected_offset
    }
}

/// Ordered collection of references plus the current ranking.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    entries: Vec<ReferenceTuning>,
    ranking: Vec<usize>,
}

impl ReferenceTable {
    /// Builds the table in configuration order.
    ///
    /// # Errors
    /// * `EmptyReferenceSet` - `specs` is empty
    /// * `DuplicateReference` - two specs share a name
    /// * `InvalidReferenceFrequency` - a frequency cannot be turned into a period
    pub fn new(specs: &[ReferenceSpec], sample_rate: u32) -> TunerResult<Self> {
        if specs.is_empty() {
            return Err(TunerError::EmptyReferenceSet);
        }
        let mut seen = HashSet::with_capacity(specs.len());
        let mut entries = Vec::with_capacity(specs.len());
        for spec in specs {
            if !seen.insert(spec.name.as_str()) {
                return Err(TunerError::DuplicateReference(spec.name.clone()));
            }
            entries.push(ReferenceTuning::new(spec, sample_rate)?);
        }
        let ranking = (0..entries.len()).collect();
        Ok(Self { entries, ranking })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in configuration order.
    pub fn entries(&self) -> &[ReferenceTuning] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [ReferenceTuning] {
        &mut self.entries
    }

    pub fn get(&self, name: &str) -> Option<&ReferenceTuning> {
        self.entries.iter().find(|r| r.name == name)
    }

    /// Entries in current rank order, best first.
    pub fn ranked(&self) -> impl Iterator<Item = &ReferenceTuning> + '_ {
        self.ranking.iter().map(move |&i| &self.entries[i])
    }

    /// Current best candidate.
    pub fn best(&self) -> &ReferenceTuning {
        // Non-empty by construction.
        &self.entries[self.ranking[0]]
    }

    /// Re-ranks ascending by accumulated difference.
    ///
    /// The sort is stable against the previous ranking, so ties keep their
    /// earlier order.
    pub fn sort_by_difference(&mut self) {
        let entries = &self.entries;
        self.ranking.sort_by(|&a, &b| {
            entries[a]
                .accumulated_difference
                .total_cmp(&entries[b].accumulated_difference)
        });
    }

    /// Zeroes every score and restores configuration order.
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.accumulated_difference = 0.0;
        }
        for (slot, index) in self.ranking.iter_mut().zip(0..) {
            *slot = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guitar() -> Vec<ReferenceSpec> {
        vec![
            ReferenceSpec::new("e2", 82.4069),
            ReferenceSpec::new("a2", 110.0),
            ReferenceSpec::new("e4", 329.628),
        ]
    }

    #[test]
    fn offsets_are_rounded_periods() {
        let table = ReferenceTable::new(&guitar(), 44100).unwrap();
        let offsets: Vec<usize> = table
            .entries()
            .iter()
            .map(|r| r.expected_offset())
            .collect();
        assert_eq!(offsets, vec![535, 401, 134]);
    }

    #[test]
    fn rejects_bad_sets() {
        assert_eq!(
            ReferenceTable::new(&[], 44100).unwrap_err(),
            TunerError::EmptyReferenceSet
        );

        let dup = vec![
            ReferenceSpec::new("a", 110.0),
            ReferenceSpec::new("a", 220.0),
        ];
        assert_eq!(
            ReferenceTable::new(&dup, 44100).unwrap_err(),
            TunerError::DuplicateReference("a".into())
        );

        for frequency in [0.0, -5.0, f32::NAN, f32::INFINITY, 100_000.0] {
            let bad = vec![ReferenceSpec::new("x", frequency)];
            assert!(matches!(
                ReferenceTable::new(&bad, 44100),
                Err(TunerError::InvalidReferenceFrequency { .. })
            ));
        }
    }

    #[test]
    fn sort_is_stable_and_reset_restores_order() {
        let mut table = ReferenceTable::new(&guitar(), 44100).unwrap();
        assert_eq!(table.best().name(), "e2");

        table.entries_mut()[0].accumulated_difference = 3.0;
        table.entries_mut()[1].accumulated_difference = 1.0;
        table.entries_mut()[2].accumulated_difference = 1.0;
        table.sort_by_difference();
        let names: Vec<&str> = table.ranked().map(|r| r.name()).collect();
        assert_eq!(names, vec!["a2", "e4", "e2"]);

        table.reset();
        let names: Vec<&str> = table.ranked().map(|r| r.name()).collect();
        assert_eq!(names, vec!["e2", "a2", "e4"]);
        for entry in table.entries() {
            assert_eq!(entry.accumulated_difference, 0.0);
        }
    }
}

use crate::sequence::VdjSequence;
use serde::{Deserialize, Serialize};

/// Averages over the identified reads of a sample, used to decide which V
/// germlines a read cannot be told apart from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationAverages {
    /// Mean length of the V comparison window.
    pub v_length: f64,
    pub mutation_fraction: f64,
}

impl PopulationAverages {
    /// Average over every sequence with a V call. `None` if there is none.
    pub fn from_sequences<'a>(sequences: impl IntoIterator<Item = &'a VdjSequence>) -> Option<Self> {
        let (mut n, mut v_length, mut mutation_fraction) = (0usize, 0.0, 0.0);
        for v in sequences.into_iter().filter_map(VdjSequence::v_call) {
            n += 1;
            v_length += v.length as f64;
            mutation_fraction += v.mutation_fraction;
        }
        (n > 0).then(|| PopulationAverages {
            v_length: v_length / n as f64,
            mutation_fraction: mutation_fraction / n as f64,
        })
    }
}

use crate::sequence::{IdentState, VdjSequence};
use serde::{Deserialize, Serialize};
use vdj_types::{GeneSet, Orientation};

/// The outcome of identifying one read, as handed to storage.
///
/// Statistics of a stage that was not reached are `None`; the V and J gene
/// sets are empty when the segment was not assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationRecord {
    pub id: String,
    pub copy_number: usize,
    pub state: IdentState,
    pub raw_sequence: String,
    pub sequence: String,
    pub germline: Option<String>,
    pub sequence_filled: Option<String>,
    pub orientation: Option<Orientation>,
    pub v_genes: GeneSet,
    pub j_genes: GeneSet,
    pub v_anchor_pos: Option<isize>,
    pub j_anchor_pos: Option<isize>,
    pub cdr3_start: Option<usize>,
    pub cdr3_len: usize,
    pub cdr3: Option<String>,
    pub cdr3_aa: Option<String>,
    pub v_match: Option<usize>,
    pub v_length: Option<usize>,
    pub j_match: Option<usize>,
    pub j_length: Option<usize>,
    pub pre_cdr3_match: Option<usize>,
    pub pre_cdr3_length: Option<usize>,
    pub post_cdr3_match: Option<usize>,
    pub post_cdr3_length: Option<usize>,
    pub mutation_fraction: Option<f64>,
    pub num_gaps: Option<usize>,
    pub pad_length: usize,
    pub possible_indel: bool,
    pub in_frame: bool,
    pub functional: bool,
    pub stop: bool,
}

fn utf8(seq: &[u8]) -> String {
    String::from_utf8_lossy(seq).into_owned()
}

impl From<&VdjSequence> for IdentificationRecord {
    fn from(s: &VdjSequence) -> Self {
        let j = s.j_call();
        let v = s.v_call();
        let a = s.alignment();
        IdentificationRecord {
            id: s.id().to_string(),
            copy_number: s.copy_number(),
            state: s.state(),
            raw_sequence: utf8(s.raw_sequence()),
            sequence: utf8(s.sequence()),
            germline: s.germline().map(utf8),
            sequence_filled: s.sequence_filled().as_deref().map(utf8),
            orientation: s.orientation(),
            v_genes: s.v_genes(),
            j_genes: s.j_genes(),
            v_anchor_pos: s.v_anchor_pos(),
            j_anchor_pos: s.j_anchor_pos(),
            cdr3_start: a.map(|a| a.cdr3_start),
            cdr3_len: a.map_or(0, |a| a.cdr3_len),
            cdr3: s.cdr3().map(utf8),
            cdr3_aa: s.cdr3_aa().as_deref().map(utf8),
            v_match: v.map(|v| v.matches),
            v_length: v.map(|v| v.length),
            j_match: j.map(|j| j.matches),
            j_length: j.map(|j| j.length),
            pre_cdr3_match: a.map(|a| a.pre_cdr3_match),
            pre_cdr3_length: a.map(|a| a.pre_cdr3_length),
            post_cdr3_match: a.map(|a| a.post_cdr3_match),
            post_cdr3_length: a.map(|a| a.post_cdr3_length),
            mutation_fraction: s.mutation_fraction(),
            num_gaps: a.map(|a| a.num_gaps),
            pad_length: s.pad_length(),
            possible_indel: s.has_possible_indel(),
            in_frame: s.in_frame(),
            functional: s.functional(),
            stop: s.stop(),
        }
    }
}

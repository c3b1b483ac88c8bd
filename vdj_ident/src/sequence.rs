//!
//! The identification of a single read: J search, V search with a single
//! reverse complement retry, and the separately invoked germline alignment.
//!
use crate::align::{GermlineAligner, GermlineAlignment, VTieResolver};
use crate::context::AlignmentContext;
use crate::j_locator::{JCall, JLocator};
use crate::population::PopulationAverages;
use crate::record::IdentificationRecord;
use crate::v_anchor::find_v_position;
use crate::v_compare::{VCall, VSelector};
use byteseq::PAD;
use log::debug;
use parameters_toml::IdentParams;
use serde::{Deserialize, Serialize};
use vdj_reference::errors::ReferenceError;
use vdj_reference::GermlineReferenceSet;
use vdj_types::{GeneSet, Orientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentState {
    Created,
    JSearched,
    VSearched,
    /// Terminal: the read has no J, no V, or no CDR3.
    Unidentified,
    /// Terminal: aligned to its germline.
    Aligned,
}

/// Genes the caller has already assigned. A forced J restricts the anchor
/// search to that gene; forced V genes are the only V candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForcedGenes {
    pub v: Option<GeneSet>,
    pub j: Option<String>,
}

/// A read and everything known about it so far.
#[derive(Debug, Clone, PartialEq)]
pub struct VdjSequence {
    id: String,
    raw: Vec<u8>,
    is_full_v: bool,
    copy_number: usize,
    state: IdentState,
    ctx: AlignmentContext,
    j: Option<JCall>,
    v: Option<VCall>,
    alignment: Option<GermlineAlignment>,
}

impl VdjSequence {
    /// Identify the V and J genes of `seq`. A read that cannot be identified
    /// ends up in [`IdentState::Unidentified`]; this never fails.
    ///
    /// `is_full_v` marks reads expected to cover the whole V gene, which are
    /// rejected if they would need padding to reach the germline anchor.
    pub fn new(
        id: impl Into<String>,
        seq: &[u8],
        is_full_v: bool,
        reference: &GermlineReferenceSet,
        params: &IdentParams,
        forced: &ForcedGenes,
    ) -> Self {
        let mut sequence = VdjSequence {
            id: id.into(),
            raw: seq.to_vec(),
            is_full_v,
            copy_number: 1,
            state: IdentState::Created,
            ctx: AlignmentContext::new(seq.to_vec()),
            j: None,
            v: None,
            alignment: None,
        };
        if !byteseq::is_read_alphabet(seq) {
            sequence.unidentified("invalid characters");
            return sequence;
        }

        let locator = JLocator::new(reference, params);
        let restrict = forced.j.as_deref().map(GeneSet::single);
        let Some((ctx, j)) = locator.locate(&sequence.ctx, restrict.as_ref(), true) else {
            sequence.unidentified("no J anchor");
            return sequence;
        };
        sequence.state = IdentState::JSearched;

        let selector = VSelector::new(reference, params.mismatch_threshold);
        let forced_v = forced.v.as_ref();
        let mut found =
            find_v(&selector, &ctx, forced_v, is_full_v).map(|(ctx, v)| (ctx, j.clone(), v));
        if found.is_none() && j.orientation == Orientation::Forward {
            // Retry on the other strand, where the J has to be located again
            // among the genes already called. The locator only searches the
            // sequence it is given, so the strand is set relative to the raw read.
            found = locator
                .locate(&ctx.reverse_complement(), Some(&j.genes), false)
                .and_then(|(rc_ctx, rc_j)| {
                    let rc_j = JCall {
                        orientation: j.orientation.flip(),
                        ..rc_j
                    };
                    find_v(&selector, &rc_ctx, forced_v, is_full_v).map(|(ctx, v)| (ctx, rc_j, v))
                });
        }

        match found {
            Some((ctx, j, v)) => {
                sequence.ctx = ctx;
                sequence.j = Some(j);
                sequence.v = Some(v);
                sequence.state = IdentState::VSearched;
            }
            None => {
                sequence.ctx = ctx;
                sequence.j = Some(j);
                sequence.unidentified("no V");
            }
        }
        sequence
    }

    fn unidentified(&mut self, reason: &str) {
        debug!("{}: unidentified after {:?}: {}", self.id, self.state, reason);
        self.state = IdentState::Unidentified;
    }

    /// Align an identified read to its germline, resolving its V ties with
    /// `resolver`. Does nothing unless the read is in [`IdentState::VSearched`].
    ///
    /// Fails only if the resolver returns no gene or an unknown one.
    pub fn align_to_germline(
        mut self,
        averages: &PopulationAverages,
        resolver: &dyn VTieResolver,
        reference: &GermlineReferenceSet,
        params: &IdentParams,
    ) -> Result<Self, ReferenceError> {
        if self.state != IdentState::VSearched {
            return Ok(self);
        }
        let aligner = GermlineAligner::new(reference, params, resolver);
        let aligned = match (&self.v, &self.j) {
            (Some(v), Some(j)) => Some(aligner.align(self.ctx.clone(), v, j, averages)?),
            _ => None,
        };
        let Some((ctx, alignment)) = aligned else {
            return Ok(self);
        };
        self.ctx = ctx;
        match alignment {
            Some(alignment) => {
                self.alignment = Some(alignment);
                self.state = IdentState::Aligned;
            }
            None => {
                self.v = None;
                self.unidentified("empty CDR3");
            }
        }
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn raw_sequence(&self) -> &[u8] {
        &self.raw
    }

    /// The working sequence: reverse complemented if the J was found on the
    /// other strand, padded and gapped once aligned.
    pub fn sequence(&self) -> &[u8] {
        self.ctx.seq()
    }

    pub fn is_full_v(&self) -> bool {
        self.is_full_v
    }

    pub fn state(&self) -> IdentState {
        self.state
    }

    pub fn is_identified(&self) -> bool {
        matches!(self.state, IdentState::VSearched | IdentState::Aligned)
    }

    pub fn copy_number(&self) -> usize {
        self.copy_number
    }

    pub fn set_copy_number(&mut self, copy_number: usize) {
        self.copy_number = copy_number;
    }

    pub fn j_call(&self) -> Option<&JCall> {
        self.j.as_ref()
    }

    pub fn v_call(&self) -> Option<&VCall> {
        self.v.as_ref()
    }

    pub fn alignment(&self) -> Option<&GermlineAlignment> {
        self.alignment.as_ref()
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.j.as_ref().map(|j| j.orientation)
    }

    /// Called J genes, empty if there is no J.
    pub fn j_genes(&self) -> GeneSet {
        self.j.as_ref().map(|j| j.genes.clone()).unwrap_or_default()
    }

    /// Called V genes, after tie resolution once aligned. Empty if there is
    /// no V.
    pub fn v_genes(&self) -> GeneSet {
        match (&self.alignment, &self.v) {
            (Some(alignment), _) => alignment.v_genes.clone(),
            (None, Some(v)) => v.genes.clone(),
            (None, None) => GeneSet::new(),
        }
    }

    pub fn j_anchor_pos(&self) -> Option<isize> {
        self.ctx.j_anchor()
    }

    pub fn v_anchor_pos(&self) -> Option<isize> {
        self.ctx.v_anchor()
    }

    pub fn mutation_fraction(&self) -> Option<f64> {
        self.v.as_ref().map(|v| v.mutation_fraction)
    }

    pub fn germline(&self) -> Option<&[u8]> {
        self.alignment.as_ref().map(|a| a.germline.as_slice())
    }

    pub fn cdr3(&self) -> Option<&[u8]> {
        let a = self.alignment.as_ref()?;
        self.sequence().get(a.cdr3_start..a.cdr3_start + a.cdr3_len)
    }

    pub fn cdr3_aa(&self) -> Option<Vec<u8>> {
        self.cdr3()
            .map(|cdr3| amino::nucleotide_to_aminoacid_sequence(cdr3, 0))
    }

    /// The aligned sequence with every `N` replaced by the germline.
    pub fn sequence_filled(&self) -> Option<Vec<u8>> {
        let germline = self.germline()?;
        Some(
            self.sequence()
                .iter()
                .zip(germline)
                .map(|(&s, &g)| if s == PAD { g } else { s })
                .collect(),
        )
    }

    /// Number of `N` prepended to align the read, 0 if it was trimmed.
    pub fn pad_length(&self) -> usize {
        self.alignment
            .as_ref()
            .map_or(0, |a| a.pad_len.max(0) as usize)
    }

    pub fn in_frame(&self) -> bool {
        self.alignment
            .as_ref()
            .is_some_and(|a| a.cdr3_len % 3 == 0)
    }

    pub fn stop(&self) -> bool {
        self.alignment.is_some() && amino::has_stop_in_frame(self.sequence())
    }

    pub fn functional(&self) -> bool {
        self.in_frame() && !self.stop()
    }

    pub fn has_possible_indel(&self) -> bool {
        self.alignment.as_ref().is_some_and(|a| a.possible_indel)
    }

    pub fn record(&self) -> IdentificationRecord {
        IdentificationRecord::from(self)
    }
}

fn find_v(
    selector: &VSelector<'_>,
    ctx: &AlignmentContext,
    forced: Option<&GeneSet>,
    is_full_v: bool,
) -> Option<(AlignmentContext, VCall)> {
    let pos = find_v_position(ctx.seq())?;
    let ctx = ctx.clone().with_v_anchor(pos);
    let call = selector.select(&ctx, forced, is_full_v)?;
    Some((ctx, call))
}

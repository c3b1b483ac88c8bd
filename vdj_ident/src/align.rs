//!
//! Alignment of an identified read to its germline: V tie resolution, padding
//! and gapping of the read to the germline coordinates, and the CDR3.
//!
use crate::context::AlignmentContext;
use crate::indel::IndelDetector;
use crate::j_locator::JCall;
use crate::population::PopulationAverages;
use crate::v_compare::VCall;
use byteseq::{GAP, PAD};
use parameters_toml::IdentParams;
use std::iter;
use vdj_reference::errors::ReferenceError;
use vdj_reference::{GermlineReferenceSet, VGermline};
use vdj_types::GeneSet;

/// Picks the V germlines a read is aligned to from the tie set it was called
/// with.
pub trait VTieResolver: Sync {
    fn resolve(
        &self,
        genes: &GeneSet,
        averages: &PopulationAverages,
        reference: &GermlineReferenceSet,
    ) -> GeneSet;
}

/// Align to the common sequence of the called ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepTies;

impl VTieResolver for KeepTies {
    fn resolve(
        &self,
        genes: &GeneSet,
        _averages: &PopulationAverages,
        _reference: &GermlineReferenceSet,
    ) -> GeneSet {
        genes.clone()
    }
}

/// Widen the ties to every germline that cannot be told apart from a called
/// germline given the average V length and mutation fraction of the
/// population.
///
/// Two germlines are indistinguishable when, over the `v_length` ungapped
/// nucleotides ending at the CDR3, they differ by no more than the number of
/// mutations expected over that length.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityTieResolver;

impl VTieResolver for SimilarityTieResolver {
    fn resolve(
        &self,
        genes: &GeneSet,
        averages: &PopulationAverages,
        reference: &GermlineReferenceSet,
    ) -> GeneSet {
        let length = averages.v_length.round().max(0.0) as usize;
        if length == 0 {
            return genes.clone();
        }
        let max_distance = (length as f64 * averages.mutation_fraction).round() as usize;

        let mut ties = genes.clone();
        for called in reference.iter_v_subset(genes) {
            let Some(called_tail) = v_tail(called, length) else {
                continue;
            };
            ties.extend(
                reference
                    .iter_v()
                    .filter(|other| {
                        v_tail(other, length).is_some_and(|other_tail| {
                            byteseq::hamming(called_tail, other_tail) <= max_distance
                        })
                    })
                    .map(|other| other.name()),
            );
        }
        ties
    }
}

fn v_tail(germline: &VGermline, length: usize) -> Option<&[u8]> {
    let anchor = germline.ungapped_anchor_pos()?;
    Some(&germline.ungapped()[anchor.saturating_sub(length)..anchor])
}

/// Consensus of `seqs`, with `N` where they disagree. As long as the shortest.
pub fn common_seq(seqs: &[&[u8]]) -> Vec<u8> {
    let len = seqs.iter().map(|s| s.len()).min().unwrap_or(0);
    (0..len)
        .map(|i| {
            let first = seqs[0][i];
            if seqs.iter().all(|s| s[i] == first) {
                first
            } else {
                PAD
            }
        })
        .collect()
}

/// A read aligned to its germline. The read itself is the sequence of the
/// context returned with it.
#[derive(Debug, Clone, PartialEq)]
pub struct GermlineAlignment {
    /// The V genes after tie resolution.
    pub v_genes: GeneSet,
    /// The germline: gapped V up to the CDR3, one gap per CDR3 nucleotide,
    /// then the J germline after the CDR3.
    pub germline: Vec<u8>,
    /// Number of `N` prepended to the read; negative if the read was trimmed.
    pub pad_len: isize,
    pub cdr3_start: usize,
    pub cdr3_len: usize,
    pub num_gaps: usize,
    pub pre_cdr3_length: usize,
    pub pre_cdr3_match: usize,
    pub post_cdr3_length: usize,
    pub post_cdr3_match: usize,
    pub possible_indel: bool,
}

pub struct GermlineAligner<'a> {
    reference: &'a GermlineReferenceSet,
    resolver: &'a dyn VTieResolver,
    detector: IndelDetector,
}

impl<'a> GermlineAligner<'a> {
    pub fn new(
        reference: &'a GermlineReferenceSet,
        params: &IdentParams,
        resolver: &'a dyn VTieResolver,
    ) -> Self {
        GermlineAligner {
            reference,
            resolver,
            detector: IndelDetector::new(params),
        }
    }

    /// Bring the read of `ctx` to germline coordinates.
    ///
    /// The returned context holds the padded and gapped read. The alignment is
    /// `None` when the CDR3 would be empty or negative, in which case the V
    /// call does not hold.
    pub fn align(
        &self,
        ctx: AlignmentContext,
        v: &VCall,
        j: &JCall,
        averages: &PopulationAverages,
    ) -> Result<(AlignmentContext, Option<GermlineAlignment>), ReferenceError> {
        let v_genes = self.resolver.resolve(&v.genes, averages, self.reference);
        if v_genes.is_empty() {
            return Err(ReferenceError::EmptyResolution {
                ties: v.genes.to_string(),
            });
        }
        let mut gapped = Vec::with_capacity(v_genes.len());
        for gene in v_genes.iter() {
            let germline =
                self.reference
                    .v(gene)
                    .ok_or_else(|| ReferenceError::UnknownResolvedGene {
                        gene: gene.to_string(),
                    })?;
            gapped.push(germline.gapped());
        }
        let mut germline = common_seq(&gapped);
        germline.truncate(self.reference.cdr3_offset());

        let pad_len = byteseq::ungapped_len(&germline) as isize - v.anchor_pos as isize;
        let mut ctx = ctx.shift(pad_len);
        for (i, _) in germline.iter().enumerate().filter(|&(_, &b)| b == GAP) {
            ctx = ctx.insert_gap(i);
        }

        // The V anchor now sits at the end of the germline prefix.
        let cdr3_start = germline.len();
        let Some(j_anchor) = ctx.j_anchor() else {
            return Ok((ctx, None));
        };
        let cdr3_len = j_anchor + j.cdr3_end_from_anchor - cdr3_start as isize;
        if cdr3_len <= 0 {
            return Ok((ctx, None));
        }
        let cdr3_len = cdr3_len as usize;

        let j_offset = self.reference.j_offset();
        let j_germline = self.reference.j(&j.gene).unwrap_or_default();
        let j_tail = &j_germline[j_germline.len().saturating_sub(j_offset)..];
        germline.extend(iter::repeat(GAP).take(cdr3_len));
        germline.extend_from_slice(j_tail);

        let (ctx, padded) = ctx.resize(germline.len());
        let seq = ctx.seq();

        let num_gaps = seq[..cdr3_start].iter().filter(|&&b| b == GAP).count();
        let mut pre_germ = byteseq::strip_gaps(&germline[..cdr3_start]);
        let mut pre_seq = byteseq::strip_gaps(&seq[..cdr3_start]);
        if pad_len > 0 {
            let pad = pad_len as usize;
            pre_germ.drain(..pad.min(pre_germ.len()));
            pre_seq.drain(..pad.min(pre_seq.len()));
        }
        let pre_cdr3_length = pre_seq.len();
        let pre_cdr3_match = pre_cdr3_length.saturating_sub(byteseq::hamming(&pre_seq, &pre_germ));

        let post_cdr3_length = j_tail.len();
        let post_cdr3_match = post_cdr3_length
            .saturating_sub(byteseq::hamming(j_tail, &seq[cdr3_start + cdr3_len..]));

        let possible_indel = padded || self.detector.scan(seq, &germline, cdr3_start);

        let alignment = GermlineAlignment {
            v_genes,
            germline,
            pad_len,
            cdr3_start,
            cdr3_len,
            num_gaps,
            pre_cdr3_length,
            pre_cdr3_match,
            post_cdr3_length,
            post_cdr3_match,
            possible_indel,
        };
        Ok((ctx, Some(alignment)))
    }
}

//!
//! Search for the J segment of a read, seeded by the J anchor table.
//!
use crate::context::AlignmentContext;
use parameters_toml::IdentParams;
use vdj_reference::{AnchorCandidate, GermlineReferenceSet};
use vdj_types::{GeneSet, Orientation};

/// A located J segment.
#[derive(Debug, Clone, PartialEq)]
pub struct JCall {
    /// The matched gene together with every gene sharing its anchor motif.
    pub genes: GeneSet,
    /// The gene whose anchor matched first.
    pub gene: String,
    /// Start of the anchor motif in the read.
    pub anchor_pos: usize,
    /// Start of the anchor motif in the J germline of `gene`.
    pub germline_offset: usize,
    /// Distance from the anchor start to the end of the CDR3. Negative when
    /// the anchor lies past the CDR3.
    pub cdr3_end_from_anchor: isize,
    /// Start of the trimmed J germline in the read.
    pub start: usize,
    pub length: usize,
    pub matches: usize,
    pub orientation: Orientation,
}

/// Finds the longest J anchor occurring in a read or its reverse complement.
pub struct JLocator<'a> {
    reference: &'a GermlineReferenceSet,
    params: &'a IdentParams,
}

impl<'a> JLocator<'a> {
    pub fn new(reference: &'a GermlineReferenceSet, params: &'a IdentParams) -> Self {
        JLocator { reference, params }
    }

    /// Try every anchor in search order on the read, then on its reverse
    /// complement when `allow_reverse` is set. The first anchor found decides
    /// the call: if the J germline does not fit the read around it, the read
    /// has no J.
    ///
    /// On success the returned context is in the orientation the anchor was
    /// found in, with its J anchor set. When `restrict` is given only those
    /// genes are searched and reported.
    pub fn locate(
        &self,
        ctx: &AlignmentContext,
        restrict: Option<&GeneSet>,
        allow_reverse: bool,
    ) -> Option<(AlignmentContext, JCall)> {
        let mut reversed: Option<AlignmentContext> = None;
        for candidate in self
            .reference
            .anchors()
            .candidates(self.params.min_j_anchor_len, restrict)
        {
            if let Some(pos) = byteseq::rfind(ctx.seq(), candidate.motif) {
                return self.found(ctx.clone(), pos, candidate, restrict, Orientation::Forward);
            }
            if !allow_reverse {
                continue;
            }
            let rc = reversed.get_or_insert_with(|| ctx.reverse_complement());
            if let Some(pos) = byteseq::rfind(rc.seq(), candidate.motif) {
                return self.found(rc.clone(), pos, candidate, restrict, Orientation::Reverse);
            }
        }
        None
    }

    fn found(
        &self,
        ctx: AlignmentContext,
        anchor_pos: usize,
        candidate: AnchorCandidate<'_>,
        restrict: Option<&GeneSet>,
        orientation: Orientation,
    ) -> Option<(AlignmentContext, JCall)> {
        let gene = &candidate.anchor.gene;
        let germline = self.reference.j(gene)?;
        let j_offset = self.reference.j_offset();
        let seq = ctx.seq();

        // The part of the J germline inside the CDR3.
        let j_in_cdr3 = &germline[..germline.len() - j_offset];
        let j_end = anchor_pos as isize - candidate.anchor.germline_offset as isize
            + germline.len() as isize;
        let cdr3_end = j_end - j_offset as isize;
        let clamp = |p: isize| p.clamp(0, seq.len() as isize) as usize;
        let segment = &seq[clamp(cdr3_end - j_in_cdr3.len() as isize)..clamp(cdr3_end)];
        if j_in_cdr3.is_empty() || segment.is_empty() {
            return None;
        }

        // Keep the J nucleotides in the CDR3 up to the first mismatch streak,
        // walking away from the CDR3 end.
        let extent = byteseq::find_streak_position(
            j_in_cdr3.iter().rev(),
            segment.iter().rev(),
            self.params.mismatch_threshold,
        )
        .unwrap_or(j_in_cdr3.len());
        let length = extent + j_offset;
        let start = j_end - length as isize;
        if start < 0 || j_end > seq.len() as isize {
            return None;
        }
        let start = start as usize;
        let dist = byteseq::hamming(
            &germline[germline.len() - length..],
            &seq[start..start + length],
        );

        let mut genes = self.reference.anchors().ties(candidate.motif);
        if let Some(restrict) = restrict {
            genes = genes.intersection(restrict);
        }
        let call = JCall {
            genes,
            gene: gene.clone(),
            anchor_pos,
            germline_offset: candidate.anchor.germline_offset,
            cdr3_end_from_anchor: germline.len() as isize
                - candidate.anchor.germline_offset as isize
                - j_offset as isize,
            start,
            length,
            matches: length - dist,
            orientation,
        };
        Some((ctx.with_j_anchor(anchor_pos), call))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const J4: &str = "TACTTTGACTACTGGGGCCAAGGAACCCTGGTCACCGTCTCCTCAG";
    const J6: &str = "TACTACTACTACGGTATGGACGTCTGGGGGCAAGGGACCACGGTCACCGTCTCCTCAG";

    fn reference() -> GermlineReferenceSet {
        GermlineReferenceSet::new(
            vec![("IGHV1".into(), b"CAGGTGCAGCTGGTGCAGTCTGGGGCTGAGGTG".to_vec())],
            vec![
                ("IGHJ4".into(), J4.as_bytes().to_vec()),
                ("IGHJ6".into(), J6.as_bytes().to_vec()),
            ],
            Some(vec![
                ("IGHJ4".into(), b"TGGGGCCAAGGAACCCTGGTCACC".to_vec()),
                ("IGHJ6".into(), b"TGGGGGCAAGGGACCACGGTCACC".to_vec()),
            ]),
            31,
            24,
        )
        .unwrap()
    }

    fn locate(
        seq: &str,
        restrict: Option<&GeneSet>,
        allow_reverse: bool,
    ) -> Option<(AlignmentContext, JCall)> {
        let reference = reference();
        let params = IdentParams::default();
        JLocator::new(&reference, &params).locate(
            &AlignmentContext::new(seq.as_bytes().to_vec()),
            restrict,
            allow_reverse,
        )
    }

    #[test]
    fn test_exact_j() {
        let seq = format!("GGCGGCGGCGAGAGA{J4}");
        let (ctx, call) = locate(&seq, None, true).unwrap();
        assert_eq!(call.gene, "IGHJ4");
        assert_eq!(call.genes.to_string(), "IGHJ4");
        assert_eq!(call.anchor_pos, 15 + 12);
        assert_eq!(ctx.j_anchor(), Some(27));
        assert_eq!(call.germline_offset, 12);
        assert_eq!(call.cdr3_end_from_anchor, 3);
        assert_eq!(call.start, 15);
        assert_eq!(call.length, J4.len());
        assert_eq!(call.matches, J4.len());
        assert_eq!(call.orientation, Orientation::Forward);
        assert_eq!(ctx.seq(), seq.as_bytes());
    }

    #[test]
    fn test_trimmed_j() {
        // The first 6 nucleotides of the J germline are replaced by a streak
        // of mismatches.
        let seq = format!("GGCGGCGGCGAGAGAGGACGG{}", &J4[6..]);
        let (_, call) = locate(&seq, None, true).unwrap();
        assert_eq!(call.length, J4.len() - 6);
        assert_eq!(call.start, 21);
        assert_eq!(call.matches, J4.len() - 6);
    }

    #[test]
    fn test_reverse_j() {
        let seq = format!("GGCGGCGGCGAGAGA{J6}");
        let rc = String::from_utf8(byteseq::revcomp(seq.as_bytes())).unwrap();
        let (ctx, call) = locate(&rc, None, true).unwrap();
        assert_eq!(call.orientation, Orientation::Reverse);
        assert_eq!(call.gene, "IGHJ6");
        assert_eq!(ctx.seq(), seq.as_bytes());
        assert_eq!(call.matches, J6.len());
        assert!(locate(&rc, None, false).is_none());
    }

    #[test]
    fn test_short_anchor() {
        // Only the first 18 nucleotides of the anchor are present, so the J
        // germline extends past the end of the read.
        let seq = format!("GGCGGCGGCGAGAGA{}", &J4[..30]);
        assert!(locate(&seq, None, true).is_none());
    }

    #[test]
    fn test_restrict() {
        let seq = format!("GGCGGCGGCGAGAGA{J4}");
        assert!(locate(&seq, Some(&GeneSet::single("IGHJ6")), true).is_none());
        let (_, call) = locate(&seq, Some(&GeneSet::single("IGHJ4")), true).unwrap();
        assert_eq!(call.genes, GeneSet::single("IGHJ4"));
        assert!(locate("GGCGGCGGCGAGAGA", None, true).is_none());
    }
}

//!
//! Scoring of V germlines against the V region of a read, and selection of
//! the closest germlines.
//!
use crate::context::AlignmentContext;
use vdj_reference::{GermlineReferenceSet, VGermline};
use vdj_types::GeneSet;

/// The outcome of comparing one germline to the read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VComparison {
    Scored { distance: usize, length: usize },
    /// The germline does not overlap the anchored window of the read.
    Incomparable,
}

/// The V window of a read: the sequence, its V anchor and the J anchor that
/// bounds the comparison on the right.
#[derive(Debug, Clone, Copy)]
pub struct VComparator<'a> {
    seq: &'a [u8],
    v_anchor: usize,
    j_anchor: usize,
    max_streak: usize,
}

impl<'a> VComparator<'a> {
    pub fn new(seq: &'a [u8], v_anchor: usize, j_anchor: usize, max_streak: usize) -> Self {
        VComparator {
            seq,
            v_anchor,
            j_anchor,
            max_streak,
        }
    }

    /// Align the germline to the read on their V anchors and count the
    /// mismatches over the overlap. Past the anchor the overlap stops at the
    /// read's J anchor or at the first mismatch streak, whichever comes first.
    pub fn compare(&self, germline: &VGermline) -> VComparison {
        let Some(germ_anchor) = germline.ungapped_anchor_pos() else {
            return VComparison::Incomparable;
        };
        let (germ_start, read_start) = if self.v_anchor >= germ_anchor {
            (0, self.v_anchor - germ_anchor)
        } else {
            (germ_anchor - self.v_anchor, 0)
        };
        let germ = &germline.ungapped()[germ_start..];
        let read = &self.seq[read_start..];
        let anchor = germ_anchor.min(self.v_anchor);

        let mut end = germ
            .len()
            .min(read.len())
            .min(self.j_anchor.saturating_sub(read_start));
        if end <= anchor {
            return VComparison::Incomparable;
        }
        if let Some(p) = byteseq::find_streak_position(
            &germ[anchor..end],
            &read[anchor..end],
            self.max_streak,
        ) {
            end = anchor + p;
        }
        if end == 0 {
            return VComparison::Incomparable;
        }
        VComparison::Scored {
            distance: byteseq::hamming(&germ[..end], &read[..end]),
            length: end,
        }
    }
}

/// The V germlines closest to a read.
#[derive(Debug, Clone, PartialEq)]
pub struct VCall {
    pub genes: GeneSet,
    /// V anchor in the read.
    pub anchor_pos: usize,
    pub distance: usize,
    pub length: usize,
    pub matches: usize,
    /// Germline anchor minus read anchor. Negative when the read starts before
    /// the germline.
    pub pad_len: isize,
    pub mutation_fraction: f64,
}

/// Runs the comparator over every candidate germline and keeps the ones at
/// minimum distance.
pub struct VSelector<'a> {
    reference: &'a GermlineReferenceSet,
    max_streak: usize,
}

impl<'a> VSelector<'a> {
    pub fn new(reference: &'a GermlineReferenceSet, max_streak: usize) -> Self {
        VSelector {
            reference,
            max_streak,
        }
    }

    /// Select the V genes for a context with both anchors set. Only the genes
    /// in `forced` are candidates when it is given.
    ///
    /// Returns `None` if no germline is comparable, or if a full length read
    /// would need padding on the left to reach the germline anchor.
    pub fn select(
        &self,
        ctx: &AlignmentContext,
        forced: Option<&GeneSet>,
        is_full_v: bool,
    ) -> Option<VCall> {
        let v_anchor = usize::try_from(ctx.v_anchor()?).ok()?;
        let j_anchor = usize::try_from(ctx.j_anchor()?).ok()?;
        let comparator = VComparator::new(ctx.seq(), v_anchor, j_anchor, self.max_streak);

        let candidates: Box<dyn Iterator<Item = &VGermline> + '_> = match forced {
            Some(genes) => Box::new(self.reference.iter_v_subset(genes)),
            None => Box::new(self.reference.iter_v()),
        };

        let mut best: Option<(usize, usize, usize)> = None;
        let mut genes = GeneSet::new();
        for germline in candidates {
            let VComparison::Scored { distance, length } = comparator.compare(germline) else {
                continue;
            };
            match best {
                Some((best_distance, _, _)) if distance > best_distance => {}
                Some((best_distance, _, _)) if distance == best_distance => {
                    genes.insert(germline.name());
                }
                _ => {
                    let Some(germ_anchor) = germline.ungapped_anchor_pos() else {
                        continue;
                    };
                    best = Some((distance, length, germ_anchor));
                    genes = GeneSet::single(germline.name());
                }
            }
        }

        let (distance, length, germ_anchor) = best?;
        let pad_len = germ_anchor as isize - v_anchor as isize;
        if is_full_v && pad_len > 0 {
            return None;
        }
        Some(VCall {
            genes,
            anchor_pos: v_anchor,
            distance,
            length,
            matches: length - distance,
            pad_len,
            mutation_fraction: distance as f64 / length as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1: &str = "CAGGTGCAGCTGGTGCAGTCTGGG---GCTGAGGTGAAGAAGCCTGGGGCCTCAGTGAAGGTCGACACGGCCGTGTATTACTGTGCGAGAGA";

    fn germline(seq: &str) -> VGermline {
        VGermline::new("IGHV1", seq.as_bytes(), 81).unwrap()
    }

    fn read() -> Vec<u8> {
        byteseq::strip_gaps(V1.as_bytes())[..78]
            .iter()
            .chain(b"TGTGCGAGAGACTACTTTGACTACTGGGGCCAAGG")
            .copied()
            .collect()
    }

    #[test]
    fn test_exact() {
        let read = read();
        let comparator = VComparator::new(&read, 78, 102, 3);
        assert_eq!(
            comparator.compare(&germline(V1)),
            VComparison::Scored {
                distance: 0,
                length: 89
            }
        );
    }

    #[test]
    fn test_window_bounds() {
        let read = read();
        // The J anchor cuts the window short.
        let comparator = VComparator::new(&read, 78, 84, 3);
        assert_eq!(
            comparator.compare(&germline(V1)),
            VComparison::Scored {
                distance: 0,
                length: 84
            }
        );
        // A read starting 10 nucleotides into the germline.
        let comparator = VComparator::new(&read[10..], 68, 92, 3);
        assert_eq!(
            comparator.compare(&germline(V1)),
            VComparison::Scored {
                distance: 0,
                length: 79
            }
        );
        // The J anchor sits before the V anchor.
        let comparator = VComparator::new(&read, 78, 60, 3);
        assert_eq!(comparator.compare(&germline(V1)), VComparison::Incomparable);
        // The germline stops before the CDR3.
        let short = VGermline::new("IGHV9", &V1.as_bytes()[..60], 81).unwrap();
        assert_eq!(
            VComparator::new(&read, 78, 102, 3).compare(&short),
            VComparison::Incomparable
        );
    }

    #[test]
    fn test_streak_after_anchor() {
        let mut read = read();
        // Four mismatches right after the cysteine codon end the window, the
        // lone mismatch before the anchor is counted.
        read[81..85].copy_from_slice(b"ATCT");
        read[5] = b'A';
        let comparator = VComparator::new(&read, 78, 102, 3);
        assert_eq!(
            comparator.compare(&germline(V1)),
            VComparison::Scored {
                distance: 1,
                length: 81
            }
        );
    }

    #[test]
    fn test_select_skips_germlines_without_anchor() {
        let reference = GermlineReferenceSet::new(
            vec![
                ("IGHV0".into(), V1.as_bytes()[..60].to_vec()),
                ("IGHV1".into(), V1.as_bytes().to_vec()),
            ],
            vec![(
                "IGHJ4".into(),
                b"TACTTTGACTACTGGGGCCAAGGAACCCTGGTCACCGTCTCCTCAG".to_vec(),
            )],
            None,
            31,
            81,
        )
        .unwrap();
        let ctx = AlignmentContext::new(read())
            .with_j_anchor(102)
            .with_v_anchor(78);
        let call = VSelector::new(&reference, 3).select(&ctx, None, false).unwrap();
        assert_eq!(call.genes, GeneSet::single("IGHV1"));
        assert_eq!((call.distance, call.length, call.pad_len), (0, 89, 0));

        let forced = GeneSet::single("IGHV0");
        assert_eq!(
            VSelector::new(&reference, 3).select(&ctx, Some(&forced), false),
            None
        );
    }
}

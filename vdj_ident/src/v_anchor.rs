// This file contains the scan for the conserved cysteine that closes the V
// segment and opens the CDR3.
//
// The read is translated in each of its three frames and searched for a series
// of amino acid motifs around the cysteine, from most to least specific.

use amino::nucleotide_to_aminoacid_sequence;
use lazy_static::lazy_static;
use regex::bytes::Regex;

lazy_static! {
    // Each motif ends with the cysteine.
    static ref V_ANCHOR_MOTIFS: [Regex; 3] = [
        Regex::new(r"(?-u)D.{3}(?:YY|YC|YH)C").unwrap(),
        Regex::new(r"(?-u)Y[YHC]C").unwrap(),
        Regex::new(r"(?-u)D.{4}C").unwrap(),
    ];
}

/// Return the nucleotide position of the first base of the V anchor codon in
/// `seq`, or `None` if no motif is found in any frame.
///
/// Motifs are tried in order of specificity; for each motif the frames are
/// tried in order and the left-most match wins.
pub fn find_v_position(seq: &[u8]) -> Option<usize> {
    let frames: Vec<Vec<u8>> = (0..3)
        .map(|frame| nucleotide_to_aminoacid_sequence(seq, frame))
        .collect();
    V_ANCHOR_MOTIFS.iter().find_map(|motif| {
        frames.iter().enumerate().find_map(|(frame, aa)| {
            motif.find(aa).map(|m| (m.end() - 1) * 3 + frame)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_v_position() {
        // GCC GAC ACG GCC GTG TAT TAC TGT GCG AGA: A D T A V Y Y C A R
        let seq = b"GCCGACACGGCCGTGTATTACTGTGCGAGA";
        assert_eq!(find_v_position(seq), Some(21));
        assert_eq!(&seq[21..24], b"TGT");

        // Same motif in frame 2.
        let shifted = [b"AC".as_slice(), seq].concat();
        assert_eq!(find_v_position(&shifted), Some(23));
    }

    #[test]
    fn test_fallback_motifs() {
        // Only Y Y C: GGC TAT TAC TGT GGC
        assert_eq!(find_v_position(b"GGCTATTACTGTGGC"), Some(9));
        // Only D . . . . C: GAC GGC GGC GGC GGC TGT
        assert_eq!(find_v_position(b"GACGGCGGCGGCGGCTGT"), Some(15));
        assert_eq!(find_v_position(b"GGCGGCGGCGGC"), None);
        assert_eq!(find_v_position(b""), None);
    }

    #[test]
    fn test_specific_motif_preferred() {
        // A Y Y C early in the read, the full D...YYC later.
        let seq = b"TATTACTGTGGCGACACGGCCGTGTATTACTGTGCG";
        assert_eq!(find_v_position(seq), Some(30));
    }
}

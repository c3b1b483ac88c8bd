//! Crate for dealing with dna sequences represented as a byte vector
#![deny(missing_docs)]

use std::borrow::Borrow;

/// Characters allowed in a raw read.
pub const READ_ALPHABET: &[u8; 5] = b"ACGTN";

/// The gap character used in gapped germlines and aligned reads.
pub const GAP: u8 = b'-';

/// The character used to pad reads.
pub const PAD: u8 = b'N';

const COMPLEMENT: [u8; 256] = make_complement_map();

const fn make_complement_map() -> [u8; 256] {
    let mut comp = [0; 256];
    // For some reason for isn't allowed in const contexts, but while is.
    let mut i = 0;
    while i < comp.len() {
        comp[i] = i as u8;
        i += 1;
    }
    const C1: &[u8; 15] = b"AGCTYRWSKMDVHBN";
    const C2: &[u8; 15] = b"TCGARYWSMKHBDVN";
    i = 0;
    while i < C1.len() {
        let (a, b) = (C1[i], C2[i]);
        comp[a as usize] = b;
        comp[a as usize + 32] = b + 32; // lowercase variants
        i += 1;
    }
    comp
}

/// Return complement of given DNA alphabet character (IUPAC alphabet supported).
const fn complement(a: u8) -> u8 {
    COMPLEMENT[a as usize]
}

/// Calculate reverse complement of given text (IUPAC alphabet supported).
pub fn revcomp<C, T>(text: T) -> Vec<u8>
where
    C: Borrow<u8>,
    T: IntoIterator<Item = C>,
    T::IntoIter: DoubleEndedIterator,
{
    text.into_iter()
        .rev()
        .map(|a| complement(*a.borrow()))
        .collect()
}

/// Return true if every byte of `seq` is one of `A`, `C`, `G`, `T` or `N`.
pub fn is_read_alphabet(seq: &[u8]) -> bool {
    seq.iter().all(|b| READ_ALPHABET.contains(b))
}

/// Number of mismatched positions between `a` and `b`. Positions past the end
/// of the shorter sequence count as mismatches.
pub fn hamming(a: &[u8], b: &[u8]) -> usize {
    let mismatches = a.iter().zip(b).filter(|(x, y)| x != y).count();
    mismatches + a.len().abs_diff(b.len())
}

/// Hamming distance where a `wildcard` in `reference` matches any base of `query`.
pub fn hamming_with_wildcard(reference: &[u8], query: &[u8], wildcard: u8) -> usize {
    let mismatches = reference
        .iter()
        .zip(query)
        .filter(|&(&r, &q)| r != wildcard && r != q)
        .count();
    mismatches + reference.len().abs_diff(query.len())
}

/// Walk `a` and `b` in lockstep and return the index of the first mismatch of
/// the first run of more than `max_streak` consecutive mismatches, or `None`
/// if no such run exists.
///
/// The returned index is the number of leading positions that are considered
/// part of the match.
pub fn find_streak_position<A, B>(a: A, b: B, max_streak: usize) -> Option<usize>
where
    A: IntoIterator,
    B: IntoIterator,
    A::Item: Borrow<u8>,
    B::Item: Borrow<u8>,
{
    let mut streak = 0;
    for (i, (x, y)) in a.into_iter().zip(b).enumerate() {
        let (x, y): (u8, u8) = (*x.borrow(), *y.borrow());
        if x == y {
            streak = 0;
        } else {
            streak += 1;
            if streak > max_streak {
                return Some(i + 1 - streak);
            }
        }
    }
    None
}

/// Copy of `seq` with every gap removed.
pub fn strip_gaps(seq: &[u8]) -> Vec<u8> {
    seq.iter().copied().filter(|&b| b != GAP).collect()
}

/// Number of non-gap characters in `seq`.
pub fn ungapped_len(seq: &[u8]) -> usize {
    seq.iter().filter(|&&b| b != GAP).count()
}

/// Start of the right-most occurrence of `needle` in `haystack`.
pub fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(haystack.len());
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

//! amino
// Copyright (c) 2019 10x Genomics, Inc. All rights reserved.
#![deny(missing_docs)]

const STOP_CODONS: [&[u8]; 3] = [b"TAG", b"TAA", b"TGA"];

/// Return whether position `j` is a stop codon
pub fn have_stop(b: &[u8], j: usize) -> bool {
    b.get(j..j + 3)
        .is_some_and(|codon| STOP_CODONS.contains(&codon))
}

/// Return whether any codon read in frame from the start of `b` is a stop codon.
/// A trailing partial codon is ignored.
pub fn has_stop_in_frame(b: &[u8]) -> bool {
    (0..b.len()).step_by(3).any(|j| have_stop(b, j))
}

/// Convert a codon to an amino acid
/// Codons containing anything but `A`, `C`, `G` or `T` translate to `X`.
pub fn codon_to_aa(codon: &[u8]) -> u8 {
    match codon {
        b"GGT" => b'G',
        b"GGC" => b'G',
        b"GGA" => b'G',
        b"GGG" => b'G',
        b"TGG" => b'W',
        b"TGT" => b'C',
        b"TGC" => b'C',
        b"TTT" => b'F',
        b"TTC" => b'F',
        b"TTA" => b'L',
        b"TTG" => b'L',
        b"CTT" => b'L',
        b"CTC" => b'L',
        b"CTA" => b'L',
        b"CTG" => b'L',
        b"ATT" => b'I',
        b"ATC" => b'I',
        b"ATA" => b'I',
        b"GTT" => b'V',
        b"GTC" => b'V',
        b"GTA" => b'V',
        b"GTG" => b'V',
        b"TCT" => b'S',
        b"TCC" => b'S',
        b"TCA" => b'S',
        b"TCG" => b'S',
        b"AGT" => b'S',
        b"AGC" => b'S',
        b"CCT" => b'P',
        b"CCC" => b'P',
        b"CCA" => b'P',
        b"CCG" => b'P',
        b"ACT" => b'T',
        b"ACC" => b'T',
        b"ACA" => b'T',
        b"ACG" => b'T',
        b"GCT" => b'A',
        b"GCC" => b'A',
        b"GCA" => b'A',
        b"GCG" => b'A',
        b"TAT" => b'Y',
        b"TAC" => b'Y',
        b"CAT" => b'H',
        b"CAC" => b'H',
        b"CAA" => b'Q',
        b"CAG" => b'Q',
        b"AAT" => b'N',
        b"AAC" => b'N',
        b"AAA" => b'K',
        b"AAG" => b'K',
        b"GAT" => b'D',
        b"GAC" => b'D',
        b"GAA" => b'E',
        b"GAG" => b'E',
        b"CGT" => b'R',
        b"CGC" => b'R',
        b"CGA" => b'R',
        b"CGG" => b'R',
        b"AGA" => b'R',
        b"AGG" => b'R',
        b"ATG" => b'M',
        b"TAG" => b'*',
        b"TAA" => b'*',
        b"TGA" => b'*',
        _ => b'X',
    }
}

/// Convert a given DNA sequence to amino acids, starting at a given position.
/// Codons made entirely of gaps become a gap, a trailing partial codon is dropped.
pub fn nucleotide_to_aminoacid_sequence(dna_seq: &[u8], start: usize) -> Vec<u8> {
    dna_seq
        .get(start..)
        .unwrap_or_default()
        .chunks_exact(3)
        .map(|codon| {
            if codon == b"---" {
                b'-'
            } else {
                codon_to_aa(codon)
            }
        })
        .collect()
}

#![allow(dead_code)]

use parameters_toml::IdentParams;
use vdj_ident::{ForcedGenes, KeepTies, PopulationAverages, VdjSequence};
use vdj_reference::GermlineReferenceSet;

// Gapped V germlines; the CDR3 starts at the TGT codon, gapped position 81.
pub const IGHV1: &str = "CAGGTGCAGCTGGTGCAGTCTGGG---GCTGAGGTGAAGAAGCCTGGGGCCTCAGTGAAGGTCGACACGGCCGTGTATTACTGTGCGAGAGA";
pub const IGHV2: &str = "GAGGTGCAGCTGTTGGAGTCTGGG---GGAGGCTTGGTACAGCCTGGGGGGTCCCTGAGACTCGACACAGCCGTGTATTACTGTGCGAAAGA";
// IGHV1 with a different first two codons.
pub const IGHV1B: &str = "GATATTCAGCTGGTGCAGTCTGGG---GCTGAGGTGAAGAAGCCTGGGGCCTCAGTGAAGGTCGACACGGCCGTGTATTACTGTGCGAGAGA";
pub const CDR3_OFFSET: usize = 81;

pub const IGHJ4: &str = "TACTTTGACTACTGGGGCCAAGGAACCCTGGTCACCGTCTCCTCAG";
pub const IGHJ5: &str = "AACTGGTTCGACTCCTGGGGCCAAGGAACCCTGGTCACCGTCTCCTCAG";
pub const IGHJ6: &str = "TACTACTACTACGGTATGGACGTCTGGGGGCAAGGGACCACGGTCACCGTCTCCTCAG";
pub const J_OFFSET: usize = 31;

pub const IGHJ45_ANCHOR: &str = "TGGGGCCAAGGAACCCTGGTCACC";
pub const IGHJ6_ANCHOR: &str = "TGGGGGCAAGGGACCACGGTCACC";

/// Start of the CDR3 in the germline V, up to the end of the germline.
pub const IGHV1_CDR3_HEAD: &str = "TGTGCGAGAGA";
pub const IGHV2_CDR3_HEAD: &str = "TGTGCGAAAGA";

fn entries(pairs: &[(&str, &str)]) -> Vec<(String, Vec<u8>)> {
    pairs
        .iter()
        .map(|(name, seq)| (name.to_string(), seq.as_bytes().to_vec()))
        .collect()
}

fn j_anchors() -> Vec<(String, Vec<u8>)> {
    entries(&[
        ("IGHJ4", IGHJ45_ANCHOR),
        ("IGHJ5", IGHJ45_ANCHOR),
        ("IGHJ6", IGHJ6_ANCHOR),
    ])
}

fn j_germlines() -> Vec<(String, Vec<u8>)> {
    entries(&[("IGHJ4", IGHJ4), ("IGHJ5", IGHJ5), ("IGHJ6", IGHJ6)])
}

pub fn reference() -> GermlineReferenceSet {
    GermlineReferenceSet::new(
        entries(&[("IGHV1", IGHV1), ("IGHV2", IGHV2)]),
        j_germlines(),
        Some(j_anchors()),
        J_OFFSET,
        CDR3_OFFSET,
    )
    .unwrap()
}

pub fn reference_with_ties() -> GermlineReferenceSet {
    GermlineReferenceSet::new(
        entries(&[("IGHV1", IGHV1), ("IGHV1b", IGHV1B), ("IGHV2", IGHV2)]),
        j_germlines(),
        Some(j_anchors()),
        J_OFFSET,
        CDR3_OFFSET,
    )
    .unwrap()
}

/// The ungapped V germline up to the CDR3.
pub fn v_prefix(v: &str) -> String {
    v.replace('-', "")[..78].to_string()
}

/// V prefix, CDR3 and the full J germline. `middle` goes between the end of
/// the germline V and the start of the germline J.
pub fn build_read(v: &str, cdr3_head: &str, middle: &str, j: &str) -> String {
    format!("{}{cdr3_head}{middle}{j}", v_prefix(v))
}

/// IGHV1, CDR3 `TGTGCGAGAGACTACTTTGACTACTGG` (CARDYFDYW), IGHJ4.
pub fn ighv1_ighj4() -> String {
    build_read(IGHV1, IGHV1_CDR3_HEAD, "C", IGHJ4)
}

/// IGHV2, a 45 nucleotide CDR3, IGHJ6.
pub fn ighv2_ighj6() -> String {
    build_read(IGHV2, IGHV2_CDR3_HEAD, "GGATCGG", IGHJ6)
}

pub fn revcomp(seq: &str) -> String {
    String::from_utf8(byteseq::revcomp(seq.as_bytes())).unwrap()
}

pub fn identify(reference: &GermlineReferenceSet, seq: &str) -> VdjSequence {
    VdjSequence::new(
        "read",
        seq.as_bytes(),
        false,
        reference,
        &IdentParams::default(),
        &ForcedGenes::default(),
    )
}

pub const AVERAGES: PopulationAverages = PopulationAverages {
    v_length: 89.0,
    mutation_fraction: 0.0,
};

pub fn align(reference: &GermlineReferenceSet, sequence: VdjSequence) -> VdjSequence {
    sequence
        .align_to_germline(&AVERAGES, &KeepTies, reference, &IdentParams::default())
        .unwrap()
}

pub fn identify_and_align(reference: &GermlineReferenceSet, seq: &str) -> VdjSequence {
    align(reference, identify(reference, seq))
}

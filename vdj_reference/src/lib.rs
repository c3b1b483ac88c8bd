//!
//! Germline reference data for sequence identification: gapped V germlines,
//! J germlines and the J anchor table.
//!
// Warning groups (as of rust 1.55)
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2021_compatibility,
    rust_2018_idioms,
    unused
)]

use anyhow::{Context, Result};
use bio::io::fasta;
use byteseq::GAP;
use errors::ReferenceError;
use log::warn;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;
use vdj_types::{GeneSet, Segment};

pub mod anchors;
pub mod errors;
pub use anchors::{AnchorCandidate, AnchorMotif, AnchorTable};

/// Gapped position (IMGT numbering) of the first nucleotide of the CDR3.
pub const DEFAULT_CDR3_OFFSET: usize = 309;

pub(crate) const ALLOWED_NUCLEOTIDES: &str = "ACGTN";

/// A V germline in gapped (IMGT) coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VGermline {
    name: String,
    gapped: Vec<u8>,
    ungapped: Vec<u8>,
    // Ungapped position of the first CDR3 nucleotide. None if the germline
    // does not reach the CDR3.
    anchor: Option<usize>,
}

impl VGermline {
    pub fn new(name: &str, gapped: &[u8], cdr3_offset: usize) -> Result<Self, ReferenceError> {
        let gapped = normalize(gapped);
        check_bases(Segment::V, name, &gapped, true)?;
        if let Some(position) = gapped
            .iter()
            .skip(cdr3_offset)
            .position(|&b| b == GAP)
        {
            return Err(ReferenceError::GapAfterCdr3 {
                gene: name.to_string(),
                position: cdr3_offset + position,
                cdr3_offset,
            });
        }
        let anchor = (gapped.len() > cdr3_offset).then(|| byteseq::ungapped_len(&gapped[..cdr3_offset]));
        Ok(VGermline {
            name: name.to_string(),
            ungapped: byteseq::strip_gaps(&gapped),
            gapped,
            anchor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gapped(&self) -> &[u8] {
        &self.gapped
    }

    pub fn ungapped(&self) -> &[u8] {
        &self.ungapped
    }

    /// Position of the CDR3 start in the ungapped germline.
    pub fn ungapped_anchor_pos(&self) -> Option<usize> {
        self.anchor
    }
}

/// The immutable germline reference: V germlines, J germlines, the J offset
/// (number of J nucleotides after the CDR3) and the J anchor table.
///
/// Built once and shared read-only by every identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GermlineReferenceSet {
    v: BTreeMap<String, VGermline>,
    j: BTreeMap<String, Vec<u8>>,
    j_offset: usize,
    cdr3_offset: usize,
    anchors: AnchorTable,
}

impl GermlineReferenceSet {
    /// Validate and assemble a reference set. With no `anchor_entries`, the
    /// trailing `j_offset` nucleotides of each J germline are its anchor.
    pub fn new(
        v_germlines: Vec<(String, Vec<u8>)>,
        j_germlines: Vec<(String, Vec<u8>)>,
        anchor_entries: Option<Vec<(String, Vec<u8>)>>,
        j_offset: usize,
        cdr3_offset: usize,
    ) -> Result<Self, ReferenceError> {
        if v_germlines.is_empty() {
            return Err(ReferenceError::EmptyGermlineSet {
                segment: Segment::V,
            });
        }
        if j_germlines.is_empty() {
            return Err(ReferenceError::EmptyGermlineSet {
                segment: Segment::J,
            });
        }
        if j_offset == 0 {
            return Err(ReferenceError::MissingJOffset);
        }

        let mut v = BTreeMap::new();
        for (name, seq) in v_germlines {
            let germline = VGermline::new(&name, &seq, cdr3_offset)?;
            if germline.anchor.is_none() {
                warn!("V germline {name} does not reach the CDR3 and will never be assigned");
            }
            if v.insert(name.clone(), germline).is_some() {
                return Err(ReferenceError::DuplicateGene {
                    segment: Segment::V,
                    gene: name,
                });
            }
        }

        let mut j = BTreeMap::new();
        for (name, seq) in j_germlines {
            let seq = normalize(&seq);
            check_bases(Segment::J, &name, &seq, false)?;
            if j_offset > seq.len() {
                return Err(ReferenceError::JOffsetTooLong {
                    gene: name,
                    j_offset,
                    len: seq.len(),
                });
            }
            if j.insert(name.clone(), seq).is_some() {
                return Err(ReferenceError::DuplicateGene {
                    segment: Segment::J,
                    gene: name,
                });
            }
        }

        let anchors = match anchor_entries {
            Some(entries) => AnchorTable::new(entries, &j)?,
            None => AnchorTable::from_j_suffixes(&j, j_offset)?,
        };

        Ok(GermlineReferenceSet {
            v,
            j,
            j_offset,
            cdr3_offset,
            anchors,
        })
    }

    /// Load V and J germlines from FASTA files and, optionally, the anchor
    /// table from a tab separated file.
    pub fn from_files(
        v_fasta: &Path,
        j_fasta: &Path,
        anchors: Option<&Path>,
        j_offset: usize,
        cdr3_offset: usize,
    ) -> Result<Self> {
        let v = read_germlines(fasta::Reader::from_file(v_fasta)?)
            .with_context(|| v_fasta.display().to_string())?;
        let j = read_germlines(fasta::Reader::from_file(j_fasta)?)
            .with_context(|| j_fasta.display().to_string())?;
        let anchor_entries = anchors.map(AnchorTable::read_entries).transpose()?;
        Ok(GermlineReferenceSet::new(
            v,
            j,
            anchor_entries,
            j_offset,
            cdr3_offset,
        )?)
    }

    pub fn j_offset(&self) -> usize {
        self.j_offset
    }

    pub fn cdr3_offset(&self) -> usize {
        self.cdr3_offset
    }

    pub fn anchors(&self) -> &AnchorTable {
        &self.anchors
    }

    pub fn v(&self, gene: &str) -> Option<&VGermline> {
        self.v.get(gene)
    }

    pub fn j(&self, gene: &str) -> Option<&[u8]> {
        self.j.get(gene).map(Vec::as_slice)
    }

    /// V germlines sorted by name.
    pub fn iter_v(&self) -> impl Iterator<Item = &VGermline> {
        self.v.values()
    }

    /// The V germlines named in `genes`, sorted by name. Unknown names are
    /// ignored.
    pub fn iter_v_subset<'a>(&'a self, genes: &'a GeneSet) -> impl Iterator<Item = &'a VGermline> {
        genes.iter().filter_map(|gene| self.v.get(gene))
    }

    pub fn num_v(&self) -> usize {
        self.v.len()
    }

    pub fn num_j(&self) -> usize {
        self.j.len()
    }
}

/// Read `(name, sequence)` pairs from a FASTA file. The record id is the gene
/// name, sequences are uppercased and `.` gaps become `-`.
pub fn read_germlines<R: BufRead>(reader: fasta::Reader<R>) -> Result<Vec<(String, Vec<u8>)>> {
    let mut data = Vec::new();
    for record in reader.records() {
        let record = record?;
        data.push((record.id().to_string(), normalize(record.seq())));
    }
    Ok(data)
}

fn normalize(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .map(|&b| if b == b'.' { GAP } else { b.to_ascii_uppercase() })
        .collect()
}

fn check_bases(
    segment: Segment,
    gene: &str,
    seq: &[u8],
    allow_gaps: bool,
) -> Result<(), ReferenceError> {
    for (i, &base) in seq.iter().enumerate() {
        let allowed = byteseq::READ_ALPHABET.contains(&base) || (allow_gaps && base == GAP);
        if !allowed {
            return Err(ReferenceError::InvalidBase {
                segment,
                gene: gene.to_string(),
                base: base as char,
                position: i + 1,
                allowed: ALLOWED_NUCLEOTIDES,
            });
        }
    }
    Ok(())
}

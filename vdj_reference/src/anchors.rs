//!
//! J anchor motifs and the tie groups of J genes that share a motif.
//!
use crate::errors::ReferenceError;
use anyhow::{Context, Result};
use fxhash::FxHashMap;
use std::collections::BTreeMap;
use std::path::Path;
use vdj_types::GeneSet;

/// Anchors are shortened this many nucleotides at a time.
pub const ANCHOR_TRIM_STEP: usize = 3;

/// A conserved motif within a J germline, used to seed the search for the J
/// segment in a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorMotif {
    pub gene: String,
    pub motif: Vec<u8>,
    /// Start of the right-most occurrence of `motif` in the J germline.
    pub germline_offset: usize,
}

/// One step of the anchor search: an anchor, possibly shortened from its 3' end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorCandidate<'a> {
    pub anchor: &'a AnchorMotif,
    pub motif: &'a [u8],
}

/// Per-gene anchor motifs in table order, together with the tie groups of
/// every motif reachable by trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorTable {
    anchors: Vec<AnchorMotif>,
    // Keyed by motif bytes only: anchors of different lengths that trim to
    // the same motif share one group.
    ties: FxHashMap<Vec<u8>, GeneSet>,
}

impl AnchorTable {
    /// Build the table from `(gene, motif)` entries. Every J germline needs
    /// exactly one entry and every motif must occur in its germline.
    pub fn new(
        entries: Vec<(String, Vec<u8>)>,
        j_germlines: &BTreeMap<String, Vec<u8>>,
    ) -> Result<Self, ReferenceError> {
        let mut anchors = Vec::with_capacity(entries.len());
        for (gene, motif) in entries {
            let Some(germline) = j_germlines.get(&gene) else {
                return Err(ReferenceError::UnknownAnchorGene { gene });
            };
            if anchors.iter().any(|a: &AnchorMotif| a.gene == gene) {
                return Err(ReferenceError::DuplicateAnchor { gene });
            }
            let motif = motif.to_ascii_uppercase();
            let germline_offset = match byteseq::rfind(germline, &motif) {
                Some(offset) if !motif.is_empty() => offset,
                _ => {
                    return Err(ReferenceError::AnchorNotInGermline {
                        gene,
                        motif: String::from_utf8_lossy(&motif).into_owned(),
                    })
                }
            };
            anchors.push(AnchorMotif {
                gene,
                motif,
                germline_offset,
            });
        }
        if let Some(gene) = j_germlines
            .keys()
            .find(|gene| !anchors.iter().any(|a| &a.gene == *gene))
        {
            return Err(ReferenceError::MissingAnchor { gene: gene.clone() });
        }

        let mut ties: FxHashMap<Vec<u8>, GeneSet> = FxHashMap::default();
        for anchor in &anchors {
            for trim in (0..anchor.motif.len()).step_by(ANCHOR_TRIM_STEP) {
                ties.entry(anchor.motif[..anchor.motif.len() - trim].to_vec())
                    .or_default()
                    .insert(anchor.gene.as_str());
            }
        }
        Ok(AnchorTable { anchors, ties })
    }

    /// Use the trailing `len` nucleotides of every J germline as its anchor.
    pub fn from_j_suffixes(
        j_germlines: &BTreeMap<String, Vec<u8>>,
        len: usize,
    ) -> Result<Self, ReferenceError> {
        let entries = j_germlines
            .iter()
            .map(|(gene, seq)| (gene.clone(), seq[seq.len().saturating_sub(len)..].to_vec()))
            .collect();
        AnchorTable::new(entries, j_germlines)
    }

    /// Read `(gene, motif)` entries from a two column tab separated file.
    /// File order is table order. Lines starting with `#` are skipped.
    pub fn read_entries(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .from_path(path)
            .with_context(|| path.display().to_string())?;
        let mut entries = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.with_context(|| path.display().to_string())?;
            if record.len() != 2 {
                return Err(ReferenceError::MalformedAnchorLine {
                    path: path.to_path_buf(),
                    line: i + 1,
                }
                .into());
            }
            entries.push((record[0].trim().to_string(), record[1].trim().as_bytes().to_vec()));
        }
        Ok(entries)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnchorMotif> {
        self.anchors.iter()
    }

    pub fn get(&self, gene: &str) -> Option<&AnchorMotif> {
        self.anchors.iter().find(|a| a.gene == gene)
    }

    /// All anchors in search order: every anchor at full length in table
    /// order, then every anchor shortened by 3 nucleotides, and so on while
    /// the motif is at least `min_len` long. Only genes in `restrict` are
    /// considered when it is given.
    pub fn candidates<'a>(
        &'a self,
        min_len: usize,
        restrict: Option<&'a GeneSet>,
    ) -> impl Iterator<Item = AnchorCandidate<'a>> + 'a {
        let max_len = self.anchors.iter().map(|a| a.motif.len()).max().unwrap_or(0);
        (0..max_len)
            .step_by(ANCHOR_TRIM_STEP)
            .flat_map(move |trim| {
                self.anchors
                    .iter()
                    .filter(move |a| restrict.map_or(true, |genes| genes.contains(&a.gene)))
                    .filter_map(move |anchor| {
                        let len = anchor.motif.len().checked_sub(trim)?;
                        (len >= min_len.max(1)).then(|| AnchorCandidate {
                            anchor,
                            motif: &anchor.motif[..len],
                        })
                    })
            })
    }

    /// Genes whose anchor, trimmed to the length of `motif`, equals `motif`.
    pub fn ties(&self, motif: &[u8]) -> GeneSet {
        self.ties.get(motif).cloned().unwrap_or_default()
    }
}

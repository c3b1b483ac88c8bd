use std::path::PathBuf;
use vdj_types::Segment;

/// Problems with the germline reference data. These describe a misconfigured
/// reference, never a property of a read, and abort processing of a batch.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("The {segment} germline set is empty.")]
    EmptyGermlineSet { segment: Segment },

    #[error("The {segment} germline '{gene}' is listed more than once.")]
    DuplicateGene { segment: Segment, gene: String },

    #[error(
        "Invalid character '{base}' at position {position} of the {segment} germline '{gene}'. \
         Only {allowed} characters are allowed."
    )]
    InvalidBase {
        segment: Segment,
        gene: String,
        base: char,
        position: usize,
        allowed: &'static str,
    },

    #[error(
        "The V germline '{gene}' has a gap at position {position}, at or after the start of \
         the CDR3 (position {cdr3_offset})."
    )]
    GapAfterCdr3 {
        gene: String,
        position: usize,
        cdr3_offset: usize,
    },

    #[error("The J offset (number of J nucleotides after the CDR3) must be positive.")]
    MissingJOffset,

    #[error(
        "The J offset {j_offset} is longer than the J germline '{gene}' ({len} nucleotides)."
    )]
    JOffsetTooLong {
        gene: String,
        j_offset: usize,
        len: usize,
    },

    #[error("The J germline '{gene}' has no anchor motif.")]
    MissingAnchor { gene: String },

    #[error("The anchor table lists '{gene}', which is not a known J germline.")]
    UnknownAnchorGene { gene: String },

    #[error("The anchor table lists '{gene}' more than once.")]
    DuplicateAnchor { gene: String },

    #[error("The anchor motif '{motif}' of '{gene}' is empty or does not occur in its germline.")]
    AnchorNotInGermline { gene: String, motif: String },

    #[error("Line {line} of the anchor table {path:?} must have 2 tab-separated fields (gene, motif).")]
    MalformedAnchorLine { path: PathBuf, line: usize },

    #[error("The V tie resolver returned '{gene}', which is not a known V germline.")]
    UnknownResolvedGene { gene: String },

    #[error("The V tie resolver returned no germlines for the ties [{ties}].")]
    EmptyResolution { ties: String },
}

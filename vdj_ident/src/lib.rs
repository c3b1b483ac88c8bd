//!
//! Identification of the V and J germline genes of immune receptor reads.
//!
//! A read is searched for a J anchor (on both strands), then for the
//! conserved cysteine that opens the CDR3, and the closest V germlines are
//! selected. Identified reads can then be aligned to their germline, which
//! fixes the CDR3 and the match statistics reported in an
//! [`IdentificationRecord`].
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

pub mod align;
pub mod batch;
pub mod context;
pub mod indel;
pub mod j_locator;
pub mod population;
pub mod record;
pub mod sequence;
pub mod v_anchor;
pub mod v_compare;

pub use align::{
    common_seq, GermlineAligner, GermlineAlignment, KeepTies, SimilarityTieResolver, VTieResolver,
};
pub use batch::{identify_batch, RawRead};
pub use context::AlignmentContext;
pub use indel::IndelDetector;
pub use j_locator::{JCall, JLocator};
pub use population::PopulationAverages;
pub use record::IdentificationRecord;
pub use sequence::{ForcedGenes, IdentState, VdjSequence};
pub use v_anchor::find_v_position;
pub use v_compare::{VCall, VComparator, VComparison, VSelector};

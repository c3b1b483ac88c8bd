//!
//! Identification of many reads at once.
//!
use crate::align::VTieResolver;
use crate::population::PopulationAverages;
use crate::record::IdentificationRecord;
use crate::sequence::{ForcedGenes, VdjSequence};
use log::info;
use parameters_toml::IdentParams;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use vdj_reference::errors::ReferenceError;
use vdj_reference::GermlineReferenceSet;

/// A read to identify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRead {
    pub id: String,
    pub seq: String,
    #[serde(default)]
    pub is_full_v: bool,
}

/// Identify every read, compute the population averages over the identified
/// ones and align those to their germlines. Records are returned in input
/// order.
pub fn identify_batch(
    reads: &[RawRead],
    reference: &GermlineReferenceSet,
    params: &IdentParams,
    forced: &ForcedGenes,
    resolver: &dyn VTieResolver,
) -> Result<Vec<IdentificationRecord>, ReferenceError> {
    let sequences: Vec<VdjSequence> = reads
        .par_iter()
        .map(|read| {
            VdjSequence::new(
                read.id.as_str(),
                read.seq.as_bytes(),
                read.is_full_v,
                reference,
                params,
                forced,
            )
        })
        .collect();

    let Some(averages) = PopulationAverages::from_sequences(&sequences) else {
        info!("none of {} reads identified", reads.len());
        return Ok(sequences.iter().map(IdentificationRecord::from).collect());
    };
    info!(
        "{} of {} reads identified, average V length {:.1}, average mutation fraction {:.4}",
        sequences.iter().filter(|s| s.is_identified()).count(),
        reads.len(),
        averages.v_length,
        averages.mutation_fraction
    );

    sequences
        .into_par_iter()
        .map(|sequence| {
            sequence
                .align_to_germline(&averages, resolver, reference, params)
                .map(|aligned| aligned.record())
        })
        .collect()
}

//!
//! Windowed mismatch density scan of the aligned V region.
//!
use byteseq::{GAP, PAD};
use parameters_toml::IdentParams;

/// Flags a read whose V region has a window dense enough in mismatches to
/// suggest an insertion, a deletion or a misalignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndelDetector {
    window: usize,
    min_mismatches: f64,
}

impl IndelDetector {
    pub fn new(params: &IdentParams) -> Self {
        IndelDetector {
            window: params.indel_window,
            min_mismatches: params.indel_min_mismatches(),
        }
    }

    /// Scan `seq` against `germline` from the first called base of the read
    /// up to `cdr3_start`, skipping germline gaps. An `N` in the germline
    /// matches anything.
    pub fn scan(&self, seq: &[u8], germline: &[u8], cdr3_start: usize) -> bool {
        let Some(start) = seq.iter().position(|b| b"ACGT".contains(b)) else {
            return false;
        };
        let end = cdr3_start.min(seq.len()).min(germline.len());
        if start >= end || self.window == 0 {
            return false;
        }
        let pairs: Vec<(u8, u8)> = germline[start..end]
            .iter()
            .zip(&seq[start..end])
            .filter(|&(&g, _)| g != GAP)
            .map(|(&g, &s)| (g, s))
            .collect();
        pairs.windows(self.window).any(|w| {
            let mismatches = w.iter().filter(|&&(g, s)| g != PAD && g != s).count();
            mismatches as f64 >= self.min_mismatches
        })
    }
}

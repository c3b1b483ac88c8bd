// Warning groups (as of rust 1.55)
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2021_compatibility,
    rust_2018_idioms,
    unused
)]

use anyhow::{ensure, Context, Result};
use log::warn;
use serde::Deserialize;
use std::path::Path;

/// Calibration constants of the sequence identification engine.
///
/// Every field may be overridden from a TOML file; missing fields keep their
/// default value.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct IdentParams {
    /// Number of consecutive mismatches tolerated before a V or J match is cut.
    pub mismatch_threshold: usize,
    /// J anchors are truncated 3 nucleotides at a time down to this length.
    pub min_j_anchor_len: usize,
    /// Width of the sliding window used to look for indels before the CDR3.
    pub indel_window: usize,
    /// Fraction of mismatches in one window that flags a possible indel.
    pub indel_mismatch_threshold: f64,
}

pub const DEFAULT_PARAMETERS: IdentParams = IdentParams {
    mismatch_threshold: 3,
    min_j_anchor_len: 12,
    indel_window: 30,
    indel_mismatch_threshold: 0.6,
};

impl Default for IdentParams {
    fn default() -> Self {
        DEFAULT_PARAMETERS
    }
}

macro_rules! warn_non_default {
    ($params:expr, $($a:ident),+) => {
        $(
            if DEFAULT_PARAMETERS.$a != $params.$a {
                warn!("using non-default {} = {:?}", stringify!($a), $params.$a);
            }
        )+
    };
}

impl IdentParams {
    /// Parse parameters from the contents of a TOML file.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let params: IdentParams = toml::from_str(s)?;
        params.validate()?;
        warn_non_default!(
            params,
            mismatch_threshold,
            min_j_anchor_len,
            indel_window,
            indel_mismatch_threshold
        );
        Ok(params)
    }

    /// Load parameters from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| path.display().to_string())?;
        IdentParams::from_toml_str(&s).with_context(|| path.display().to_string())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.indel_window > 0, "indel_window must be positive");
        ensure!(self.min_j_anchor_len > 0, "min_j_anchor_len must be positive");
        ensure!(
            self.indel_mismatch_threshold > 0.0 && self.indel_mismatch_threshold <= 1.0,
            "indel_mismatch_threshold must be in (0, 1], found {}",
            self.indel_mismatch_threshold
        );
        Ok(())
    }

    /// Minimum number of mismatches in a window that flags a possible indel.
    pub fn indel_min_mismatches(&self) -> f64 {
        self.indel_mismatch_threshold * self.indel_window as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let params = IdentParams::default();
        assert_eq!(params.mismatch_threshold, 3);
        assert_eq!(params.min_j_anchor_len, 12);
        assert_eq!(params.indel_window, 30);
        assert_eq!(params.indel_mismatch_threshold, 0.6);
        assert_eq!(params.indel_min_mismatches(), 18.0);
        assert_eq!(IdentParams::from_toml_str("").unwrap(), params);
    }

    #[test]
    fn test_partial_override() {
        let params = IdentParams::from_toml_str("indel_window = 20\nmismatch_threshold = 2").unwrap();
        assert_eq!(params.indel_window, 20);
        assert_eq!(params.mismatch_threshold, 2);
        assert_eq!(params.min_j_anchor_len, 12);
    }

    #[test]
    fn test_invalid() {
        assert!(IdentParams::from_toml_str("indel_window = 0").is_err());
        assert!(IdentParams::from_toml_str("indel_mismatch_threshold = 1.5").is_err());
        assert!(IdentParams::from_toml_str("min_j_anchor_length = 12").is_err());
        assert!(IdentParams::from_toml_str("mismatch_threshold = -1").is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_j_anchor_len = 15").unwrap();
        let params = IdentParams::from_path(file.path()).unwrap();
        assert_eq!(params.min_j_anchor_len, 15);

        let err = IdentParams::from_path(Path::new("/nonexistent/parameters.toml")).unwrap_err();
        assert!(err.to_string().contains("parameters.toml"));
    }
}

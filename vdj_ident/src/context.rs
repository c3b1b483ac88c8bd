//!
//! The working sequence together with the anchor offsets computed against it.
//!
use byteseq::{GAP, PAD};

/// A sequence and the J and V anchor offsets that refer to it.
///
/// Every change of the sequence goes through a method that consumes the
/// context and returns a new one with the offsets moved accordingly, so an
/// offset is never paired with a sequence it was not computed against.
/// Offsets are signed: trimming can move an anchor before the start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentContext {
    seq: Vec<u8>,
    j_anchor: Option<isize>,
    v_anchor: Option<isize>,
}

impl AlignmentContext {
    pub fn new(seq: Vec<u8>) -> Self {
        AlignmentContext {
            seq,
            j_anchor: None,
            v_anchor: None,
        }
    }

    pub fn seq(&self) -> &[u8] {
        &self.seq
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn j_anchor(&self) -> Option<isize> {
        self.j_anchor
    }

    pub fn v_anchor(&self) -> Option<isize> {
        self.v_anchor
    }

    pub fn with_j_anchor(self, pos: usize) -> Self {
        AlignmentContext {
            j_anchor: Some(pos as isize),
            ..self
        }
    }

    pub fn with_v_anchor(self, pos: usize) -> Self {
        AlignmentContext {
            v_anchor: Some(pos as isize),
            ..self
        }
    }

    /// Reverse complement the sequence. Both anchors are dropped since they
    /// have no meaning on the other strand.
    pub fn reverse_complement(&self) -> Self {
        AlignmentContext::new(byteseq::revcomp(&self.seq))
    }

    /// Prepend `shift` pad characters, or remove `-shift` leading characters
    /// when `shift` is negative. Anchors move by `shift`.
    pub fn shift(self, shift: isize) -> Self {
        let seq = if shift >= 0 {
            let mut seq = vec![PAD; shift as usize];
            seq.extend_from_slice(&self.seq);
            seq
        } else {
            let trim = shift.unsigned_abs().min(self.seq.len());
            self.seq[trim..].to_vec()
        };
        AlignmentContext {
            seq,
            j_anchor: self.j_anchor.map(|p| p + shift),
            v_anchor: self.v_anchor.map(|p| p + shift),
        }
    }

    /// Insert a gap before position `pos`. Anchors at or after `pos` move right.
    pub fn insert_gap(self, pos: usize) -> Self {
        let pos = pos.min(self.seq.len());
        let mut seq = self.seq;
        seq.insert(pos, GAP);
        let bump = |p: isize| if p >= pos as isize { p + 1 } else { p };
        AlignmentContext {
            seq,
            j_anchor: self.j_anchor.map(bump),
            v_anchor: self.v_anchor.map(bump),
        }
    }

    /// Right-pad with `N` or truncate to exactly `len` characters. The flag is
    /// true when padding was needed.
    pub fn resize(self, len: usize) -> (Self, bool) {
        let padded = self.seq.len() < len;
        let mut seq = self.seq;
        seq.resize(len, PAD);
        (AlignmentContext { seq, ..self }, padded)
    }
}

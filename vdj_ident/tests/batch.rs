mod common;

use common::*;
use parameters_toml::IdentParams;
use pretty_assertions::assert_eq;
use vdj_ident::{
    identify_batch, ForcedGenes, IdentState, IdentificationRecord, KeepTies, RawRead,
    SimilarityTieResolver,
};
use vdj_types::Orientation;

fn raw(id: &str, seq: String) -> RawRead {
    RawRead {
        id: id.to_string(),
        seq,
        is_full_v: false,
    }
}

fn run(reads: &[RawRead]) -> Vec<IdentificationRecord> {
    identify_batch(
        reads,
        &reference(),
        &IdentParams::default(),
        &ForcedGenes::default(),
        &SimilarityTieResolver,
    )
    .unwrap()
}

#[test]
fn test_batch_keeps_input_order() {
    let reads = vec![
        raw("a", ighv1_ighj4()),
        raw("b", format!("ACGTX{}", ighv1_ighj4())),
        raw("c", revcomp(&ighv2_ighj6())),
        raw("d", format!("{}TGTGCGAGAGACTAC", v_prefix(IGHV1))),
    ];
    let records = run(&reads);
    assert_eq!(
        records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        vec!["a", "b", "c", "d"]
    );
    assert_eq!(
        records.iter().map(|r| r.state).collect::<Vec<_>>(),
        vec![
            IdentState::Aligned,
            IdentState::Unidentified,
            IdentState::Aligned,
            IdentState::Unidentified
        ]
    );

    let a = &records[0];
    assert_eq!(a.v_genes.to_string(), "IGHV1");
    assert_eq!(a.j_genes.to_string(), "IGHJ4|IGHJ5");
    assert_eq!(a.cdr3_aa.as_deref(), Some("CARDYFDYW"));
    assert_eq!(a.orientation, Some(Orientation::Forward));
    assert!(a.functional);

    let c = &records[2];
    assert_eq!(c.v_genes.to_string(), "IGHV2");
    assert_eq!(c.j_genes.to_string(), "IGHJ6");
    assert_eq!(c.orientation, Some(Orientation::Reverse));
    assert_eq!(c.cdr3_len, 45);
    assert_eq!(c.raw_sequence, reads[2].seq);

    let b = &records[1];
    assert!(b.v_genes.is_empty() && b.j_genes.is_empty());
    assert_eq!(b.cdr3, None);
    assert_eq!(b.cdr3_len, 0);
    assert!(!b.functional);
}

#[test]
fn test_batch_without_identified_reads() {
    let reads = vec![raw("x", "ACGT".repeat(10)), raw("y", String::new())];
    let records = run(&reads);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.state == IdentState::Unidentified));
    assert!(run(&[]).is_empty());
}

#[test]
fn test_batch_with_ties() {
    let reference = reference_with_ties();
    let reads = vec![
        raw("full", ighv1_ighj4()),
        raw("partial", ighv1_ighj4()[6..].to_string()),
        RawRead {
            is_full_v: true,
            ..raw("full_v", ighv1_ighj4()[6..].to_string())
        },
    ];
    let records = identify_batch(
        &reads,
        &reference,
        &IdentParams::default(),
        &ForcedGenes::default(),
        &KeepTies,
    )
    .unwrap();
    assert_eq!(records[0].v_genes.to_string(), "IGHV1");
    assert_eq!(records[1].v_genes.to_string(), "IGHV1|IGHV1b");
    assert_eq!(records[1].pad_length, 6);
    assert_eq!(records[1].germline.as_deref().map(|g| &g[..6]), Some("NANNTN"));
    assert_eq!(records[2].state, IdentState::Unidentified);
    assert_eq!(records[2].j_genes.to_string(), "IGHJ4|IGHJ5");
}

#[test]
fn test_record_json() {
    let records = run(&[raw("a", ighv1_ighj4())]);
    let json = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(json["id"], "a");
    assert_eq!(json["state"], "aligned");
    assert_eq!(json["orientation"], "forward");
    assert_eq!(json["v_genes"], serde_json::json!(["IGHV1"]));
    assert_eq!(json["j_genes"], serde_json::json!(["IGHJ4", "IGHJ5"]));
    assert_eq!(json["cdr3"], "TGTGCGAGAGACTACTTTGACTACTGG");
    assert_eq!(json["v_match"], 89);
    assert_eq!(json["possible_indel"], false);

    let back: IdentificationRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, records[0]);
}

#[test]
fn test_raw_read_defaults() {
    let read: RawRead = serde_json::from_str(r#"{"id": "r1", "seq": "ACGT"}"#).unwrap();
    assert_eq!(read, raw("r1", "ACGT".to_string()));
}

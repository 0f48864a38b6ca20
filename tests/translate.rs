use std::collections::BTreeSet;
use std::fs;
use std::sync::Mutex;

use assert_matches::assert_matches;
use serde_json::Value;

use tcga_idmap::domain::{Granularity, IdType};
use tcga_idmap::error::IdMapError;
use tcga_idmap::gdc::{Entity, Filter, GdcClient, GdcQuery};
use tcga_idmap::response::extract_leaves;
use tcga_idmap::translate::Translator;

const CASE_CK: &str = "ae55b2d3-62a1-419e-9f9a-5ddfac356db4";
const CASE_A17N: &str = "1f4e3d2c-9a8b-4c7d-8e6f-5a4b3c2d1e0f";
const FILE_1: &str = "0a1b2c3d-0000-4000-8000-000000000001";
const FILE_2: &str = "0a1b2c3d-0000-4000-8000-000000000002";
const FILE_3: &str = "0a1b2c3d-0000-4000-8000-000000000003";
const FILE_4: &str = "0a1b2c3d-0000-4000-8000-000000000004";
const FILE_5: &str = "0a1b2c3d-0000-4000-8000-000000000005";
const FILE_6: &str = "0a1b2c3d-0000-4000-8000-000000000006";

/// In-memory GDC answering `in` filters with a prefix match, like the
/// real service does for submitter ids.
struct MockGdc {
    cases: Vec<Value>,
    files: Vec<Value>,
    calls: Mutex<Vec<GdcQuery>>,
}

impl MockGdc {
    fn from_fixture() -> Self {
        let raw = fs::read_to_string("tests/fixtures/catalog.json").unwrap();
        let catalog: Value = serde_json::from_str(&raw).unwrap();
        Self {
            cases: catalog["cases"].as_array().unwrap().clone(),
            files: catalog["files"].as_array().unwrap().clone(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<GdcQuery> {
        self.calls.lock().unwrap().clone()
    }
}

impl GdcClient for MockGdc {
    fn query(&self, query: &GdcQuery) -> Result<Vec<Value>, IdMapError> {
        self.calls.lock().unwrap().push(query.clone());
        let Filter::In { field, value } = &query.filter;
        let pool = match query.entity {
            Entity::Cases => &self.cases,
            Entity::Files => &self.files,
        };
        let mut hits = Vec::new();
        for record in pool {
            let leaves = extract_leaves(record, field)?;
            if leaves
                .iter()
                .any(|leaf| value.iter().any(|wanted| leaf.starts_with(wanted.as_str())))
            {
                hits.push(record.clone());
            }
        }
        Ok(hits)
    }
}

struct FailingGdc;

impl GdcClient for FailingGdc {
    fn query(&self, _query: &GdcQuery) -> Result<Vec<Value>, IdMapError> {
        Err(IdMapError::RemoteStatus {
            status: 503,
            message: "maintenance".to_string(),
        })
    }
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn rows(relation: &tcga_idmap::IdRelation) -> Vec<(&str, &str)> {
    relation
        .iter()
        .map(|row| (row.source.as_str(), row.target.as_str()))
        .collect()
}

#[test]
fn case_ids_resolve_to_participant_barcodes() {
    let translator = Translator::new(MockGdc::from_fixture());
    let relation = translator
        .uuid_to_barcode(
            &ids(&[CASE_CK, CASE_A17N]),
            IdType::Case,
            Granularity::Participant,
            false,
        )
        .unwrap();

    assert_eq!(relation.columns(), ("case_id", "submitter_id"));
    assert_eq!(
        rows(&relation),
        vec![(CASE_CK, "TCGA-CK-4948"), (CASE_A17N, "TCGA-D1-A17N")]
    );

    let calls = translator.client().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].entity, Entity::Cases);
    assert!(calls[0].fields.contains(&"submitter_id".to_string()));
    assert!(!calls[0].legacy);
}

#[test]
fn case_ids_ignore_end_point() {
    let translator = Translator::new(MockGdc::from_fixture());
    let participant = translator
        .uuid_to_barcode(&ids(&[CASE_CK]), IdType::Case, Granularity::Participant, false)
        .unwrap();
    let plate = translator
        .uuid_to_barcode(&ids(&[CASE_CK]), IdType::Case, Granularity::Plate, false)
        .unwrap();

    assert_eq!(participant, plate);
    let calls = translator.client().calls();
    assert_eq!(calls[0], calls[1]);
}

#[test]
fn file_ids_fan_out_per_sample() {
    let translator = Translator::new(MockGdc::from_fixture());
    let relation = translator
        .uuid_to_barcode(&ids(&[FILE_1, FILE_2]), IdType::File, Granularity::Sample, true)
        .unwrap();

    assert_eq!(relation.columns(), ("file_id", "cases.samples.submitter_id"));
    assert_eq!(
        rows(&relation),
        vec![
            (FILE_1, "TCGA-CK-4948-01A"),
            (FILE_2, "TCGA-CK-4948-01A"),
            (FILE_2, "TCGA-CK-4948-10A"),
        ]
    );
    let calls = translator.client().calls();
    assert_eq!(calls[0].entity, Entity::Files);
    assert!(calls[0].legacy);
}

#[test]
fn file_with_several_cases_yields_each_participant() {
    let translator = Translator::new(MockGdc::from_fixture());
    let relation = translator
        .uuid_to_barcode(&ids(&[FILE_5]), IdType::File, Granularity::Participant, false)
        .unwrap();
    assert_eq!(
        rows(&relation),
        vec![(FILE_5, "TCGA-D1-A17N"), (FILE_5, "TCGA-D1-A17N1")]
    );
}

#[test]
fn row_count_matches_extracted_values() {
    let mock = MockGdc::from_fixture();
    let all = ids(&[FILE_1, FILE_2, FILE_3, FILE_4, FILE_5, FILE_6]);
    let path = "cases.samples.portions.analytes.aliquots.submitter_id";
    let expected = mock
        .files
        .iter()
        .map(|record| extract_leaves(record, path).unwrap().len())
        .sum::<usize>();

    let translator = Translator::new(mock);
    let relation = translator
        .uuid_to_barcode(&all, IdType::File, Granularity::Center, false)
        .unwrap();
    assert_eq!(relation.columns().1, path);
    assert_eq!(relation.len(), expected);
    assert_eq!(relation.len(), 5);
}

#[test]
fn no_extracted_values_is_an_empty_relation() {
    let translator = Translator::new(MockGdc::from_fixture());
    let relation = translator
        .uuid_to_barcode(&ids(&[FILE_6]), IdType::File, Granularity::Participant, false)
        .unwrap();
    assert!(relation.is_empty());
    assert_eq!(translator.client().calls().len(), 1);

    let unknown = translator
        .uuid_to_barcode(
            &ids(&["ffffffff-ffff-4fff-8fff-ffffffffffff"]),
            IdType::Case,
            Granularity::Participant,
            false,
        )
        .unwrap();
    assert!(unknown.is_empty());
}

#[test]
fn barcodes_keep_only_exact_matches() {
    let translator = Translator::new(MockGdc::from_fixture());
    let barcodes = ids(&["TCGA-CK-4948", "TCGA-D1-A17N"]);
    let relation = translator.barcode_to_uuid(&barcodes, false).unwrap();

    assert_eq!(relation.columns(), ("barcode", "file_id"));
    assert_eq!(
        relation.sources(),
        BTreeSet::from(["TCGA-CK-4948", "TCGA-D1-A17N"])
    );
    assert_eq!(
        rows(&relation),
        vec![
            ("TCGA-CK-4948", FILE_1),
            ("TCGA-CK-4948", FILE_2),
            ("TCGA-D1-A17N", FILE_3),
            ("TCGA-D1-A17N", FILE_5),
        ]
    );
    assert!(!relation.targets().contains(FILE_4));

    let calls = translator.client().calls();
    assert_eq!(
        calls[0].filter,
        Filter::In {
            field: "cases.submitter_id".to_string(),
            value: barcodes.clone(),
        }
    );
}

#[test]
fn sample_barcode_queries_sample_path() {
    let translator = Translator::new(MockGdc::from_fixture());
    let relation = translator
        .barcode_to_uuid(&ids(&["TCGA-CK-4948-10A"]), false)
        .unwrap();
    assert_eq!(rows(&relation), vec![("TCGA-CK-4948-10A", FILE_2)]);
}

#[test]
fn aliquot_barcode_queries_aliquot_path() {
    let translator = Translator::new(MockGdc::from_fixture());
    let relation = translator
        .barcode_to_uuid(&ids(&["TCGA-D1-A17N-01A-11D-A12X-09"]), false)
        .unwrap();
    assert_eq!(
        rows(&relation),
        vec![("TCGA-D1-A17N-01A-11D-A12X-09", FILE_3)]
    );
    let calls = translator.client().calls();
    let Filter::In { field, .. } = &calls[0].filter;
    assert_eq!(field, "cases.samples.portions.analytes.aliquots.submitter_id");
}

#[test]
fn analyte_barcode_queries_analyte_path() {
    let translator = Translator::new(MockGdc::from_fixture());
    let relation = translator
        .barcode_to_uuid(&ids(&["TCGA-CK-4948-01A-01R"]), false)
        .unwrap();
    assert_eq!(rows(&relation), vec![("TCGA-CK-4948-01A-01R", FILE_2)]);
}

#[test]
fn malformed_barcodes_fail_before_querying() {
    let translator = Translator::new(MockGdc::from_fixture());
    let err = translator
        .barcode_to_uuid(&ids(&["TCGA-CK-4948", "GTEX-1117F"]), false)
        .unwrap_err();
    assert_matches!(err, IdMapError::MalformedBarcode(bad) if bad == vec!["GTEX-1117F"]);
    assert!(translator.client().calls().is_empty());
}

#[test]
fn mixed_granularity_fails_before_querying() {
    let translator = Translator::new(MockGdc::from_fixture());
    let err = translator
        .barcode_to_uuid(&ids(&["TCGA-CK-4948", "TCGA-CK-4948-01A"]), false)
        .unwrap_err();
    assert_matches!(err, IdMapError::InconsistentBarcodeLength { .. });
    assert!(translator.client().calls().is_empty());
}

#[test]
fn empty_input_skips_the_remote() {
    let translator = Translator::new(MockGdc::from_fixture());
    let none: Vec<String> = Vec::new();

    let by_case = translator
        .uuid_to_barcode(&none, IdType::Case, Granularity::Participant, false)
        .unwrap();
    let by_file = translator
        .uuid_to_barcode(&none, IdType::File, Granularity::Sample, false)
        .unwrap();
    let by_barcode = translator.barcode_to_uuid(&none, false).unwrap();
    let by_case_files = translator.case_to_file_uuids(&none, false).unwrap();

    assert!(by_case.is_empty() && by_file.is_empty());
    assert!(by_barcode.is_empty() && by_case_files.is_empty());
    assert_eq!(by_file.columns(), ("file_id", "cases.samples.submitter_id"));
    assert!(translator.client().calls().is_empty());
}

#[test]
fn remote_errors_propagate_unchanged() {
    let translator = Translator::new(FailingGdc);
    let err = translator
        .uuid_to_barcode(&ids(&[CASE_CK]), IdType::Case, Granularity::Participant, false)
        .unwrap_err();
    assert_matches!(err, IdMapError::RemoteStatus { status: 503, ref message } if message == "maintenance");
    assert!(err.is_remote());

    let err = translator
        .barcode_to_uuid(&ids(&["TCGA-CK-4948"]), false)
        .unwrap_err();
    assert_matches!(err, IdMapError::RemoteStatus { status: 503, .. });
}

#[test]
fn participant_round_trip_recovers_the_input_files() {
    let translator = Translator::new(MockGdc::from_fixture());
    let files = ids(&[FILE_1, FILE_3]);
    let forward = translator
        .uuid_to_barcode(&files, IdType::File, Granularity::Participant, false)
        .unwrap();
    let barcodes = forward
        .targets()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let back = translator.barcode_to_uuid(&barcodes, false).unwrap();

    let recovered = back.targets();
    for file in &files {
        assert!(recovered.contains(file.as_str()), "{file} lost");
    }
    assert!(
        back.sources()
            .iter()
            .all(|barcode| barcodes.iter().any(|input| input.as_str() == *barcode))
    );
}

#[test]
fn case_ids_to_file_ids() {
    let translator = Translator::new(MockGdc::from_fixture());
    let relation = translator
        .case_to_file_uuids(&ids(&[CASE_A17N]), false)
        .unwrap();
    assert_eq!(relation.columns(), ("case_id", "file_id"));
    assert_eq!(
        rows(&relation),
        vec![(CASE_A17N, FILE_3), (CASE_A17N, FILE_5)]
    );
    let calls = translator.client().calls();
    let Filter::In { field, .. } = &calls[0].filter;
    assert_eq!(field, "cases.case_id");
}

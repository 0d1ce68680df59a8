use plate_match::data::{ApprovedRegistry, SkipReason};
use plate_match::error::{MatchError, RegistryError};
use plate_match::extraction_runners::{MockExtractor, PlateTextExtractor};
use plate_match::match_engine::MatchEngine;


use fixtures::{config_for, record, write_gray};

#[test]
fn missing_image_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_gray(dir.path(), "car1.jpg", 60);
    write_gray(dir.path(), "car2.jpg", 180);

    let records = vec![
        record("car1.jpg", 8, 0),
        record("car3.jpg", 8, 2),
        record("car2.jpg", 8, 5),
    ];
    let registry = ApprovedRegistry::from_plates(&["ABC123", "XYZ789"]).unwrap();
    let mock = MockExtractor::new().with_text(60, "ABC-123").with_text(180, "XYZ789");
    let engine = MatchEngine::new(&config_for(dir.path(), 2), mock);

    let report = engine.match_records(&records, &registry).unwrap();

    assert_eq!(report.matched, 2);
    assert_eq!(report.skipped.load_failure, 1);
    assert_eq!(report.skipped.total(), 1);
    let skipped = &report.diagnostics[0];
    assert_eq!((skipped.index, skipped.filename.as_str()), (1, "car3.jpg"));
    assert_eq!(skipped.reason, SkipReason::LoadFailure);
    // The missing file never reached the OCR engine.
    assert_eq!(engine.extractor().calls(), 2);
}

#[test]
fn corrupt_empty_and_escaping_files_are_load_failures() {
    let dir = tempfile::tempdir().unwrap();
    write_gray(dir.path(), "ok.jpg", 60);
    std::fs::write(dir.path().join("zero.jpg"), b"").unwrap();
    std::fs::write(dir.path().join("corrupt.jpg"), b"\xff\xd8\xff garbage").unwrap();

    let records = vec![
        record("zero.jpg", 9, 0),
        record("corrupt.jpg", 9, 1),
        record("../ok.jpg", 9, 2),
        record("ok.jpg", 9, 3),
    ];
    let registry = ApprovedRegistry::from_plates(&["ABC123"]).unwrap();
    let engine = MatchEngine::new(&config_for(dir.path(), 4), MockExtractor::new().with_text(60, "ABC123"));

    let report = engine.match_records(&records, &registry).unwrap();
    assert_eq!(report.skipped.load_failure, 3);
    assert_eq!(report.matches.len(), 1);
    let order: Vec<usize> = report.diagnostics.iter().map(|d| d.index).collect();
    assert_eq!(order, [0, 1, 2]);
}

#[test]
fn ocr_timeouts_and_errors_skip_single_records() {
    let dir = tempfile::tempdir().unwrap();
    write_gray(dir.path(), "slow.jpg", 30);
    write_gray(dir.path(), "bad.jpg", 100);
    write_gray(dir.path(), "fine.jpg", 200);

    let records = vec![record("slow.jpg", 7, 0), record("bad.jpg", 7, 1), record("fine.jpg", 7, 2)];
    let registry = ApprovedRegistry::from_plates(&["XYZ789"]).unwrap();
    let mock = MockExtractor::new()
        .with_timeout(30)
        .with_failure(100, "segfault in engine")
        .with_text(200, "xyz.789");
    let engine = MatchEngine::new(&config_for(dir.path(), 2), mock);

    let report = engine.match_records(&records, &registry).unwrap();
    assert_eq!(report.skipped.extraction_failure, 2);
    assert_eq!(report.matches.len(), 1);
    assert!(report.diagnostics[1].message.contains("segfault"));
}

#[test]
fn unreachable_engine_aborts_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let mut records = Vec::new();
    for i in 0..20 {
        let name = format!("car{i}.jpg");
        write_gray(dir.path(), &name, 50);
        records.push(record(&name, 6, i));
    }
    let registry = ApprovedRegistry::from_plates(&["ABC123"]).unwrap();
    let engine = MatchEngine::new(&config_for(dir.path(), 2), MockExtractor::unavailable());

    let err = engine.match_records(&records, &registry).unwrap_err();
    assert!(matches!(err, MatchError::EngineUnavailable(_)));
    // Workers stop issuing OCR calls once the engine is known to be gone.
    assert!(engine.extractor().calls() < records.len());
}

#[test]
fn unreachable_engine_fails_init() {
    let dir = tempfile::tempdir().unwrap();
    assert!(MockExtractor::unavailable().probe().is_err());
    assert!(plate_match::init_engine(&config_for(dir.path(), 1), MockExtractor::unavailable()).is_err());
}

#[test]
fn empty_registry_insert_is_rejected() {
    let mut registry = ApprovedRegistry::from_plates(&["ABC123", "XYZ789", "LMN456"]).unwrap();
    assert_eq!(
        registry.insert(""),
        Err(RegistryError::InvalidIdentifier(String::new()))
    );
    assert_eq!(registry.len(), 3);
}

use valframe_sdk::ErrorKind;
use valframe_testing::{route_leg_processor, TestWorkspace, ROUTE_LEG_HEADER};

const ROWS: [&str; 4] = [
    "ABL,CGO,2024-03-01 08:00:00,10",
    "CGO,CCI,not-a-date,20",
    "CCI,CCI,2024-03-03 08:00:00,30",
    "CLV,CMB,2024-03-04 08:00:00,40",
];

/// A file blocked by format errors can have its clean rows re-run through the
/// business rules.
///
/// **Test flow:**
/// 1. Process a file with one format error and one latent business error
/// 2. Reprocess ignoring format errors
/// 3. Check the business error file and the error-omitted output
#[test]
fn test_reprocess_ignoring_format_runs_business_rules() {
    let workspace = TestWorkspace::new();
    let processor = route_leg_processor();

    // 1. First pass stops at the format stage
    let path = workspace.write_rows("legs.csv", ROUTE_LEG_HEADER, &ROWS);
    let first = processor.process_file(&path).unwrap();
    assert_eq!(first.error_kind, ErrorKind::Format);
    assert!(first.reprocessable);
    assert!(!workspace.exists("legsBusiness_Error.csv"));

    // 2. Reprocess
    let summary = processor.reprocess_ignore_format(&path).unwrap();
    println!("reprocessed: {summary:?}");

    // 3. Results
    assert_eq!(summary.file_name, "legs_Output.csv");
    assert_eq!(summary.error_kind, ErrorKind::BusinessValidation);
    assert_eq!(summary.valid_row_count, 2);
    assert_eq!(summary.error_row_count, 1);
    assert_eq!(
        workspace.lines("legsBusiness_Error.csv")[1],
        "CCI,CCI,2024-03-03 08:00:00,30,Origin and Destination cannot be same;"
    );
    assert_eq!(
        workspace.lines("legs_ErrorOmittedOutput.csv"),
        vec![
            ROUTE_LEG_HEADER,
            "ABL,CGO,2024-03-01 08:00:00,10",
            "CLV,CMB,2024-03-04 08:00:00,40",
        ]
    );
}

/// With no business violations, reprocessing ignoring format writes nothing.
#[test]
fn test_reprocess_ignoring_format_without_findings() {
    let workspace = TestWorkspace::new();
    let processor = route_leg_processor();
    let path = workspace.write_rows(
        "legs.csv",
        ROUTE_LEG_HEADER,
        &["ABL,CGO,2024-03-01,10", "CGO,CCI,bad,20"],
    );
    processor.process_file(&path).unwrap();

    let summary = processor.reprocess_ignore_format(&path).unwrap();
    assert_eq!(summary.error_kind, ErrorKind::NoError);
    assert_eq!(summary.valid_row_count, 1);
    assert!(!workspace.exists("legsBusiness_Error.csv"));
    assert!(!workspace.exists("legs_ErrorOmittedOutput.csv"));
}

/// Ignoring business errors accepts the sanitized rows as they are.
#[test]
fn test_reprocess_ignoring_business_copies_output() {
    let workspace = TestWorkspace::new();
    let processor = route_leg_processor();
    let path = workspace.write_rows(
        "legs.csv",
        ROUTE_LEG_HEADER,
        &[
            "ABL,CGO,2024-03-01 08:00:00,10",
            "CCI,CCI,2024-03-03 08:00:00,30",
        ],
    );
    let first = processor.process_file(&path).unwrap();
    assert_eq!(first.error_kind, ErrorKind::BusinessValidation);

    let summary = processor.reprocess_ignore_business(&path).unwrap();
    assert_eq!(summary.error_kind, ErrorKind::NoError);
    assert_eq!(summary.valid_row_count, 1);
    assert_eq!(
        workspace.read("legs_ErrorOmittedOutput.csv"),
        workspace.read("legs_Output.csv")
    );
}

/// Reprocessing a file that never produced `_Output.csv` is an I/O failure.
#[test]
fn test_reprocess_requires_sanitized_output() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_rows("legs.csv", ROUTE_LEG_HEADER, &["ABL,ABL,2024-03-01,10"]);
    route_leg_processor().process_file(&path).unwrap();
    assert!(!workspace.exists("legs_Output.csv"));

    assert!(route_leg_processor().reprocess_ignore_business(&path).is_err());
    assert!(route_leg_processor().reprocess_ignore_format(&path).is_err());
}

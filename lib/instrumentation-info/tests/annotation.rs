use std::sync::Arc;

use instrumentation_config::ConfigurationLoader;
use instrumentation_info::{
    entry::{LogEntry, Severity},
    library_version, set_instrumentation_status, set_skip_instrumentation_check, InstrumentationAnnotator,
    InstrumentationConfiguration, InstrumentationRecord, InstrumentationStatus, DEFAULT_LIBRARY_VERSION,
    DIAGNOSTIC_INFO_KEY, INSTRUMENTATION_SOURCE_KEY, LIBRARY_NAME_PREFIX, MAX_INSTRUMENTATION_COUNT,
};
use serde_json::{json, Value};

fn entry_with_source(source: Value) -> LogEntry {
    LogEntry::new(Severity::Debug).with_payload(json!({
        DIAGNOSTIC_INFO_KEY: { INSTRUMENTATION_SOURCE_KEY: source },
    }))
}

fn names(entry: &LogEntry) -> Vec<String> {
    entry
        .instrumentation_source()
        .expect("entry should carry an instrumentation source")
        .records()
        .iter()
        .map(|record| record.name().to_string())
        .collect()
}

#[test]
fn wire_constants() {
    assert_eq!(LIBRARY_NAME_PREFIX, "nodejs");
    assert_eq!(DEFAULT_LIBRARY_VERSION, "unknown");
    assert_eq!(DIAGNOSTIC_INFO_KEY, "logging.googleapis.com/diagnostic");
    assert_eq!(INSTRUMENTATION_SOURCE_KEY, "instrumentation_source");
    assert_eq!(MAX_INSTRUMENTATION_COUNT, 3);
}

#[test]
fn end_to_end_scenarios() {
    let annotator = InstrumentationAnnotator::new(Arc::new(InstrumentationStatus::new()));

    // No payload at all.
    let mut entry = LogEntry::new(Severity::Debug);
    assert!(annotator.annotate(&mut entry));
    let source = entry.instrumentation_source().unwrap();
    assert_eq!(
        source.records(),
        &[InstrumentationRecord::new(LIBRARY_NAME_PREFIX, library_version())]
    );

    // A caller record comes first, the self record last.
    let mut entry = entry_with_source(json!([{ "name": "nodejs-test", "version": "1.0.0" }]));
    assert!(annotator.annotate(&mut entry));
    assert_eq!(names(&entry), vec!["nodejs-test", LIBRARY_NAME_PREFIX]);
    assert_eq!(entry.instrumentation_source().unwrap().records()[0].version(), "1.0.0");

    // Already registered.
    let mut entry = entry_with_source(json!([{ "name": LIBRARY_NAME_PREFIX, "version": "9.9.9" }]));
    assert!(annotator.annotate(&mut entry));
    assert_eq!(names(&entry), vec![LIBRARY_NAME_PREFIX]);

    // Over capacity.
    let mut entry = entry_with_source(json!([
        { "name": "nodejs-one", "version": "v1" },
        { "name": "nodejs-two", "version": "v2" },
        { "name": "nodejs-test", "version": "1.0.0" },
        { "name": "nodejs-test-ooooooooooooooo", "version": "1.0.0.0.0.0.0.0.0.11.1.1-ALPHA" },
    ]));
    assert!(annotator.annotate(&mut entry));
    assert_eq!(names(&entry), vec!["nodejs-one", "nodejs-two", LIBRARY_NAME_PREFIX]);

    // Second pass changes nothing.
    let before = entry.clone();
    assert!(annotator.annotate(&mut entry));
    assert_eq!(entry, before);
}

#[test]
fn configured_status() {
    let config = ConfigurationLoader::default()
        .add_values(json!({ "skip_instrumentation_check": "true" }))
        .into_generic();
    let config = InstrumentationConfiguration::from_configuration(&config).unwrap();
    let annotator = InstrumentationAnnotator::new(Arc::new(InstrumentationStatus::from_configuration(&config)));

    let mut entry = LogEntry::new(Severity::Info).with_payload(json!({ "message": "hello" }));
    assert!(!annotator.annotate(&mut entry));
    assert_eq!(entry.payload(), Some(&json!({ "message": "hello" })));
}

// The only test in this binary that touches the process environment.
#[test]
fn configuration_from_environment() {
    std::env::set_var("ANNOTATION_TEST_INSTRUMENTATION_ENABLED", "0");

    let config = InstrumentationConfiguration::from_environment("annotation_test").unwrap();
    assert!(!config.instrumentation_enabled);
    assert!(!config.skip_instrumentation_check);

    std::env::remove_var("ANNOTATION_TEST_INSTRUMENTATION_ENABLED");
}

// Everything touching the process-wide status lives in this one test, so that parallel tests can't observe it
// half-way through.
#[test]
fn global_status() {
    let global = InstrumentationStatus::global();
    let annotator = InstrumentationAnnotator::from_global_status();
    assert!(Arc::ptr_eq(annotator.status(), &global));

    set_instrumentation_status(false);
    let mut entry = LogEntry::new(Severity::Debug);
    assert!(!annotator.annotate(&mut entry));
    assert_eq!(entry.payload(), None);

    set_instrumentation_status(true);
    set_skip_instrumentation_check(true);
    let mut entries = vec![LogEntry::new(Severity::Debug)];
    assert!(!annotator.populate(&mut entries));
    assert_eq!(entries.len(), 1);

    global.reset();
    assert!(annotator.annotate(&mut entry));
    assert!(entry.has_instrumentation_source());
    assert!(annotator.populate(&mut entries));
    assert_eq!(entries.len(), 2);

    // Only the first batch gets instrumentation info, until the next reset.
    let mut later = vec![LogEntry::new(Severity::Debug)];
    assert!(!annotator.populate(&mut later));
    assert_eq!(later.len(), 1);
    assert!(global.is_written());

    global.reset();
    assert!(annotator.populate(&mut later));
    assert_eq!(later.len(), 2);
    global.reset();
}

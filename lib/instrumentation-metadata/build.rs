// Must match `DEFAULT_LIBRARY_VERSION` in `src/lib.rs`. The build script can't depend on its own crate, so the value is
// repeated here and written out as `FALLBACK_LIBRARY_VERSION`, which a unit test compares against the constant.
const FALLBACK_LIBRARY_VERSION: &str = "unknown";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=INSTRUMENTATION_LIBRARY_VERSION");

    // The version reported in instrumentation records is whatever the build tooling hands us. When nothing is handed
    // to us, we emit the sentinel so that downstream consumers can still tell the record apart from a real version.
    let detected_version = std::env::var("INSTRUMENTATION_LIBRARY_VERSION")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let version_detected = detected_version.is_some();
    let version = detected_version.unwrap_or_else(|| FALLBACK_LIBRARY_VERSION.to_string());

    let details_file = std::env::var("OUT_DIR").unwrap() + "/details.rs";
    std::fs::write(
        details_file,
        format!(
            r#"
    pub const DETECTED_LIBRARY_VERSION: &str = {:?};
    pub const DETECTED_LIBRARY_VERSION_PRESENT: bool = {};
    pub const FALLBACK_LIBRARY_VERSION: &str = {:?};
            "#,
            version, version_detected, FALLBACK_LIBRARY_VERSION,
        ),
    )
    .expect("failed to write details file");
}

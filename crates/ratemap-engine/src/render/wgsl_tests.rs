use super::passes::{estimate_source, ESTIMATE_WGSL, FEATURES_WGSL, SMOOTH_WGSL, VISUALIZE_WGSL};

#[test]
fn controller_wgsl_sources_parse_and_validate() {
    check_wgsl("features.wgsl", FEATURES_WGSL);
    check_wgsl("estimate.wgsl", ESTIMATE_WGSL);
    check_wgsl("estimate.wgsl (multisampled)", &estimate_source(true));
    check_wgsl("smooth.wgsl", SMOOTH_WGSL);
    check_wgsl("visualize.wgsl", VISUALIZE_WGSL);
}

fn check_wgsl(label: &str, source: &str) {
    let module = naga::front::wgsl::parse_str(source).unwrap_or_else(|error| {
        panic!("WGSL parse failed for {label}: {}", error.emit_to_string(source))
    });

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .unwrap_or_else(|error| {
        panic!("WGSL validation failed for {label}: {}", error.emit_to_string(source))
    });
}

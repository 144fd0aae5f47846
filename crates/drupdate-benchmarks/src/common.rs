//! Common utilities for benchmarks

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// Version strings in the shapes both catalogs report
pub fn version_corpus(count: usize) -> Vec<String> {
    let shapes = [
        "{}.{}.{}",
        "8.x-{}.{}",
        "{}.{}.{}-rc1",
        "v{}.{}.{}",
        "{}.{}.0-beta{}",
        "{}.x-dev",
    ];
    (0..count)
        .map(|i| {
            let shape = shapes[i % shapes.len()];
            let mut parts = [i % 12, i % 7, i % 30].into_iter();
            let mut out = String::new();
            let mut rest = shape;
            while let Some(pos) = rest.find("{}") {
                out.push_str(&rest[..pos]);
                out.push_str(&parts.next().unwrap_or(0).to_string());
                rest = &rest[pos + 2..];
            }
            out.push_str(rest);
            out
        })
        .collect()
}

/// A composer.json with `count` module requirements and a few extra fields
pub fn composer_document(count: usize) -> String {
    let require: serde_json::Map<String, serde_json::Value> = (0..count)
        .map(|i| (format!("drupal/module_{:04}", i), format!("^{}.{}", i % 5 + 1, i % 10).into()))
        .chain([
            ("drupal/core-recommended".to_string(), "^11.1".into()),
            ("drush/drush".to_string(), "^13".into()),
            ("php".to_string(), ">=8.3".into()),
        ])
        .collect();

    let document = serde_json::json!({
        "name": "drupal/recommended-project",
        "type": "project",
        "repositories": [{"type": "composer", "url": "https://packages.drupal.org/8"}],
        "require": require,
        "minimum-stability": "stable",
        "extra": {"installer-paths": {"web/core": ["type:drupal-core"]}}
    });
    serde_json::to_string_pretty(&document).unwrap_or_default()
}

/// Release-history XML with `branches` supported branches and ten releases
/// per branch
pub fn release_history(branches: usize) -> String {
    let supported: Vec<String> = (1..=branches).map(|b| format!("{}.0.", b)).collect();
    let mut releases = String::new();
    for b in (1..=branches).rev() {
        for patch in (0..10).rev() {
            releases.push_str(&format!(
                "<release><name>bench {b}.0.{patch}</name><version>{b}.0.{patch}</version>\
                 <status>published</status><core_compatibility>^10 || ^11</core_compatibility></release>"
            ));
        }
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?><project><title>Bench</title>\
         <supported_branches>{}</supported_branches><releases>{}</releases></project>",
        supported.join(","),
        releases
    )
}

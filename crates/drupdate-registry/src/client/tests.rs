//! Unit tests for the catalog client

use super::*;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADMIN_TOOLBAR_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<project xmlns:dc="http://purl.org/dc/elements/1.1/">
  <title>Admin Toolbar</title>
  <short_name>admin_toolbar</short_name>
  <supported_branches>3.0.,4.0.</supported_branches>
  <releases>
    <release>
      <name>admin_toolbar 4.0.2</name>
      <version>4.0.2</version>
      <status>published</status>
      <core_compatibility>^10.3 || ^11</core_compatibility>
    </release>
    <release>
      <name>admin_toolbar 4.0.1</name>
      <version>4.0.1</version>
      <status>published</status>
      <core_compatibility>^10.3 || ^11</core_compatibility>
    </release>
    <release>
      <name>admin_toolbar 3.0.5</name>
      <version>3.0.5</version>
      <status>published</status>
      <core_compatibility>^9 || ^10</core_compatibility>
    </release>
    <release>
      <name>admin_toolbar 3.0.4</name>
      <version>3.0.4</version>
      <status>published</status>
      <core_compatibility>^9 || ^10</core_compatibility>
    </release>
  </releases>
</project>"#;

const CORE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<project>
  <title>Drupal core</title>
  <supported_branches>10.4.,11.0.,11.1.</supported_branches>
  <releases>
    <release><name>drupal 11.1.0</name><version>11.1.0</version><status>published</status></release>
    <release><name>drupal 11.0.8</name><version>11.0.8</version><status>published</status></release>
    <release><name>drupal 10.4.3</name><version>10.4.3</version><status>published</status></release>
  </releases>
</project>"#;

const DRUSH_JSON: &str = r#"{
    "packages": {
        "drush/drush": [
            {"version": "13.0.1", "version_normalized": "13.0.1.0"},
            {"version": "13.0.0", "version_normalized": "13.0.0.0"},
            {"version": "13.0.0-rc1", "version_normalized": "13.0.0.0-RC1"},
            {"version": "12.5.6", "version_normalized": "12.5.6.0"},
            {"version": "12.4.0", "version_normalized": "12.4.0.0"},
            {"version": "dev-main", "version_normalized": "9999999-dev"},
            {"version": "11.0.0", "version_normalized": "11.0.0.0"}
        ]
    }
}"#;

fn client_for(server: &MockServer) -> RegistryClient {
    RegistryClient::with_config(ClientConfig {
        module_base_url: server.uri(),
        registry_base_url: server.uri(),
        ..ClientConfig::default()
    })
    .unwrap()
}

async fn mount(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[test]
fn test_client_config_default() {
    let config = ClientConfig::default();
    assert_eq!(config.module_base_url, "https://updates.drupal.org/release-history");
    assert_eq!(config.registry_base_url, "https://repo.packagist.org");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.user_agent.starts_with("drupdate/"));
    assert_eq!(config.fallback_limit, None);
    assert!(config.validate().is_ok());
}

#[test]
fn test_client_config_validation() {
    let config = ClientConfig {
        module_base_url: "not a url".to_string(),
        ..ClientConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(DrupdateError::Config { ref field, .. }) if field == "module_base_url"
    ));

    let config = ClientConfig {
        registry_base_url: "ftp://repo.packagist.org".to_string(),
        ..ClientConfig::default()
    };
    assert!(RegistryClient::with_config(config).is_err());

    let config = ClientConfig {
        timeout: Duration::ZERO,
        ..ClientConfig::default()
    };
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn test_fetch_module_releases() {
    let server = MockServer::start().await;
    mount(&server, "/admin_toolbar/current", 200, ADMIN_TOOLBAR_XML).await;

    let releases = client_for(&server)
        .fetch_module_releases("admin_toolbar")
        .await
        .unwrap();

    assert_eq!(releases.len(), 2);
    assert_eq!(releases[0].version, "4.0.2");
    assert_eq!(releases[0].pin, "^4.0");
    assert_eq!(releases[0].core_compatibility.as_deref(), Some("^10.3 || ^11"));
    assert_eq!(releases[1].version, "3.0.5");
    assert_eq!(releases[1].pin, "^3.0");
    assert_eq!(releases[1].core_compatibility.as_deref(), Some("^9 || ^10"));
}

#[tokio::test]
async fn test_fetch_module_releases_fallback_limit() {
    let server = MockServer::start().await;
    let releases: String = (0..15)
        .map(|i| {
            format!(
                "<release><name>old 1.{i}.0</name><version>1.{i}.0</version><status>published</status></release>"
            )
        })
        .collect();
    let xml = format!("<project><title>Old</title><releases>{}</releases></project>", releases);
    mount(&server, "/old/current", 200, &xml).await;

    let uncapped = client_for(&server).fetch_module_releases("old").await.unwrap();
    assert_eq!(uncapped.len(), 15);
    assert_eq!(uncapped[0].version, "1.14.0");

    let capped = RegistryClient::with_config(ClientConfig {
        module_base_url: server.uri(),
        fallback_limit: Some(10),
        ..ClientConfig::default()
    })
    .unwrap()
    .fetch_module_releases("old")
    .await
    .unwrap();
    assert_eq!(capped.len(), 10);
    assert_eq!(capped[0].version, "1.9.0");
}

#[tokio::test]
async fn test_fetch_module_releases_http_error() {
    let server = MockServer::start().await;
    mount(&server, "/nonexistent_module/current", 404, "").await;

    let err = client_for(&server)
        .fetch_module_releases("nonexistent_module")
        .await
        .unwrap_err();
    assert!(matches!(err, DrupdateError::HttpStatus { status: 404, .. }));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_fetch_module_releases_invalid_xml() {
    let server = MockServer::start().await;
    mount(&server, "/broken/current", 200, "this is not xml").await;

    let err = client_for(&server)
        .fetch_module_releases("broken")
        .await
        .unwrap_err();
    assert!(matches!(err, DrupdateError::Decode { .. }));
}

#[tokio::test]
async fn test_fetch_module_releases_unknown_project() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/nope/current",
        200,
        "<error>No release history was found for the requested project (nope).</error>",
    )
    .await;

    let err = client_for(&server)
        .fetch_module_releases("nope")
        .await
        .unwrap_err();
    assert!(matches!(err, DrupdateError::PackageNotFound { .. }));
}

#[tokio::test]
async fn test_fetch_registry_releases() {
    let server = MockServer::start().await;
    mount(&server, "/p2/drush/drush.json", 200, DRUSH_JSON).await;

    let releases = client_for(&server)
        .fetch_registry_releases("drush/drush")
        .await
        .unwrap();

    let versions: Vec<_> = releases.iter().map(|r| r.version.as_str()).collect();
    assert_eq!(versions, ["13.0.1", "12.5.6", "11.0.0"]);
    let pins: Vec<_> = releases.iter().map(|r| r.pin.as_str()).collect();
    assert_eq!(pins, ["^13.0", "^12.5", "^11.0"]);
    assert!(releases.iter().all(|r| r.core_compatibility.is_none()));
}

#[tokio::test]
async fn test_fetch_registry_releases_errors() {
    let server = MockServer::start().await;
    mount(&server, "/p2/broken/pkg.json", 200, "{not json").await;
    mount(&server, "/p2/gone/pkg.json", 404, "").await;
    mount(&server, "/p2/other/pkg.json", 200, r#"{"packages": {}}"#).await;

    let client = client_for(&server);
    assert!(matches!(
        client.fetch_registry_releases("broken/pkg").await,
        Err(DrupdateError::Decode { .. })
    ));
    assert!(matches!(
        client.fetch_registry_releases("gone/pkg").await,
        Err(DrupdateError::HttpStatus { status: 404, .. })
    ));
    assert!(client.fetch_registry_releases("other/pkg").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_releases_routing() {
    let server = MockServer::start().await;
    mount(&server, "/drupal/current", 200, CORE_XML).await;
    mount(&server, "/admin_toolbar/current", 200, ADMIN_TOOLBAR_XML).await;
    mount(&server, "/p2/drush/drush.json", 200, DRUSH_JSON).await;

    let client = client_for(&server);

    for core in ["drupal/core", "drupal/core-recommended", "drupal/core-composer-scaffold"] {
        let releases = client.fetch_releases(core).await.unwrap();
        let versions: Vec<_> = releases.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, ["11.1.0", "11.0.8", "10.4.3"], "{}", core);
    }

    let module = client.fetch_releases("drupal/admin_toolbar").await.unwrap();
    assert_eq!(module[0].version, "4.0.2");

    let other = client.fetch_releases("drush/drush").await.unwrap();
    assert_eq!(other[0].version, "13.0.1");
}

#[tokio::test]
async fn test_fetch_releases_rejects_invalid_names() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    for name in ["", "php", "Drupal/Gin", "drupal/../etc", "vendor/pkg?x=1", "a/b/c"] {
        let err = client.fetch_releases(name).await.unwrap_err();
        assert!(
            err.to_string().starts_with("invalid package name"),
            "{:?}: {}",
            name,
            err
        );
    }

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_release_source_trait_object() {
    let server = MockServer::start().await;
    mount(&server, "/p2/drush/drush.json", 200, DRUSH_JSON).await;

    let source: std::sync::Arc<dyn ReleaseSource> = std::sync::Arc::new(client_for(&server));
    let releases = source.fetch_releases("drush/drush").await.unwrap();
    assert_eq!(releases.len(), 3);
}

#[tokio::test]
async fn test_network_failure() {
    let client = RegistryClient::with_config(ClientConfig {
        registry_base_url: "http://127.0.0.1:1".to_string(),
        timeout: Duration::from_secs(2),
        ..ClientConfig::default()
    })
    .unwrap();

    let err = client.fetch_registry_releases("drush/drush").await.unwrap_err();
    assert!(matches!(err, DrupdateError::Network { .. }));
}

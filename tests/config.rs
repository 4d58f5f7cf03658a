use std::fs;
use std::time::Duration;

use assert_matches::assert_matches;

use kira_onto_resolver::config::{
    ClientConfig, ConfigLoader, DEFAULT_BASE_URL, MAX_CACHE_TTL_MINS, ResolvedConfig,
};
use kira_onto_resolver::error::OntoError;

#[test]
fn config_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("onto-resolve.json");
    fs::write(
        &path,
        r#"{
            "cache_max_size": 500,
            "rate_limit": 5.0,
            "stats_interval_ms": 60000,
            "request_timeout_secs": 10
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.cache_max_size, 500);
    assert_eq!(resolved.rate_limit, 5.0);
    assert_eq!(resolved.stats_interval, Duration::from_secs(60));
    assert_eq!(resolved.request_timeout, Duration::from_secs(10));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(OntoError::ConfigRead(_))
    );
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("onto-resolve.json");
    fs::write(&path, "{ not json").unwrap();
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(OntoError::ConfigParse(_))
    );
}

#[test]
fn base_url_is_normalised_and_checked() {
    let resolved = ConfigLoader::resolve_config(ClientConfig {
        base_url: Some(" https://bioportal.example.org/ ".to_string()),
        ..ClientConfig::default()
    })
    .unwrap();
    assert_eq!(resolved.base_url, "https://bioportal.example.org");

    assert_matches!(
        ConfigLoader::resolve_config(ClientConfig {
            base_url: Some("data.bioontology.org".to_string()),
            ..ClientConfig::default()
        }),
        Err(OntoError::InvalidConfig(_))
    );
}

#[test]
fn invalid_limits_are_rejected() {
    assert_matches!(
        ConfigLoader::resolve_config(ClientConfig {
            rate_limit: Some(0.0),
            ..ClientConfig::default()
        }),
        Err(OntoError::InvalidConfig(_))
    );
    assert_matches!(
        ConfigLoader::resolve_config(ClientConfig {
            cache_max_size: Some(0),
            ..ClientConfig::default()
        }),
        Err(OntoError::InvalidConfig(_))
    );
}

#[test]
fn out_of_range_values_are_rejected_not_overflowed() {
    assert_matches!(
        ConfigLoader::resolve_config(ClientConfig {
            cache_ttl_mins: Some(u64::MAX),
            ..ClientConfig::default()
        }),
        Err(OntoError::InvalidConfig(_))
    );
    assert_matches!(
        ConfigLoader::resolve_config(ClientConfig {
            rate_limit: Some(1e-300),
            ..ClientConfig::default()
        }),
        Err(OntoError::InvalidConfig(_))
    );

    let longest = ConfigLoader::resolve_config(ClientConfig {
        cache_ttl_mins: Some(MAX_CACHE_TTL_MINS),
        ..ClientConfig::default()
    })
    .unwrap();
    assert_eq!(longest.cache_ttl, Duration::from_secs(365 * 24 * 60 * 60));
}

#[test]
fn bad_ttl_in_environment_is_rejected() {
    let mut config = ClientConfig::default();
    let result = ConfigLoader::apply_env(&mut config, |name| {
        (name == "ONTO_CACHE_TTL_MINS").then(|| "four hours".to_string())
    });
    assert_matches!(result, Err(OntoError::InvalidConfig(_)));
}

#[test]
fn defaults_match_the_public_service() {
    let defaults = ResolvedConfig::default();
    assert_eq!(defaults.base_url, DEFAULT_BASE_URL);
    assert_eq!(defaults.cache_ttl, Duration::from_secs(240 * 60));
    assert_eq!(defaults.cache_max_size, 300_000);
    assert_eq!(defaults.rate_limit, 15.0);
    assert!(defaults.api_key.is_empty());
}

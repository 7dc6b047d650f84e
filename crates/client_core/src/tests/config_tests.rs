use super::{load_settings_from, parse_api_url, ClientSettings, DEFAULT_API_URL};

use std::{
    collections::HashMap,
    env, fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn falls_back_to_defaults_without_file_or_env() {
    let settings = load_settings_from(Path::new("definitely-missing-cinema.toml"), no_env);
    assert_eq!(settings, ClientSettings::default());
    assert_eq!(settings.api_url, DEFAULT_API_URL);
}

#[test]
fn file_values_are_overridden_by_environment() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("cinema_client_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let file = temp_root.join("cinema.toml");
    fs::write(
        &file,
        "api_url = \"http://file.local/api/cinema\"\nrequest_timeout_secs = 3\n",
    )
    .expect("write settings");

    let from_file = load_settings_from(&file, no_env);
    assert_eq!(from_file.api_url, "http://file.local/api/cinema");
    assert_eq!(from_file.request_timeout_secs, 3);

    let vars: HashMap<&str, &str> = HashMap::from([
        ("CINEMA_API_URL", "http://env.local/api/cinema"),
        ("APP__API_URL", "http://app.local/api/cinema"),
        ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
    ]);
    let overridden = load_settings_from(&file, |key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(overridden.api_url, "http://app.local/api/cinema");
    assert_eq!(overridden.request_timeout_secs, 3);

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn strips_trailing_slashes_from_api_url() {
    let url = parse_api_url("  http://localhost:3000/api/cinema/  ").expect("parse");
    assert_eq!(url.as_str(), "http://localhost:3000/api/cinema");
}

#[test]
fn rejects_non_http_api_url() {
    let err = parse_api_url("ftp://example.com/cinema").expect_err("must fail");
    assert!(err.to_string().contains("http or https"));
}

#[test]
fn rejects_empty_api_url() {
    assert!(parse_api_url("   ").is_err());
}

#[test]
fn timeout_never_drops_to_zero() {
    let settings = ClientSettings {
        request_timeout_secs: 0,
        ..ClientSettings::default()
    };
    assert_eq!(settings.request_timeout().as_secs(), 1);
}

use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_apply_with_only_database_url() {
    let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/dent")])).unwrap();
    assert_eq!(config.database_url, "postgres://localhost/dent");
    assert_eq!(config.port, 8000);
    assert_eq!(config.storage_dir, PathBuf::from("storage"));
    assert_eq!(config.public_base_url, "http://localhost:8000");
    assert_eq!(config.db_max_connections, 5);
}

#[test]
fn missing_database_url_is_error() {
    assert_eq!(Config::from_lookup(lookup_from(&[])), Err(ConfigError::Missing("DATABASE_URL")));
    assert_eq!(Config::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])), Err(ConfigError::Missing("DATABASE_URL")));
}

#[test]
fn invalid_port_is_error() {
    let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "x"), ("PORT", "eighty")])).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "eighty".into() });
}

#[test]
fn overrides_are_read() {
    let config = Config::from_lookup(lookup_from(&[
        ("DATABASE_URL", "x"),
        ("PORT", "9100"),
        ("STORAGE_DIR", "/srv/dent/files"),
        ("PUBLIC_BASE_URL", "https://cdn.example.com/"),
        ("DB_MAX_CONNECTIONS", "12"),
    ]))
    .unwrap();
    assert_eq!(config.port, 9100);
    assert_eq!(config.storage_dir, PathBuf::from("/srv/dent/files"));
    assert_eq!(config.public_base_url, "https://cdn.example.com");
    assert_eq!(config.db_max_connections, 12);
}

#[test]
fn bad_max_connections_is_rejected() {
    for raw in ["zero", "0", "-3", ""] {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "x"), ("DB_MAX_CONNECTIONS", raw)])).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", value: raw.to_string() }, "{raw}");
    }
}

#[test]
fn storage_mount_is_last_path_component() {
    let mut config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "x"), ("STORAGE_DIR", "/srv/dent/files")])).unwrap();
    assert_eq!(config.storage_mount(), "files");
    config.storage_dir = PathBuf::from("/");
    assert_eq!(config.storage_mount(), "storage");
}

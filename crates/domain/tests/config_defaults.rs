use hm_domain::config::Config;

#[test]
fn default_backend_is_localhost() {
    let config = Config::default();
    assert_eq!(config.backend.base_url, "http://127.0.0.1:8765");
    assert_eq!(config.backend.health_path, "/healthz");
}

#[test]
fn default_round_bound_is_ten() {
    let config = Config::default();
    assert_eq!(config.backend.max_rounds, 10);
}

#[test]
fn partial_backend_section_keeps_other_defaults() {
    let toml_str = r#"
[backend]
base_url = "http://10.0.0.4:9000"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.backend.base_url, "http://10.0.0.4:9000");
    assert_eq!(config.backend.probe_timeout_ms, 1000);
    assert_eq!(config.backend.provider, "auto");
}

#[test]
fn load_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.toml");
    let (config, _) = Config::load(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(config.backend.max_rounds, 10);
}

#[test]
fn load_reads_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("helmsman.toml");
    std::fs::write(&path, "[backend]\nmax_rounds = 4\nprovider = \"openai\"\n").unwrap();
    let (config, used) = Config::load(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(config.backend.max_rounds, 4);
    assert_eq!(config.backend.provider, "openai");
    assert_eq!(used, path.to_str().unwrap());
}

#[test]
fn load_rejects_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("helmsman.toml");
    std::fs::write(&path, "[backend\nbase_url = ").unwrap();
    let err = Config::load(Some(path.to_str().unwrap())).unwrap_err();
    assert!(err.to_string().contains("parsing"));
}

use engagement_sim::config::EngineConfig;
use engagement_sim::simulation::LargeRateMethod;

#[test]
fn partial_toml_keeps_defaults() {
    let raw = r#"
        [window]
        default_hours = 4.0

        [sampler]
        large_rate = "normal"
        seed = 7

        [rules]
        base = 40.0
    "#;
    let config: EngineConfig = toml::from_str(raw).unwrap();

    assert!((config.window.default_hours - 4.0).abs() < 1e-9);
    assert!((config.window.max_hours - 24.0).abs() < 1e-9);
    assert_eq!(config.sampler.large_rate, LargeRateMethod::Normal);
    assert_eq!(config.sampler.seed, Some(7));
    assert!((config.rules.base - 40.0).abs() < 1e-9);
    assert_eq!(config.rules.cues.len(), 4);
    assert_eq!(config.selection.article_scan_limit, 100);
    assert_eq!(config.selection.image_limit, 20);
    assert!((config.selection.image_weight - 0.7).abs() < 1e-9);
}

#[test]
fn written_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("engagement.toml");

    let mut config = EngineConfig::default();
    config.selection.lookback_days = 3;
    config.rules.keyword_threshold = 5;
    config.write(&path).unwrap();

    let (loaded, loaded_path) = EngineConfig::load(Some(path.clone())).unwrap();
    assert_eq!(loaded_path, Some(path));
    assert_eq!(loaded.selection.lookback_days, 3);
    assert_eq!(loaded.rules.keyword_threshold, 5);
    assert_eq!(loaded.rules.cues.len(), config.rules.cues.len());
}

#[test]
fn invalid_window_bounds_are_rejected() {
    let mut config = EngineConfig::default();
    config.window.min_hours = 30.0;
    assert!(config.validate().is_err());

    let mut config = EngineConfig::default();
    config.selection.image_weight = 1.5;
    assert!(config.validate().is_err());

    assert!(EngineConfig::default().validate().is_ok());
}

#[test]
fn non_finite_window_values_are_rejected() {
    for value in [f64::NAN, f64::INFINITY, 0.0] {
        let mut config = EngineConfig::default();
        config.window.default_hours = value;
        assert!(config.validate().is_err(), "default_hours {}", value);

        let mut config = EngineConfig::default();
        config.window.min_hours = value;
        assert!(config.validate().is_err(), "min_hours {}", value);

        let mut config = EngineConfig::default();
        config.window.max_hours = value;
        assert!(config.validate().is_err(), "max_hours {}", value);
    }

    let mut config = EngineConfig::default();
    config.selection.image_weight = f64::NAN;
    assert!(config.validate().is_err());

    let mut config = EngineConfig::default();
    config.selection.lookback_days = 0;
    assert!(config.validate().is_err());
}

#[test]
fn nan_window_from_toml_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engagement.toml");
    std::fs::write(&path, "[window]\nmax_hours = nan\n").unwrap();

    assert!(EngineConfig::load(Some(path)).is_err());
}

#[test]
fn normal_threshold_must_stay_below_underflow() {
    let mut config = EngineConfig::default();
    config.sampler.normal_threshold = 1_000.0;
    assert!(config.validate().is_err());

    config.sampler.normal_threshold = f64::NAN;
    assert!(config.validate().is_err());

    config.sampler.normal_threshold = 0.0;
    assert!(config.validate().is_err());

    config.sampler.normal_threshold = 700.0;
    assert!(config.validate().is_ok());
}

use std::io::Write;
use std::path::PathBuf;
use tmsg_demo::{ConfigError, DemoConfig, load_config_from};

fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

fn toml(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn no_sources_yield_defaults() {
    let cfg = load_config_from(None, vars(&[])).unwrap();
    assert_eq!(cfg, DemoConfig::default());
}

#[test]
fn file_values_are_read() {
    let file = toml(
        r#"
        ticks = 12
        drop_chance = 0.5

        [log]
        level = "debug"
        directory = "/tmp/tmsg-logs"
        "#,
    );

    let cfg = load_config_from(Some(file.path()), vars(&[])).unwrap();

    assert_eq!(cfg.ticks, 12);
    assert!((cfg.drop_chance - 0.5).abs() < f64::EPSILON);
    assert_eq!(cfg.log.level, "debug");
    assert_eq!(cfg.log.directory, Some(PathBuf::from("/tmp/tmsg-logs")));
    assert_eq!(cfg.tick_interval_ms, 1_000);
}

#[test]
fn environment_wins_over_file() {
    let file = toml("ticks = 12\nseed = 1\n");
    let env = vars(&[("TMSG__TICKS", "3"), ("TMSG__LOG__JSON", "true")]);

    let cfg = load_config_from(Some(file.path()), env).unwrap();

    assert_eq!(cfg.ticks, 3);
    assert_eq!(cfg.seed, Some(1));
    assert!(cfg.log.json);
}

#[test]
fn missing_file_is_an_error() {
    let err = load_config_from(Some("/definitely/not/here.toml".as_ref()), vars(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::Load { .. }));
}

#[test]
fn out_of_range_values_fail_validation() {
    let err = load_config_from(None, vars(&[("TMSG__DROP_CHANCE", "2.5")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }), "{err}");
}

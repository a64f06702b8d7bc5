use takt_config::load_toml;

#[test]
fn rejects_zero_parts_per_cycle() {
    let toml = r#"
[pacing]
target_seconds_per_part = 30
parts_per_cycle = 0
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject parts_per_cycle=0");
    assert!(
        format!("{err}")
            .to_lowercase()
            .contains("parts_per_cycle must be > 0")
    );
}

#[test]
fn rejects_parts_per_cycle_above_cap() {
    let toml = r#"
[pacing]
target_seconds_per_part = 30
parts_per_cycle = 8

[engine]
parts_per_cycle_max = 4
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject value above cap");
    assert!(format!("{err}").contains("parts_per_cycle_max"));
}

#[test]
fn rejects_malformed_schedule_line() {
    let toml = r#"
[schedule.day]
start = "0700, 0900, 1100"
end = "0845, 1045, 1245, 1500"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject 3-entry start line");
    assert!(format!("{err}").contains("schedule.day.start"));
}

#[test]
fn rejects_override_for_unknown_shift() {
    let toml = r#"
[schedule_override]
shift = "weekend"
date = "2024-06-01"
start = "0700, 0900, 1100, 1300"
end = "0845, 1045, 1245, 1500"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject unknown shift name");
    assert!(format!("{err}").contains("schedule_override.shift"));
}

#[test]
fn rejects_oversized_tick() {
    let toml = r#"
[engine]
tick_ms = 5000
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_partial_file_with_defaults() {
    let toml = r#"
[pacing]
target_seconds_per_part = 45
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("partial config falls back to defaults");
    assert_eq!(cfg.pacing.target_seconds_per_part, 45);
    assert_eq!(cfg.pacing.parts_per_cycle, 1);
    assert_eq!(cfg.engine.tick_ms, 50);
}

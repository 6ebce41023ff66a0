//! Desk configuration loading and validation.

use csdesk_core::config::{BuddyPair, DeskConfig};

fn write_temp(name: &str, body: &str) -> String {
    let path = std::env::temp_dir().join(format!("csdesk-{}-{name}.json", std::process::id()));
    std::fs::write(&path, body).expect("write temp config");
    path.to_string_lossy().into_owned()
}

#[test]
fn builtin_config_is_valid() {
    DeskConfig::builtin().validate().expect("built-in config");
}

#[test]
fn builtin_leaves_one_staff_member_unmapped() {
    let config = DeskConfig::builtin();
    let unmapped: Vec<&str> = config
        .roster
        .iter()
        .filter(|m| config.balance.buddy_of(&m.id).is_none() && config.balance.solo_for(&m.id).is_none())
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(unmapped, vec!["TBA 2"]);
}

#[test]
fn rejects_unknown_and_double_booked_staff() {
    let mut config = DeskConfig::builtin();
    config.balance.pairs.push(BuddyPair::new("8", "42"));
    assert!(config.validate().is_err());

    let mut config = DeskConfig::builtin();
    config.balance.pairs.push(BuddyPair::new("8", "1"));
    assert!(config.validate().is_err());

    let mut config = DeskConfig::builtin();
    config.balance.pairs.push(BuddyPair::new("8", "8"));
    let err = config.validate().expect_err("self pair");
    assert!(err.to_string().contains("itself"));
}

#[test]
fn rejects_bad_threshold_ratio() {
    let mut config = DeskConfig::builtin();
    config.balance.buddy_threshold_ratio = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn loads_json_with_defaults_for_optional_sections() {
    let body = serde_json::json!({
        "roster": [
            { "id": "a", "name": "Ann", "role": "Support" },
            { "id": "b", "name": "Ben", "role": "Support" }
        ],
        "balance": {
            "pairs": [{ "first": "a", "second": "b" }],
            "solo": null,
            "buddyThresholdRatio": 0.2
        }
    });
    let path = write_temp("ok", &body.to_string());
    let config = DeskConfig::load(&path).expect("load");
    assert_eq!(config.roster.len(), 2);
    assert_eq!(config.narrative.timeout_ms, 15_000);
    assert_eq!(config.sla_targets.restaurant_days, 10);
    let _ = std::fs::remove_file(path);
}

#[test]
fn load_reports_unreadable_files() {
    let err = DeskConfig::load("/nonexistent/desk.json").expect_err("missing file");
    assert!(err.to_string().contains("Cannot read"));

    let path = write_temp("bad", "{");
    assert!(DeskConfig::load(&path).is_err());
    let _ = std::fs::remove_file(path);
}

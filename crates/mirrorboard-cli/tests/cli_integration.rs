use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn mirrorboard() -> Command {
    let mut cmd = Command::cargo_bin("mirrorboard").unwrap();
    cmd.env_remove("MIRRORBOARD_CONFIG")
        .env_remove("MIRRORBOARD_STATES")
        .env_remove("MIRRORBOARD_DEBUG_LOG");
    cmd
}

fn parse_json_output(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("Failed to parse JSON output")
}

const STATES: &str = r#"{
    "sensor.trello_board_b1": {
        "state": "ok",
        "attributes": {
            "last_updated": "2026-10-19T08:00:00Z",
            "board_data": {
                "id": "b1",
                "name": "Roadmap",
                "lists": {
                    "l2": {"id": "l2", "name": "Doing", "card_count": 1, "cards": [
                        {"id": "c1", "name": "Write docs", "desc": "Intro chapter"}
                    ]},
                    "l1": {"id": "l1", "name": "Todo", "card_count": "0", "cards": []}
                }
            }
        }
    },
    "sensor.trello_roadmap_legacy": {
        "state": "ok",
        "attributes": {"board_id": "b2", "board_name": "Legacy board"}
    },
    "sensor.trello_list_l9": {
        "state": "2",
        "attributes": {
            "board_id": "b2",
            "list_id": "l9",
            "list_name": "Backlog",
            "cards": [{"id": "c9", "name": "Old task"}]
        }
    },
    "light.kitchen": {"state": "on", "attributes": {}}
}"#;

struct Fixture {
    dir: TempDir,
    states: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let states = dir.path().join("states.json");
        fs::write(&states, STATES).unwrap();
        Self { dir, states }
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn states(&self) -> &str {
        self.states.to_str().unwrap()
    }
}

fn config_arg(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

mod show_tests {
    use super::*;

    #[test]
    fn test_show_entity_as_text() {
        let fx = Fixture::new();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["show", "--states", fx.states(), "--entity-id", "sensor.trello_board_b1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Roadmap"))
            .stdout(predicate::str::contains("== Doing (1) =="))
            .stdout(predicate::str::contains("  - Write docs [c1]"))
            .stdout(predicate::str::contains("Intro chapter"));
    }

    #[test]
    fn test_show_keeps_list_order() {
        let fx = Fixture::new();
        let output = mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["show", "--states", fx.states(), "--entity-id", "sensor.trello_board_b1"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let text = String::from_utf8_lossy(&output);
        assert!(text.find("Doing").unwrap() < text.find("Todo").unwrap());
    }

    #[test]
    fn test_show_json() {
        let fx = Fixture::new();
        let output = mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["show", "--states", fx.states(), "--board-id", "b1", "--json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert!(json["success"].as_bool().unwrap());
        assert_eq!(json["data"]["name"], "Roadmap");
        assert_eq!(json["data"]["lists"]["l1"]["card_count"], 0);
        assert_eq!(json["data"]["lists"]["l2"]["cards"][0]["desc"], "Intro chapter");
    }

    #[test]
    fn test_show_legacy_board_from_list_records() {
        let fx = Fixture::new();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["show", "--states", fx.states(), "--board-id", "b2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Legacy board"))
            .stdout(predicate::str::contains("== Backlog (2) =="))
            .stdout(predicate::str::contains("Old task"));
    }

    #[test]
    fn test_show_unknown_board_prints_placeholder() {
        let fx = Fixture::new();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["show", "--states", fx.states(), "--board-id", "nope"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Board not found or not loaded yet (board nope)"));
    }

    #[test]
    fn test_show_unknown_board_json_fails() {
        let fx = Fixture::new();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["show", "--states", fx.states(), "--entity-id", "sensor.trello_nope", "--json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("\"success\":false"))
            .stderr(predicate::str::contains("sensor.trello_nope"));
    }

    #[test]
    fn test_show_without_selection_fails() {
        let fx = Fixture::new();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["show", "--states", fx.states()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No board selected"));
    }

    #[test]
    fn test_entity_and_board_id_conflict() {
        let fx = Fixture::new();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args([
                "show",
                "--states",
                fx.states(),
                "--entity-id",
                "sensor.trello_board_b1",
                "--board-id",
                "b1",
            ])
            .assert()
            .failure();
    }

    #[test]
    fn test_missing_states_file_fails() {
        let fx = Fixture::new();
        let absent = fx.dir.path().join("absent.json");
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["show", "--states", absent.to_str().unwrap(), "--board-id", "b1"])
            .assert()
            .failure();
    }

    #[test]
    fn test_invalid_states_file_fails() {
        let fx = Fixture::new();
        fs::write(&fx.states, "{not json").unwrap();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["show", "--states", fx.states(), "--board-id", "b1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Serialization"));
    }
}

mod entities_tests {
    use super::*;

    #[test]
    fn test_entities_lists_board_candidates() {
        let fx = Fixture::new();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["entities", "--states", fx.states()])
            .assert()
            .success()
            .stdout(predicate::str::contains("sensor.trello_board_b1\tRoadmap"))
            .stdout(predicate::str::contains("sensor.trello_roadmap_legacy\tLegacy board"))
            .stdout(predicate::str::contains("light.kitchen").not());
    }

    #[test]
    fn test_entities_json() {
        let fx = Fixture::new();
        let output = mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["entities", "--states", fx.states(), "--json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        let items = json["data"]["items"].as_array().unwrap();
        assert_eq!(json["data"]["count"], items.len());
        assert_eq!(items[0]["entity_id"], "sensor.trello_board_b1");
        assert_eq!(items[0]["board_id"], "b1");
        assert!(items.iter().all(|item| item["entity_id"] != "light.kitchen"));
    }

    #[test]
    fn test_entities_empty_feed() {
        let fx = Fixture::new();
        fs::write(&fx.states, "[]").unwrap();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["entities", "--states", fx.states()])
            .assert()
            .success()
            .stdout(predicate::str::contains("No board entities found"));
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_saved_selection_is_used_by_show() {
        let fx = Fixture::new();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["config", "set", "--entity-id", "sensor.trello_board_b1"])
            .assert()
            .success();

        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["show", "--states", fx.states()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Roadmap"));
    }

    #[test]
    fn test_setting_board_id_clears_entity() {
        let fx = Fixture::new();
        fs::write(
            fx.config(),
            "[card]\nentity_id = \"sensor.trello_board_b1\"\n\n[card.display]\ntheme = \"dark\"\n",
        )
        .unwrap();

        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["config", "set", "--board-id", "b2"])
            .assert()
            .success();

        let saved = fs::read_to_string(fx.config()).unwrap();
        assert!(saved.contains("board_id = \"b2\""));
        assert!(!saved.contains("entity_id"));
        assert!(saved.contains("theme = \"dark\""));
    }

    #[test]
    fn test_config_set_requires_a_value() {
        let fx = Fixture::new();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["config", "set"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Nothing to set"));
    }

    #[test]
    fn test_config_show_defaults() {
        let fx = Fixture::new();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("temp_card_purge_ms = 3000"))
            .stdout(predicate::str::contains("command_grace_ms = 1000"));
    }

    #[test]
    fn test_invalid_explicit_config_fails() {
        let fx = Fixture::new();
        fs::write(fx.config(), "[card\n").unwrap();
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Configuration error"));
    }
}

mod misc_tests {
    use super::*;

    #[test]
    fn test_completions() {
        mirrorboard()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("mirrorboard"));
    }

    #[test]
    fn test_watch_missing_states_file_fails() {
        let fx = Fixture::new();
        let absent = fx.dir.path().join("absent.json");
        mirrorboard()
            .args(["--config", &config_arg(&fx.config())])
            .args(["watch", "--states", absent.to_str().unwrap(), "--board-id", "b1"])
            .timeout(std::time::Duration::from_secs(10))
            .assert()
            .failure();
    }
}

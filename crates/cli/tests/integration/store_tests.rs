use dbmkv_lib::KvBackend;
use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn set_then_get_prints_raw_value() {
  let env = TestEnv::new();

  env
    .dbmkv_cmd()
    .args(["set", "thumb/1", "hello"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Stored thumb/1 (5 B)"));

  env.dbmkv_cmd().args(["get", "thumb/1"]).assert().success().stdout("hello");
}

#[test]
fn set_from_file_stores_binary_bytes() {
  let env = TestEnv::new();
  let source = env.temp.path().join("blob.bin");
  let bytes = vec![0u8, 1, 2, 254, 255];
  std::fs::write(&source, &bytes).unwrap();

  env
    .dbmkv_cmd()
    .args(["set", "blob", "--from-file"])
    .arg(&source)
    .assert()
    .success();

  env.dbmkv_cmd().args(["get", "blob"]).assert().success().stdout(bytes.clone());
  assert_eq!(env.store().get("blob").unwrap(), Some(bytes));
}

#[test]
fn get_json_reports_missing_key() {
  let env = TestEnv::new();

  let output = env.dbmkv_cmd().args(["-o", "json", "get", "nope"]).assert().failure();
  let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
  assert_eq!(json["found"], false);
  assert_eq!(json["key"], "nope");
  assert!(json["value"].is_null());
}

#[test]
fn get_json_includes_value() {
  let env = TestEnv::new();
  env.store().set("k", b"v").unwrap();

  let output = env.dbmkv_cmd().args(["get", "k", "-o", "json"]).assert().success();
  let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
  assert_eq!(json["found"], true);
  assert_eq!(json["value"], "v");
}

#[test]
fn delete_is_idempotent() {
  let env = TestEnv::new();
  env.store().set("k", b"v").unwrap();

  env.dbmkv_cmd().args(["delete", "k", "absent"]).assert().success();
  env.dbmkv_cmd().args(["delete", "k"]).assert().success();
  env.dbmkv_cmd().args(["get", "k"]).assert().failure();
}

#[test]
fn keys_lists_prefix_matches_sorted() {
  let env = TestEnv::new();
  let store = env.store();
  for key in ["a/2", "b/1", "a/1"] {
    store.set(key, b"").unwrap();
  }

  env.dbmkv_cmd().args(["keys", "a/"]).assert().success().stdout("a/1\na/2\n");

  let output = env.dbmkv_cmd().args(["-o", "json", "keys"]).assert().success();
  let keys: Vec<String> = serde_json::from_slice(&output.get_output().stdout).unwrap();
  assert_eq!(keys, vec!["a/1", "a/2", "b/1"]);
}

#[test]
fn file_flag_overrides_environment() {
  let env = TestEnv::new();
  let other = env.temp.path().join("other.db");

  env.dbmkv_cmd().arg("--file").arg(&other).args(["set", "k", "v"]).assert().success();

  assert!(other.exists());
  assert!(!env.store_path().exists());
}

#[test]
fn invalid_mode_is_rejected() {
  let env = TestEnv::new();

  env.dbmkv_cmd().args(["--mode", "rwx", "info"]).assert().failure();
  env
    .dbmkv_cmd()
    .env("DBMKV_MODE", "nonsense")
    .arg("info")
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid permission mode"));
}

#[cfg(unix)]
#[test]
fn mode_flag_applies_to_new_files() {
  use std::os::unix::fs::PermissionsExt;

  let env = TestEnv::new();
  env.dbmkv_cmd().args(["--mode", "600", "set", "k", "v"]).assert().success();

  let mode = std::fs::metadata(env.store_path()).unwrap().permissions().mode();
  assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn info_json_describes_store() {
  let env = TestEnv::new();
  env.store().set("k", b"v").unwrap();

  let output = env.dbmkv_cmd().args(["info", "-o", "json"]).assert().success();
  let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
  assert_eq!(json["exists"], true);
  assert_eq!(json["mode"], "0644");
  assert!(json["lock_path"].as_str().unwrap().ends_with("kvstore.lock"));
}

#[test]
fn corrupt_store_reports_error() {
  let env = TestEnv::new();
  std::fs::write(env.store_path(), b"definitely not a store").unwrap();

  env
    .dbmkv_cmd()
    .args(["get", "k"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to read key 'k'"));

  env.dbmkv_cmd().args(["set", "k", "v"]).assert().failure();
}

#[test]
fn verbose_logs_resolved_config_and_command() {
  let env = TestEnv::new();

  env
    .dbmkv_cmd()
    .args(["-v", "set", "k", "v"])
    .assert()
    .success()
    .stderr(predicate::str::contains("resolved store config"))
    .stderr(predicate::str::contains("store session opened"));

  env
    .dbmkv_cmd()
    .args(["set", "k", "v"])
    .assert()
    .success()
    .stderr(predicate::str::contains("resolved store config").not());
}

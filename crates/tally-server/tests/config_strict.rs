#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;

use tally_server::config::{self, TallyConfig};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
storage:
  data_dir: "/tmp/tally"
  filename: "counter.txt" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:5000");
    assert_eq!(cfg.storage.data_dir, "/data");
    assert_eq!(cfg.storage.file_name, "counter.txt");
    assert_eq!(cfg.log.filter, "info");
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:8081"
storage:
  data_dir: "/var/lib/tally"
  file_name: "visits.txt"
log:
  filter: "tally_server=debug"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 8081);
    assert_eq!(cfg.storage.data_dir, "/var/lib/tally");
    assert_eq!(cfg.storage.file_name, "visits.txt");
}

#[test]
fn rejects_unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_bad_listen_addr() {
    let bad = "version: 1\nserver:\n  listen: \"not-an-addr\"\n";
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn rejects_file_name_with_path() {
    for name in ["../counter.txt", "sub/counter.txt", "..", ".", ""] {
        let bad = format!("version: 1\nstorage:\n  file_name: {name:?}\n");
        let err = config::load_from_str(&bad).expect_err(name);
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
    }
}

#[test]
fn env_overrides_replace_values() {
    let env: HashMap<&str, &str> = [
        ("TALLY_DATA_DIR", "/srv/counter"),
        ("TALLY_LISTEN", "127.0.0.1:9000"),
    ]
    .into_iter()
    .collect();

    let mut cfg = TallyConfig::default();
    cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

    assert_eq!(cfg.storage.data_dir, "/srv/counter");
    assert_eq!(cfg.server.listen, "127.0.0.1:9000");
    cfg.validate().unwrap();
}

#[test]
fn load_from_missing_file_fails() {
    let err = config::load_from_file("/nonexistent/tally.yaml").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INTERNAL");
}

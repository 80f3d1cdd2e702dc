#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use locate_session::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
codec:
  log_unknown_fields: true
  log_unmatched_capz: true # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn deny_unknown_top_level_section() {
    let bad = r#"
version: 1
cache:
  max_entries: 10
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert!(!cfg.codec.log_unknown_fields);
    assert!(cfg.codec.log_unmatched_caps);
    assert_eq!(cfg.pending.max_entries, 256);
}

#[test]
fn ok_full_config() {
    let ok = r#"
version: 1
codec:
  log_unknown_fields: true
  log_unmatched_caps: false
pending:
  max_entries: 16
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert!(cfg.codec.log_unknown_fields);
    assert!(!cfg.codec.log_unmatched_caps);
    assert_eq!(cfg.pending.max_entries, 16);
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn pending_limit_out_of_range() {
    for n in [0usize, 65_537] {
        let s = format!("version: 1\npending:\n  max_entries: {n}\n");
        let err = config::load_from_str(&s).expect_err("must fail");
        assert_eq!(err.code().as_str(), "BAD_CONFIG", "max_entries={n}");
    }
}

#[test]
fn missing_file_is_internal() {
    let err = config::load_from_file("/nonexistent/locate.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "INTERNAL");
}

use target_sweep::targets::{load_targets_from_path, parse_targets_str};
use target_sweep::types::Target;

#[test]
fn parse_mixed_valid_and_malformed_lines() {
    let input = r#"
        # lab hosts
        127.0.0.1:22,9999
        badline
        10.0.0.1:80,abc
        example.org:443
        nohost:
    "#;

    let parsed = parse_targets_str(input);
    assert_eq!(
        parsed.targets,
        vec![
            Target::new("127.0.0.1", vec![22, 9999]),
            Target::new("example.org", vec![443]),
        ]
    );
    let skipped: Vec<&str> = parsed.rejected.iter().map(|r| r.line.as_str()).collect();
    assert_eq!(skipped, vec!["badline", "10.0.0.1:80,abc", "nohost:"]);
    assert_eq!(parsed.total_tasks(), 3);
}

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("targets.txt");
    std::fs::write(&path, "192.168.0.1:21,22,23\n").unwrap();

    let parsed = load_targets_from_path(&path).expect("load ok");
    assert_eq!(parsed.targets, vec![Target::new("192.168.0.1", vec![21, 22, 23])]);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_targets_from_path(dir.path().join("absent.txt")).is_err());
}

//! Tests for the working-directory entry points.
//!
//! The working directory is process-wide, so everything that depends on it
//! runs inside one test in its own test binary.

use daylog_core::*;
use std::fs;

#[test]
fn test_cwd_entry_points() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::env::set_current_dir(temp_dir.path()).expect("Failed to enter temp dir");
    let cwd = std::env::current_dir().unwrap();

    let dir = resolve_log_directory().unwrap();
    assert_eq!(dir, cwd.join("logs"));
    assert!(dir.is_dir());

    assert_eq!(resolve_path("2016-09-11.log").unwrap(), dir.join("2016-09-11.log"));
    assert!(matches!(resolve_path("../x.log"), Err(Error::InvalidName(_))));

    let logger = Logger::init().unwrap();
    assert_eq!(logger.path(), dir.join(today_file_name()));
    logger.infof("from %s", &[&"cwd"]).unwrap();

    let names = list_log_files("").unwrap();
    assert_eq!(names, vec![today_file_name()]);

    let content = read_log_file(&today_file_name()).unwrap();
    assert!(content.ends_with(":: from cwd\n"));

    fs::write(dir.join("notes.txt"), "").unwrap();
    assert_eq!(list_log_files("").unwrap().len(), 1);
    assert!(read_log_file("missing.log").unwrap_err().is_not_found());
}

use base::logging::{FileLogger, StdoutLogger, parse_level};
use log::{LevelFilter, Log};
use std::fs;

fn record_at(level: log::Level, message: std::fmt::Arguments<'_>) -> log::Record<'_> {
    log::RecordBuilder::new()
        .level(level)
        .target("test")
        .file(Some("test.rs"))
        .line(Some(42))
        .args(message)
        .build()
}

#[test]
fn test_parse_level() {
    assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
    assert_eq!(parse_level(" WARN "), Some(LevelFilter::Warn));
    assert_eq!(parse_level("off"), Some(LevelFilter::Off));
    assert_eq!(parse_level("loud"), None);
}

#[test]
fn test_stdout_logger_respects_level() {
    let logger = StdoutLogger::new(LevelFilter::Warn);
    let info = log::MetadataBuilder::new().level(log::Level::Info).build();
    let error = log::MetadataBuilder::new().level(log::Level::Error).build();

    assert!(!logger.enabled(&info));
    assert!(logger.enabled(&error));

    logger.log(&record_at(log::Level::Error, format_args!("visible")));
    logger.flush();
}

#[test]
fn test_file_logger_writes_formatted_line() {
    let dir = std::env::temp_dir().join(format!("picam-log-test-{}-write", std::process::id()));
    let _ = fs::remove_dir_all(&dir);

    let logger = FileLogger::new(&dir, LevelFilter::Info).expect("failed to create FileLogger");
    logger.log(&record_at(log::Level::Warn, format_args!("camera restarted")));
    logger.log(&record_at(log::Level::Debug, format_args!("filtered out")));
    logger.flush();

    let entries: Vec<_> = fs::read_dir(&dir).unwrap().collect();
    assert_eq!(entries.len(), 1);
    let path = entries[0].as_ref().unwrap().path();
    let content = fs::read_to_string(path).unwrap();

    assert!(content.contains("[WARN]"));
    assert!(content.contains("test.rs:42 - camera restarted"));
    assert!(!content.contains("filtered out"));

    fs::remove_dir_all(&dir).ok();
}

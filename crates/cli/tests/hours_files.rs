//! File-based loading: config TOML and hours JSON through the CLI helpers.

use std::io::Write;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use oh_cli::cli::{build_service, load_config, load_hours, HoursArgs};
use oh_cli::commands;

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

const HOURS: &str = r#"[
  { "@type": "OpeningHoursSpecification", "dayOfWeek": ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"], "opens": "09:00", "closes": "17:00" },
  { "@type": "OpeningHoursSpecification", "dayOfWeek": "https://schema.org/Saturday", "opens": "10:00", "closes": "14:00" }
]"#;

#[test]
fn config_file_drives_service_zone() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_file(
        &dir,
        "openinghours.toml",
        r#"
[service]
timezone = "America/New_York"
reference_week = "2024-06-03"
"#,
    );
    let hours_path = write_file(&dir, "hours.json", HOURS);

    let (config, shown) = load_config(&config_path).unwrap();
    assert!(shown.ends_with("openinghours.toml"));
    assert_eq!(config.service.timezone, "America/New_York");

    let source = HoursArgs {
        hours: hours_path,
        input_tz: Some("UTC".into()),
    };
    let hours = build_service(&config, &source).unwrap();
    assert_eq!(hours.timezone_name(), "America/New_York");
    assert_eq!(hours.total_open_hours(), 44.0);

    // Back in UTC the records come out as they went in.
    let exported: serde_json::Value =
        serde_json::from_str(&commands::export(&hours, Some("UTC")).unwrap()).unwrap();
    assert_eq!(exported.as_array().unwrap().len(), 6);
    assert_eq!(exported[0]["opens"], "09:00");
    assert_eq!(exported[5]["dayOfWeek"], "Saturday");
}

#[test]
fn status_against_file_backed_service() {
    let dir = tempfile::tempdir().unwrap();
    let hours_path = write_file(&dir, "hours.json", HOURS);
    let (config, _) = load_config(&dir.path().join("missing.toml")).unwrap();

    let hours = build_service(
        &config,
        &HoursArgs {
            hours: hours_path,
            input_tz: None,
        },
    )
    .unwrap();

    // Saturday 2024-06-08 13:30 UTC: open until 14:00.
    let at = Utc.with_ymd_and_hms(2024, 6, 8, 13, 30, 0).unwrap();
    let text = commands::status(&hours, at, false).unwrap();
    assert!(text.starts_with("open at Sat 2024-06-08 13:30 UTC"), "{text}");
    assert!(text.contains("(in 30 minutes)"), "{text}");
}

#[test]
fn malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "bad.toml", "[service\ntimezone = ");
    let err = load_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains("parsing"));
}

#[test]
fn invalid_hours_surface_normalizer_error() {
    let dir = tempfile::tempdir().unwrap();
    let hours_path = write_file(
        &dir,
        "hours.json",
        r#"[{ "dayOfWeek": "Monday", "opens": "23:00", "closes": "02:00" }]"#,
    );
    let (config, _) = load_config(&dir.path().join("none.toml")).unwrap();
    let err = build_service(
        &config,
        &HoursArgs {
            hours: hours_path,
            input_tz: None,
        },
    )
    .unwrap_err();
    let rendered = format!("{err:#}");
    assert!(rendered.contains("invalid time range on Monday"), "{rendered}");
}

#[test]
fn hours_file_must_be_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "hours.json", r#"{"dayOfWeek":"Monday"}"#);
    assert!(load_hours(&path).is_err());
    assert!(load_hours(&dir.path().join("absent.json")).is_err());
}

#[test]
fn padded_timezone_validates_and_builds_alike() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_file(&dir, "openinghours.toml", "[service]\ntimezone = \" UTC \"\n");
    let hours_path = write_file(&dir, "hours.json", HOURS);

    let (config, shown) = load_config(&config_path).unwrap();
    let (_, valid) = commands::config_validate(&config, &shown);
    assert!(valid);

    let hours = build_service(
        &config,
        &HoursArgs {
            hours: hours_path,
            input_tz: None,
        },
    )
    .unwrap();
    assert_eq!(hours.timezone_name(), "UTC");
}

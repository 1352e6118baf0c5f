use replay::loader;
use replay::model::Delimiter;
use replay::normalize;
use replay::views::{self, EntityColumn};
use std::fs;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn three_row_json_spanning_two_days_yields_two_weekday_categories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(
        &dir,
        "history.json",
        r#"[
            {"endTime": "2021-01-01 10:30", "artistName": "Neon", "trackName": "Night Drive", "msPlayed": 215000},
            {"endTime": "2021-01-01 23:10", "artistName": "Neon", "trackName": "Skyline", "msPlayed": 187000},
            {"endTime": "2021-01-02 08:45", "artistName": "Blue", "trackName": "Harbor", "msPlayed": 201000}
        ]"#,
    );

    let table = loader::load_table(&path, Delimiter::Comma).expect("load");
    let dataset = normalize::normalize(&table).expect("normalize");
    assert!(dataset.has_duration);
    assert!(dataset.warnings.is_empty());

    let day = views::day_wise(&dataset.events);
    assert_eq!(day.counts.len(), 2);
    assert_eq!(day.total, 3);
    assert_eq!(day.counts[0], ("Friday", 2));
    assert_eq!(day.counts[1], ("Saturday", 1));
}

#[test]
fn semicolon_csv_normalizes_like_equivalent_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = write_fixture(
        &dir,
        "history.csv",
        "endTime;artistName;trackName;msPlayed\n\
         2021-01-01 10:30;Neon;Night Drive;215000\n\
         2021-01-02 08:45;Blue;Harbor;201000\n",
    );
    let json_path = write_fixture(
        &dir,
        "history.json",
        r#"[
            {"endTime": "2021-01-01 10:30", "artistName": "Neon", "trackName": "Night Drive", "msPlayed": 215000},
            {"endTime": "2021-01-02 08:45", "artistName": "Blue", "trackName": "Harbor", "msPlayed": 201000}
        ]"#,
    );

    let from_csv = normalize::normalize(
        &loader::load_table(&csv_path, Delimiter::Semicolon).expect("load csv"),
    )
    .expect("normalize csv");
    let from_json =
        normalize::normalize(&loader::load_table(&json_path, Delimiter::Comma).expect("load json"))
            .expect("normalize json");

    assert_eq!(from_csv.events, from_json.events);
    assert_eq!(from_csv.has_duration, from_json.has_duration);
}

#[test]
fn full_pipeline_feeds_every_view() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(
        &dir,
        "history.json",
        r#"[
            {"endTime": "2021-01-01 10:30", "artistName": "Neon", "trackName": "Night Drive", "msPlayed": 3600000},
            {"endTime": "2021-01-01 22:15", "artistName": "Neon", "trackName": "Night Drive", "msPlayed": 1800000},
            {"endTime": "2021-01-02 08:45", "artistName": "Blue", "trackName": "Harbor", "msPlayed": 900000},
            {"endTime": "2021-01-03 10:30", "artistName": "Blue", "trackName": "Tides", "msPlayed": 900000}
        ]"#,
    );

    let table = loader::load_table(&path, Delimiter::Comma).expect("load");
    let dataset = normalize::normalize(&table).expect("normalize");

    let artists = views::entity_breakdown(&dataset.events, EntityColumn::Artist, true);
    assert_eq!(artists.unique, 2);
    assert_eq!(artists.total, 4);
    assert_eq!(artists.unique_percentage, 50.0);
    assert_eq!(artists.top_by_time[0].name, "Neon");
    assert_eq!(artists.top_by_time[0].hours, 1.5);
    assert_eq!(artists.top_by_plays[0].plays, 2);

    let tracks = views::entity_breakdown(&dataset.events, EntityColumn::Track, true);
    assert_eq!(tracks.unique, 3);
    assert_eq!(tracks.top_by_plays[0].name, "Night Drive");

    let hourly = views::hourly(&dataset.events);
    assert_eq!(hourly.buckets.iter().sum::<u64>(), 4);
    assert_eq!(hourly.buckets[10], 2);

    let stats = views::listening_time(&dataset.events, dataset.has_duration);
    assert_eq!(stats.total_hours, Some(2.0));
    assert_eq!(stats.span_hours, Some(48.0));
    assert_eq!(stats.busiest_day.map(|(_, count)| count), Some(2));
    assert_eq!(stats.per_day.len(), 3);
}

#[test]
fn missing_duration_column_degrades_instead_of_failing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(
        &dir,
        "history.csv",
        "endTime,artistName,trackName\n\
         2021-01-01 10:30,Neon,Night Drive\n\
         2021-01-02 08:45,Blue,Harbor\n",
    );

    let table = loader::load_table(&path, Delimiter::Comma).expect("load");
    let dataset = normalize::normalize(&table).expect("normalize");
    assert!(!dataset.has_duration);
    assert_eq!(dataset.warnings.len(), 1);

    let artists = views::entity_breakdown(&dataset.events, EntityColumn::Artist, dataset.has_duration);
    assert!(artists.top_by_time.is_empty());
    assert_eq!(artists.top_by_plays.len(), 2);

    let stats = views::listening_time(&dataset.events, dataset.has_duration);
    assert!(stats.total_hours.is_none());
    assert_eq!(stats.average_daily_plays, Some(2));
}

#[test]
fn alternate_timestamp_and_duration_headers_are_recognized() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(
        &dir,
        "history.csv",
        "dateTime,artistName,trackName,duration_ms\n\
         2021-06-05T18:00:00Z,Neon,Night Drive,1800000\n",
    );

    let table = loader::load_table(&path, Delimiter::Comma).expect("load");
    let dataset = normalize::normalize(&table).expect("normalize");
    assert!(dataset.has_duration);
    let event = &dataset.events[0];
    assert_eq!(event.hour, 18);
    assert_eq!(event.weekday_name, "Saturday");
    assert_eq!(event.hours_played, Some(0.5));
}

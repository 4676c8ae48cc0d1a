// Model tests: accumulator arithmetic, averages, series rendering/serialization

use servertrack::models::*;

#[test]
fn load_record_updated_returns_copy_and_leaves_original() {
    let original = LoadRecord {
        count: 2,
        cpu_sum: 10.0,
        mem_sum: 20.0,
    };
    let updated = original.updated(5.0, 7.0);
    assert_eq!(updated.count, 3);
    assert_eq!(updated.cpu_sum, 15.0);
    assert_eq!(updated.mem_sum, 27.0);
    // The published value is a copy; the record a reader may hold is unchanged.
    assert_eq!(original.count, 2);
    assert_eq!(original.cpu_sum, 10.0);
    assert_eq!(original.mem_sum, 20.0);
}

#[test]
fn empty_record_averages_to_zero() {
    let record = LoadRecord::default();
    let avg = record.average();
    assert_eq!(avg.count, 0);
    assert_eq!(avg.cpu, 0.0);
    assert_eq!(avg.mem, 0.0);
}

#[test]
fn average_divides_sums_by_count() {
    let record = LoadRecord {
        count: 4,
        cpu_sum: 10.0,
        mem_sum: 2.0,
    };
    let avg = record.average();
    assert_eq!(avg.count, 4);
    assert_eq!(avg.cpu, 2.5);
    assert_eq!(avg.mem, 0.5);
}

#[test]
fn time_series_display_lists_points_in_order() {
    let series = TimeSeries {
        server_name: "web-1".into(),
        points: vec![
            TimeSeriesPoint {
                timestamp_utc: 120,
                cpu_load: 1.0,
                mem_load: 2.0,
            },
            TimeSeriesPoint {
                timestamp_utc: 60,
                cpu_load: 0.0,
                mem_load: 0.0,
            },
        ],
    };
    let rendered = series.to_string();
    assert!(rendered.starts_with("server=web-1\n"));
    let first = rendered.find("ts=120").expect("first point rendered");
    let second = rendered.find("ts=60").expect("second point rendered");
    assert!(first < second, "points render most recent first");
}

#[test]
fn time_series_serializes_camel_case() {
    let series = TimeSeries {
        server_name: "web-1".into(),
        points: vec![TimeSeriesPoint {
            timestamp_utc: 60,
            cpu_load: 1.5,
            mem_load: 2.5,
        }],
    };
    let json = serde_json::to_string(&series).unwrap();
    assert!(json.contains("\"serverName\":\"web-1\""));
    assert!(json.contains("\"timestampUtc\":60"));
    assert!(json.contains("\"cpuLoad\":1.5"));
    assert!(json.contains("\"memLoad\":2.5"));
}

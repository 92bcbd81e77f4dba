use super::*;

/// Two 10x10 plots side by side in Mist division 1: plot 0 at x 1..11 and
/// plot 1 at x 20..30, both spanning z 0..10.
const DATASET: &str = r#"[
  {"District": 339, "Division": 1, "Plots": [
    {"PlotId": 0, "C1": {"X": 1.0, "Y": 0.0}, "C2": {"X": 11.0, "Y": 0.0},
                  "C3": {"X": 11.0, "Y": 10.0}, "C4": {"X": 1.0, "Y": 10.0}},
    {"PlotId": 1, "C1": {"X": 20.0, "Y": 0.0}, "C2": {"X": 30.0, "Y": 0.0},
                  "C3": {"X": 30.0, "Y": 10.0}, "C4": {"X": 20.0, "Y": 10.0}}
  ]}
]"#;

fn locator() -> PlotLocator {
    PlotLocator::from_json_str(DATASET).expect("dataset parses")
}

fn occupants(
    cache: &mut OccupancyCache,
    locator: &PlotLocator,
    actors: &[ActorSample],
    ground_truth: Option<u8>,
) -> Vec<u8> {
    cache.current_occupants(
        locator,
        District::Mist,
        Division::First,
        actors,
        0.0,
        ground_truth,
    )
}

#[test]
fn test_parse_dataset() {
    let locator = locator();
    assert_eq!(locator.plot_count(), 2);
    let plots = locator.plots_in(District::Mist, Division::First).unwrap();
    assert_eq!(plots[1].plot, 1);
    assert_eq!(plots[1].quad[2], Vec2::new(30.0, 10.0));
    assert!(locator.plots_in(District::Mist, Division::Second).is_none());
}

#[test]
fn test_missing_file_is_error() {
    let result = read_dataset("/nonexistent/facade/plots.json");
    assert!(matches!(result, Err(PlotDataError::Io(_))));
}

#[test]
fn test_garbage_is_parse_error() {
    let result = PlotLocator::from_json_str("{ not json");
    assert!(matches!(result, Err(PlotDataError::Parse(_))));
    let msg = format!("{}", result.unwrap_err());
    assert!(msg.contains("parse"), "got: {msg}");
}

#[test]
fn test_dataset_without_plots_is_error() {
    assert!(matches!(
        PlotLocator::from_json_str("[]"),
        Err(PlotDataError::Empty)
    ));
}

#[test]
fn test_entries_merge_and_bad_ids_skipped() {
    let json = r#"[
      {"District": 340, "Division": 2, "Plots": [
        {"PlotId": 31, "C1": {"X": 1, "Y": 1}, "C2": {"X": 2, "Y": 1}, "C3": {"X": 2, "Y": 2}, "C4": {"X": 1, "Y": 2}}
      ]},
      {"District": 340, "Division": 2, "Plots": [
        {"PlotId": 30, "C1": {"X": 1, "Y": 1}, "C2": {"X": 2, "Y": 1}, "C3": {"X": 2, "Y": 2}, "C4": {"X": 1, "Y": 2}},
        {"PlotId": 5, "C1": {"X": 1, "Y": 1}, "C2": {"X": 2, "Y": 1}, "C3": {"X": 2, "Y": 2}, "C4": {"X": 1, "Y": 2}}
      ]},
      {"District": 12, "Division": 1, "Plots": [
        {"PlotId": 0, "C1": {"X": 1, "Y": 1}, "C2": {"X": 2, "Y": 1}, "C3": {"X": 2, "Y": 2}, "C4": {"X": 1, "Y": 2}}
      ]}
    ]"#;
    let locator = PlotLocator::from_json_str(json).unwrap();
    let plots: Vec<u8> = locator
        .plots_in(District::LavenderBeds, Division::Second)
        .unwrap()
        .iter()
        .map(|b| b.plot)
        .collect();
    assert_eq!(plots, vec![30, 31], "plot 5 is not in division 2");
    assert_eq!(locator.plot_count(), 2);
}

#[test]
fn test_plot_with_unrecorded_corner_skipped() {
    let json = r#"[
      {"District": 339, "Division": 1, "Plots": [
        {"PlotId": 0, "C1": {"X": 0, "Y": 0}, "C2": {"X": 10, "Y": 0}, "C3": {"X": 10, "Y": 10}, "C4": {"X": 0, "Y": 10}},
        {"PlotId": 1, "C1": {"X": 20, "Y": 0}, "C2": {"X": 30, "Y": 0}, "C3": {"X": 30, "Y": 10}, "C4": {"X": 20, "Y": 10}},
        {"PlotId": 2, "C1": {"X": 40, "Y": 0}, "C2": {"X": 50, "Y": 0}, "C3": {"X": 0, "Y": 0}, "C4": {"X": 0, "Y": 0}}
      ]}
    ]"#;
    let locator = PlotLocator::from_json_str(json).unwrap();
    assert_eq!(locator.plot_count(), 1);
    assert_eq!(
        locator.locate(District::Mist, Division::First, Vec2::new(5.0, 5.0), 0.0),
        None
    );
    assert_eq!(
        locator.locate(District::Mist, Division::First, Vec2::new(25.0, 5.0), 0.0),
        Some(1)
    );

    let only_partial = r#"[
      {"District": 339, "Division": 1, "Plots": [
        {"PlotId": 2, "C1": {"X": 40, "Y": 0}, "C2": {"X": 50, "Y": 0}, "C3": {"X": 0, "Y": 0}, "C4": {"X": 0, "Y": 0}}
      ]}
    ]"#;
    assert!(matches!(
        PlotLocator::from_json_str(only_partial),
        Err(PlotDataError::Empty)
    ));
}

#[test]
fn test_locate() {
    let locator = locator();
    let on_one = Vec2::new(25.0, 5.0);
    assert_eq!(
        locator.locate(District::Mist, Division::First, on_one, 0.0),
        Some(1)
    );
    let gap = Vec2::new(15.0, 5.0);
    assert_eq!(locator.locate(District::Mist, Division::First, gap, 0.0), None);
    assert_eq!(
        locator.locate(District::Mist, Division::First, gap, 7.5),
        Some(0),
        "large padding reaches across the gap"
    );
}

#[test]
fn test_occupants_sorted_and_deduplicated() {
    let locator = locator();
    let mut cache = OccupancyCache::default();
    let actors = [
        ActorSample::new(1, 25.0, 5.0),
        ActorSample::new(2, 5.0, 5.0),
        ActorSample::new(3, 26.0, 6.0),
    ];
    assert_eq!(occupants(&mut cache, &locator, &actors, None), vec![0, 1]);
    assert_eq!(cache.assignments().len(), 3);
}

#[test]
fn test_ground_truth_always_appended() {
    let locator = locator();
    let mut cache = OccupancyCache::default();
    let nobody_on_plot = [ActorSample::new(1, 15.0, 5.0)];
    assert_eq!(
        occupants(&mut cache, &locator, &nobody_on_plot, Some(7)),
        vec![7]
    );
    let on_zero = [ActorSample::new(1, 5.0, 5.0)];
    assert_eq!(occupants(&mut cache, &locator, &on_zero, Some(0)), vec![0]);
}

#[test]
fn test_no_geometry_falls_back_to_ground_truth() {
    let locator = locator();
    let mut cache = OccupancyCache::default();
    let actors = [ActorSample::new(1, 5.0, 5.0)];
    let result = cache.current_occupants(
        &locator,
        District::Empyreum,
        Division::First,
        &actors,
        0.0,
        Some(12),
    );
    assert_eq!(result, vec![12]);
    let result = cache.current_occupants(
        &locator,
        District::Empyreum,
        Division::First,
        &actors,
        0.0,
        None,
    );
    assert!(result.is_empty());
}

#[test]
fn test_cache_skips_rescan_when_nothing_moved() {
    let locator = locator();
    let mut cache = OccupancyCache::default();
    let actors = vec![ActorSample::new(1, 5.0, 5.0), ActorSample::new(2, 25.0, 5.0)];

    occupants(&mut cache, &locator, &actors, None);
    occupants(&mut cache, &locator, &actors, None);
    occupants(&mut cache, &locator, &actors, Some(4));
    assert_eq!(cache.scans(), 1, "identical input must hit the cache");

    let moved = vec![ActorSample::new(1, 5.0, 5.5), ActorSample::new(2, 25.0, 5.0)];
    assert_eq!(occupants(&mut cache, &locator, &moved, None), vec![0, 1]);
    assert_eq!(cache.scans(), 2);

    let swapped_id = vec![ActorSample::new(9, 5.0, 5.5), ActorSample::new(2, 25.0, 5.0)];
    occupants(&mut cache, &locator, &swapped_id, None);
    assert_eq!(cache.scans(), 3, "a different actor at the same spot is new input");

    cache.current_occupants(
        &locator,
        District::Mist,
        Division::First,
        &swapped_id,
        2.0,
        None,
    );
    assert_eq!(cache.scans(), 4, "padding is part of the cache key");

    cache.invalidate();
    cache.current_occupants(
        &locator,
        District::Mist,
        Division::First,
        &swapped_id,
        2.0,
        None,
    );
    assert_eq!(cache.scans(), 5);
}

#[test]
fn test_validate_reports_gaps() {
    let mut records = parse_dataset(DATASET).unwrap();
    records[0].plots[1].c3 = Corner::default();
    let issues = validate_dataset(&records);

    assert!(issues.contains(&DatasetIssue::EmptyCorner {
        district: District::Mist,
        division: Division::First,
        plot: 1,
    }));
    assert!(issues.contains(&DatasetIssue::MissingPlot {
        district: District::Mist,
        division: Division::First,
        plot: 2,
    }));
    assert!(issues.contains(&DatasetIssue::MissingDivision {
        district: District::Empyreum,
        division: Division::Second,
    }));
    // 28 missing plots in Mist 1, one empty corner, 9 missing divisions.
    assert_eq!(issues.len(), 28 + 1 + 9);

    let text = issues
        .iter()
        .find(|i| matches!(i, DatasetIssue::EmptyCorner { .. }))
        .unwrap()
        .to_string();
    assert_eq!(
        text,
        "Found plot entry with empty corner for District 339 Division 1 Plot 2"
    );
}

#[test]
fn test_sort_dataset() {
    let mut records = vec![
        DivisionPlots {
            district: 641,
            division: 1,
            plots: vec![
                PlotCorners {
                    plot_id: 3,
                    ..Default::default()
                },
                PlotCorners {
                    plot_id: 1,
                    ..Default::default()
                },
            ],
        },
        DivisionPlots {
            district: 339,
            division: 2,
            plots: Vec::new(),
        },
        DivisionPlots {
            district: 339,
            division: 1,
            plots: Vec::new(),
        },
    ];
    sort_dataset(&mut records);
    let keys: Vec<(u16, u8)> = records.iter().map(|r| (r.district, r.division)).collect();
    assert_eq!(keys, vec![(339, 1), (339, 2), (641, 1)]);
    let ids: Vec<i8> = records[2].plots.iter().map(|p| p.plot_id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_recorder_fills_corners_in_order() {
    let mut recorder = CornerRecorder::new();
    let outcomes: Vec<RecordOutcome> = (0..5)
        .map(|i| {
            recorder.record(
                District::TheGoblet,
                Division::First,
                Some(4),
                Vec2::new(10.0 + i as f32, 3.0),
            )
        })
        .collect();
    assert_eq!(outcomes[0], RecordOutcome::Recorded { plot: 4, corner: 1 });
    assert_eq!(outcomes[3], RecordOutcome::Recorded { plot: 4, corner: 4 });
    assert_eq!(outcomes[4], RecordOutcome::Complete { plot: 4 });

    let exported = recorder.export();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].district, 341);
    assert_eq!(exported[0].plots[0].c4, Corner::new(13.0, 3.0));
    assert!(!exported[0].plots[0].has_empty_corner());
}

#[test]
fn test_recorder_resumes_existing_dataset() {
    let records = parse_dataset(
        r#"[
      {"District": 339, "Division": 1, "Plots": [
        {"PlotId": 1, "C1": {"X": 20, "Y": 0}, "C2": {"X": 30, "Y": 0}, "C3": {"X": 30, "Y": 10}, "C4": {"X": 20, "Y": 10}},
        {"PlotId": 2, "C1": {"X": 40, "Y": 0}, "C2": {"X": 50, "Y": 0}, "C3": {"X": 0, "Y": 0}, "C4": {"X": 0, "Y": 0}}
      ]}
    ]"#,
    )
    .unwrap();
    let mut recorder = CornerRecorder::with_records(records);

    assert_eq!(
        recorder.record(District::Mist, Division::First, Some(1), Vec2::new(1.0, 1.0)),
        RecordOutcome::Complete { plot: 1 }
    );
    for (n, (x, z)) in [(50.0, 10.0), (40.0, 10.0)].into_iter().enumerate() {
        assert_eq!(
            recorder.record(District::Mist, Division::First, Some(2), Vec2::new(x, z)),
            RecordOutcome::Recorded {
                plot: 2,
                corner: n as u8 + 3
            }
        );
    }

    let locator = PlotLocator::from_records(recorder.export());
    assert_eq!(locator.plot_count(), 2);
    assert_eq!(
        locator.locate(District::Mist, Division::First, Vec2::new(45.0, 5.0), 0.0),
        Some(2)
    );
}

#[test]
fn test_recorder_requires_a_plot() {
    let mut recorder = CornerRecorder::new();
    let outcome = recorder.record(District::Mist, Division::First, None, Vec2::ZERO);
    assert_eq!(outcome, RecordOutcome::NotOnPlot);
    assert!(recorder.records().is_empty());
}

#[test]
fn test_recorded_dataset_loads() {
    let mut recorder = CornerRecorder::new();
    for (x, z) in [(40.0, 40.0), (50.0, 40.0), (50.0, 50.0), (40.0, 50.0)] {
        recorder.record(District::Mist, Division::Second, Some(33), Vec2::new(x, z));
    }
    let locator = PlotLocator::from_records(recorder.export());
    assert_eq!(
        locator.locate(District::Mist, Division::Second, Vec2::new(45.0, 45.0), 0.0),
        Some(33)
    );
}

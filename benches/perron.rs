use chrono::{Local, TimeDelta};
use criterion::{Criterion, criterion_group, criterion_main};
use perron::{
    feed::{RawDeparture, VehicleInfos},
    gtfs::{self, Gtfs},
    projection::{self, FilterSet, ProjectionConfig},
    shared,
    stops::{self, StopGroup},
};
use std::{
    env,
    hint::black_box,
    io::{Cursor, Write},
    path::PathBuf,
    time::Duration,
};
use zip::{ZipWriter, write::SimpleFileOptions};

const NAMES: [&str; 8] = [
    "Muzeum",
    "Můstek",
    "Náměstí Míru",
    "Anděl",
    "Palmovka",
    "Hlavní nádraží",
    "Želivského",
    "Karlovo náměstí",
];

/// The archive in `GTFS_DATA_PATH`, or one generated in memory.
fn source() -> Gtfs {
    let gtfs = Gtfs::new(gtfs::Config::default());
    if let Ok(path) = env::var("GTFS_DATA_PATH") {
        return gtfs.from_zip(PathBuf::from(path));
    }

    let mut stops_txt = String::from("stop_id,stop_name,location_type,parent_station\n");
    for i in 0..20_000 {
        let name = NAMES[i % NAMES.len()];
        stops_txt.push_str(&format!("U{i}Z1,{name} {},0,\n", i / NAMES.len()));
        stops_txt.push_str(&format!("U{i}Z2,{name} {},0,\n", i / NAMES.len()));
    }
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("stops.txt", SimpleFileOptions::default())
        .expect("Failed to start stops.txt");
    writer
        .write_all(stops_txt.as_bytes())
        .expect("Failed to write stops.txt");
    gtfs.from_bytes(writer.finish().expect("Failed to finish archive").into_inner())
}

fn departures(count: usize) -> Vec<RawDeparture> {
    let now = Local::now();
    let departures: Vec<String> = (0..count)
        .map(|i| {
            let scheduled = now + TimeDelta::minutes((i % 60) as i64);
            let predicted = scheduled + TimeDelta::minutes((i % 7) as i64);
            format!(
                r#"{{
                    "route": {{"short_name": "{}", "type": {}}},
                    "trip": {{"id": "trip-{i}", "headsign": "Sídliště"}},
                    "stop": {{"id": "U400Z{}", "name": "Muzeum", "platform_code": "{}"}},
                    "departure_timestamp": {{"scheduled": "{}", "predicted": "{}"}}
                }}"#,
                i % 40,
                [0, 1, 3, 11][i % 4],
                i % 4,
                ["A", "B", "C", "D"][i % 4],
                scheduled.to_rfc3339(),
                predicted.to_rfc3339()
            )
        })
        .collect();
    serde_json::from_str(&format!("[{}]", departures.join(","))).expect("Failed to parse departures")
}

fn search(groups: &[StopGroup], needle: &str) {
    let _ = black_box(shared::search(needle, groups));
}

fn project(departures: &[RawDeparture], platforms: &FilterSet, lines: &FilterSet) {
    let config = ProjectionConfig {
        modes: Default::default(),
        accessibility: Default::default(),
        on_time_only: false,
        platforms,
        lines,
        stops: &[],
    };
    let _ = black_box(projection::project(
        departures,
        &VehicleInfos::new(),
        &Local::now(),
        &config,
    ));
}

fn criterion_benchmark(c: &mut Criterion) {
    let gtfs = source();

    let mut group = c.benchmark_group("Stops");
    group.measurement_time(Duration::from_secs(20));

    group.bench_function("Build groups", |b| {
        b.iter(|| black_box(stops::groups_from(&gtfs)))
    });

    let groups = stops::groups_from(&gtfs).expect("Failed to build stop groups");
    group.bench_function("Search name", |b| b.iter(|| search(&groups, "namesti")));
    group.bench_function("Search accented", |b| b.iter(|| search(&groups, "Želiv")));
    group.bench_function("Search id", |b| b.iter(|| search(&groups, "u1234")));
    group.finish();

    let departures = departures(600);
    let mut platforms = FilterSet::new().rebuild(projection::platform_names(&departures));
    platforms.set_selected("B", false);
    let lines = FilterSet::new().rebuild(projection::line_names(&departures));

    let mut group = c.benchmark_group("Projection");
    group.bench_function("Project 600 departures", |b| {
        b.iter(|| project(&departures, &platforms, &lines))
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

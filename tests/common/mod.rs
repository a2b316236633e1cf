#![allow(dead_code)]

use futures_util::future::BoxFuture;
use perron::{
    alerts::AlertEvent,
    board::{Notifier, NotifyError},
    config::Config,
    http::{self, Request, Response, Transport},
};
use std::{
    io::{Cursor, Write},
    sync::{Arc, Mutex},
};
use tokio::sync::{Notify, Semaphore};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

pub const STOPS_TXT: &str = "\
stop_id,stop_name,location_type,parent_station,platform_code
U400S1,Muzeum,1,,
U400Z1,Muzeum,0,U400S1,A
U400Z2,Muzeum,0,U400S1,B
U400Z101P,Muzeum,,U400S1,1
U321Z1,Můstek,0,,A
U321Z2,MUSTEK,0,,B
U507Z1,Náměstí Míru,0,,
";

type Handler = Box<dyn Fn(&Request) -> Response + Send + Sync>;

/// Transport answering from a closure and recording every request.
/// Requests whose url contains a held needle wait for `release`.
pub struct FakeTransport {
    handler: Handler,
    requests: Mutex<Vec<Request>>,
    hold: Mutex<Option<(String, Arc<Semaphore>)>>,
    started: Notify,
}

impl FakeTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            hold: Mutex::new(None),
            started: Notify::new(),
        })
    }

    /// Makes requests to urls containing `needle` wait for `release`.
    pub fn hold(&self, needle: &str) {
        *self.hold.lock().unwrap() = Some((needle.to_string(), Arc::new(Semaphore::new(0))));
    }

    pub fn release(&self, permits: usize) {
        if let Some((_, semaphore)) = self.hold.lock().unwrap().as_ref() {
            semaphore.add_permits(permits);
        }
    }

    /// Resolves once `count` requests to urls containing `needle` were made.
    pub async fn wait_for(&self, needle: &str, count: usize) {
        loop {
            let notified = self.started.notified();
            if self.count(needle) >= count {
                return;
            }
            notified.await;
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.urls().iter().filter(|url| url.contains(needle)).count()
    }

    pub fn last(&self) -> Option<Request> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Transport for FakeTransport {
    fn get(&self, request: Request) -> BoxFuture<'_, Result<Response, http::Error>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            let gate = self
                .hold
                .lock()
                .unwrap()
                .as_ref()
                .filter(|(needle, _)| request.url.contains(needle.as_str()))
                .map(|(_, semaphore)| semaphore.clone());
            self.started.notify_waiters();
            if let Some(gate) = gate {
                gate.acquire().await.unwrap().forget();
            }
            Ok((self.handler)(&request))
        })
    }
}

pub fn json(status: u16, body: &str) -> Response {
    Response {
        status,
        body: body.as_bytes().to_vec(),
    }
}

pub fn not_found() -> Response {
    json(404, "Not Found")
}

pub fn gtfs_zip(stops_txt: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file("stops.txt", options).unwrap();
    writer.write_all(stops_txt.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn config() -> Config {
    Config {
        api_base_url: "https://feed.test".into(),
        api_key: Some("secret".into()),
        gtfs_url: "https://gtfs.test/PID_GTFS.zip".into(),
        ..Default::default()
    }
}

/// One departure in the shape the departure board endpoint returns.
pub fn departure(line: &str, route_type: i32, platform: &str, scheduled: &str, predicted: &str) -> String {
    format!(
        r#"{{
            "route": {{"short_name": "{line}", "type": {route_type}}},
            "trip": {{"id": "trip-{line}-{scheduled}", "headsign": "Sídliště"}},
            "stop": {{"id": "U400Z1", "name": "Muzeum", "platform_code": "{platform}"}},
            "departure_timestamp": {{"scheduled": "{scheduled}", "predicted": "{predicted}"}},
            "delay": {{"total": 0}}
        }}"#
    )
}

pub fn board_json(departures: &[String]) -> String {
    format!(r#"{{"departures": [{}]}}"#, departures.join(","))
}

/// Collects notified alerts.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<AlertEvent>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            return Err(NotifyError("no notification daemon".into()));
        }
        Ok(())
    }
}

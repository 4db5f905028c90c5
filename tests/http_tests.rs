use reqwest::StatusCode;
use reqwest::blocking::{Client, get};
use serde_json::Value;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command};
use std::thread;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

struct WeatherTestServer {
    process: Child,
    base_url: String,
    _dir: Option<TempDir>,
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Could not bind to a free port")
        .local_addr()
        .expect("Listener should have an address")
        .port()
}

impl WeatherTestServer {
    fn spawn() -> Self {
        let dir = tempdir().expect("Could not create temporary directory");
        let database_path = dir.path().join("weather.db");
        let mut server = Self::spawn_with_database(database_path);
        server._dir = Some(dir);
        server
    }

    fn spawn_with_database(database_path: PathBuf) -> Self {
        let port = free_port();
        let backend_executable = env!("CARGO_BIN_EXE_weather-station");
        let mut process = Command::new(backend_executable)
            .arg("--database-path")
            .arg(database_path)
            .args(["--port", &port.to_string()])
            .spawn()
            .expect("Could not start weather-station");
        let base_url = format!("http://127.0.0.1:{port}");
        while get(format!("{base_url}/")).is_err() {
            if let Some(status) = process.try_wait().expect("Could not poll weather-station") {
                panic!("weather-station exited during startup: {status}");
            }
            thread::sleep(Duration::from_millis(1));
        }
        WeatherTestServer {
            process,
            base_url,
            _dir: None,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for WeatherTestServer {
    fn drop(&mut self) {
        self.process
            .kill()
            .expect("Failed to send kill signal to weather-station");
        self.process.wait().expect("weather-station failed to stop");
    }
}

#[test]
#[should_panic(expected = "exited during startup")]
fn spawn_fails_when_server_exits() {
    let dir = tempdir().expect("Could not create temporary directory");
    WeatherTestServer::spawn_with_database(dir.path().join("missing").join("weather.db"));
}

#[test]
fn can_start_and_stop_server() {
    WeatherTestServer::spawn();
}

#[test]
fn index_page_is_served() {
    let server = WeatherTestServer::spawn();
    let res = get(server.url("/")).expect("Could not send request");
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.text()
            .expect("Could not read body")
            .contains("Weather Station")
    );
}

#[test]
fn added_reading_is_listed() {
    let server = WeatherTestServer::spawn();
    let client = Client::new();

    let res = client
        .get(server.url("/get_data"))
        .send()
        .expect("Could not send request");
    assert_eq!(res.status(), StatusCode::OK);
    let readings: Vec<Value> = res.json().expect("Could not parse readings");
    assert!(readings.is_empty());

    let res = client
        .post(server.url("/add_data"))
        .send()
        .expect("Could not send request");
    assert_eq!(res.status(), StatusCode::OK);
    let added: Value = res.json().expect("Could not parse reading");

    let readings: Vec<Value> = client
        .get(server.url("/get_data"))
        .send()
        .expect("Could not send request")
        .json()
        .expect("Could not parse readings");
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0]["id"], 1);
    assert!(readings[0]["timestamp"].is_string());
    for field in ["temperature", "humidity", "pressure"] {
        assert_eq!(readings[0][field], added[field]);
    }
}

#[test]
fn get_is_not_allowed_on_add_data() {
    let server = WeatherTestServer::spawn();
    let res = get(server.url("/add_data")).expect("Could not send request");
    assert!(res.status().is_client_error());
}

use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const TODAY: &str = "2025-01-10";

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    id: String,
    name: String,
    goal: u64,
}

#[derive(Debug, Deserialize)]
struct ActiveProfileResponse {
    id: Option<String>,
    name: String,
    goal: u64,
}

#[derive(Debug, Deserialize)]
struct EntryResponse {
    id: String,
    date: String,
    count: u64,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_suffix() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}_{}", std::process::id(), nanos)
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/status")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

fn temp_data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("pushup_log_http_{}", unique_suffix()))
}

async fn spawn_server() -> TestServer {
    spawn_server_in(&temp_data_dir()).await
}

async fn spawn_server_in(dir: &Path) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_pushup_log"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", dir.join("store.json"))
        .env("APP_PROFILE_HINT_PATH", dir.join("last_profile.json"))
        .env("APP_USERNAME", "JJ")
        .env("APP_GOAL", "10000")
        .env("APP_TODAY", TODAY)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn create_profile(client: &Client, base_url: &str, name: &str, goal: u64) -> ProfileResponse {
    let response = client
        .post(format!("{base_url}/api/profiles"))
        .json(&json!({ "name": name, "goal": goal }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn log_entry(client: &Client, base_url: &str, count: Value, date: &str) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/entries"))
        .json(&json!({ "count": count, "date": date }))
        .send()
        .await
        .unwrap()
}

async fn entries(client: &Client, base_url: &str) -> Vec<EntryResponse> {
    client
        .get(format!("{base_url}/api/entries"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn dashboard(client: &Client, base_url: &str) -> Value {
    client
        .get(format!("{base_url}/api/dashboard"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_status_reports_configured_store() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let status: Value = client
        .get(format!("{}/api/status", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status["configured"], json!(true));
    assert_eq!(status["config_error"], Value::Null);

    let page = client.get(&server.base_url).send().await.unwrap();
    assert!(page.status().is_success());
    assert!(page.text().await.unwrap().contains("Pushup Log"));
}

#[tokio::test]
async fn http_logged_entries_drive_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let name = format!("Runner{}", unique_suffix());

    let profile = create_profile(&client, &server.base_url, &name, 100).await;
    assert_eq!(profile.goal, 100);

    let active: ActiveProfileResponse = client
        .get(format!("{}/api/profiles/active", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(active.id.as_deref(), Some(profile.id.as_str()));
    assert_eq!(active.name, name);

    for (count, date) in [(10, "2025-01-08"), (10, "2025-01-09"), (5, "2025-01-10"), (5, "2025-01-10")] {
        let response = log_entry(&client, &server.base_url, json!(count), date).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let response = log_entry(&client, &server.base_url, json!(99), "2024-12-31").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let listed = entries(&client, &server.base_url).await;
    assert_eq!(listed.len(), 5);
    assert_eq!(listed[0].date, "2025-01-10");
    assert_eq!(listed[4].date, "2024-12-31");

    let dashboard = dashboard(&client, &server.base_url).await;
    let stats = &dashboard["analytics"];
    assert_eq!(dashboard["today"], json!(TODAY));
    assert_eq!(dashboard["year"], json!(2025));
    assert_eq!(stats["total"], json!(30));
    assert_eq!(stats["today_total"], json!(10));
    assert_eq!(stats["streak"], json!({ "current": 3, "best": 3 }));
    assert_eq!(stats["zero_days"], json!([]));
    assert_eq!(stats["projection"]["average_per_day"], json!(10.0));
    assert_eq!(stats["projection"]["days_remaining"], json!(7));
    assert_eq!(stats["projection"]["estimated_date"], json!("2025-01-17"));
}

#[tokio::test]
async fn http_invalid_entries_change_nothing() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    create_profile(&client, &server.base_url, &format!("Strict{}", unique_suffix()), 50).await;

    for (count, date) in [
        (json!(0), "2025-01-05"),
        (json!(-5), "2025-01-05"),
        (json!("many"), "2025-01-05"),
        (json!(2.5), "2025-01-05"),
        (json!(5), "2025/01/05"),
        (json!(5), "2025-02-30"),
        (json!(5), ""),
    ] {
        let response = log_entry(&client, &server.base_url, count, date).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    assert!(entries(&client, &server.base_url).await.is_empty());
    let dashboard = dashboard(&client, &server.base_url).await;
    assert_eq!(dashboard["analytics"]["total"], json!(0));
    assert_eq!(dashboard["analytics"]["projection"], Value::Null);
}

#[tokio::test]
async fn http_entries_can_be_edited_and_deleted() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    create_profile(&client, &server.base_url, &format!("Editor{}", unique_suffix()), 500).await;

    let created: EntryResponse = log_entry(&client, &server.base_url, json!("20"), "2025-01-01")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(created.count, 20);

    let updated: EntryResponse = client
        .put(format!("{}/api/entries/{}", server.base_url, created.id))
        .json(&json!({ "count": 35, "date": "2025-01-03" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.count, 35);
    assert_eq!(updated.date, "2025-01-03");

    let dashboard = dashboard(&client, &server.base_url).await;
    assert_eq!(dashboard["analytics"]["total"], json!(35));
    assert_eq!(
        dashboard["analytics"]["zero_days"],
        json!(["2025-01-04", "2025-01-05", "2025-01-06", "2025-01-07", "2025-01-08", "2025-01-09"])
    );

    let response = client
        .delete(format!("{}/api/entries/{}", server.base_url, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .delete(format!("{}/api/entries/{}", server.base_url, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(entries(&client, &server.base_url).await.is_empty());
}

#[tokio::test]
async fn http_profiles_are_unique_and_switchable() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let suffix = unique_suffix();
    let first = create_profile(&client, &server.base_url, &format!("Anna{suffix}"), 300).await;
    create_profile(&client, &server.base_url, &format!("Bertil{suffix}"), 400).await;

    let duplicate = client
        .post(format!("{}/api/profiles", server.base_url))
        .json(&json!({ "name": format!("  anna{suffix} "), "goal": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let missing = client
        .post(format!("{}/api/profiles/active", server.base_url))
        .json(&json!({ "name": format!("Nobody{suffix}") }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let switched: ActiveProfileResponse = client
        .post(format!("{}/api/profiles/active", server.base_url))
        .json(&json!({ "name": format!("ANNA{suffix}") }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(switched.id.as_deref(), Some(first.id.as_str()));
    assert_eq!(switched.name, first.name);

    let updated: ProfileResponse = client
        .put(format!("{}/api/profiles/{}", server.base_url, first.id))
        .json(&json!({ "goal": 900 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated.goal, 900);

    let dashboard = dashboard(&client, &server.base_url).await;
    assert_eq!(dashboard["profile"]["goal"], json!(900));

    let profiles: Vec<ProfileResponse> = client
        .get(format!("{}/api/profiles", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = profiles.iter().map(|profile| profile.name.as_str()).collect();
    let anna = names.iter().position(|name| *name == first.name).unwrap();
    let bertil = names.iter().position(|name| name.starts_with("Bertil")).unwrap();
    assert!(anna < bertil);
}

#[tokio::test]
async fn http_corrupt_store_starts_unconfigured() {
    let _guard = TEST_LOCK.lock().await;
    let dir = temp_data_dir();
    std::fs::create_dir_all(&dir).unwrap();
    let data_path = dir.join("store.json");
    std::fs::write(&data_path, "not json {").unwrap();

    let server = spawn_server_in(&dir).await;
    let client = Client::new();

    let status: Value = client
        .get(format!("{}/api/status", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["configured"], json!(false));
    let config_error = status["config_error"].as_str().unwrap();
    assert!(config_error.contains("store.json"), "{config_error}");

    let created = log_entry(&client, &server.base_url, json!(20), TODAY).await;
    assert_eq!(created.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(created.text().await.unwrap(), config_error);

    for path in ["/api/dashboard", "/api/entries", "/api/profiles"] {
        let response = client
            .get(format!("{}{path}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{path}");
    }

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("const configured = false"));

    drop(server);
    assert_eq!(std::fs::read_to_string(&data_path).unwrap(), "not json {");
}

//! Telemetry API client and the polling source built on it.
//!
//! Every endpoint is a JSON `POST`. After [`ApiClient::login`] the bearer
//! token is attached to all requests.
//!
//! ## Example
//!
//! ```rust,no_run
//! use secador_monitor::ApiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = ApiClient::builder()
//!         .endpoint("https://api.example.com")
//!         .credentials("operador", "senha")
//!         .empresa("Agro")
//!         .build();
//!
//!     client.login().await?;
//!     let snapshot = client.collect(&Default::default()).await?;
//!     println!("{} dryers online", snapshot.dryers.len());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::snapshot::parse_rows;
use super::{
    ChannelSource, DashboardSnapshot, DataSource, HistoryQuery, SerializedDryerCard,
    SerializedDryerConfig, SerializedHistoryRow,
};
use crate::data::DateRange;
use crate::error::ApiError;

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Client for the dryer telemetry API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
    username: String,
    password: String,
    empresa: Option<String>,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Base URL the client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether a bearer token is available.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Whether a username is configured, so [`login`](Self::login) can run.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }

    /// Exchange the configured credentials for a bearer token.
    pub async fn login(&mut self) -> Result<(), ApiError> {
        let body = json!({ "username": self.username, "password": self.password });
        let response: Vec<LoginResponse> = self.post("/login", &body).await?;
        let token = parse_login(response)?;
        info!(endpoint = %self.endpoint, "authenticated");
        self.token = Some(token);
        Ok(())
    }

    /// Live cards of every dryer.
    pub async fn fetch_dryers(&self) -> Result<Vec<SerializedDryerCard>, ApiError> {
        let value: Value = self.post("/secador/online", &json!({})).await?;
        parse_cards(value)
    }

    /// Alert configurations of the configured company.
    pub async fn fetch_configs(&self) -> Result<Vec<SerializedDryerConfig>, ApiError> {
        let empresa = self.empresa.as_deref().ok_or(ApiError::MissingCompany)?;
        let value: Value = self.post("/secador/config", &json!({ "empresa": empresa })).await?;
        match value {
            Value::Array(rows) => Ok(parse_rows("dryer config", rows)),
            _ => Err(ApiError::InvalidFormat("/secador/config")),
        }
    }

    /// History rows for the given query.
    pub async fn fetch_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<SerializedHistoryRow>, ApiError> {
        let body = history_body(query.dryer.as_deref(), &query.range, Local::now().date_naive());
        let value: Value = self.post("/secador/dados", &body).await?;
        match value {
            Value::Array(rows) => Ok(parse_rows("history row", rows)),
            _ => Err(ApiError::InvalidFormat("/secador/dados")),
        }
    }

    /// PLC connectivity.
    pub async fn fetch_clp_status(&self) -> Result<bool, ApiError> {
        let response: Vec<ClpStatus> = self.post("/status-clp", &json!({})).await?;
        response
            .first()
            .map(|s| s.status)
            .ok_or(ApiError::InvalidFormat("/status-clp"))
    }

    /// Fetch everything one refresh needs.
    ///
    /// Missing company configuration and PLC failures degrade the snapshot
    /// instead of failing it.
    pub async fn collect(&self, query: &HistoryQuery) -> Result<DashboardSnapshot, ApiError> {
        let dryers = self.fetch_dryers().await?;

        let configs = match self.fetch_configs().await {
            Ok(configs) => configs,
            Err(ApiError::MissingCompany) => Vec::new(),
            Err(e) => return Err(e),
        };

        let history = self.fetch_history(query).await?;

        let clp_online = match self.fetch_clp_status().await {
            Ok(online) => Some(online),
            Err(e) => {
                warn!(error = %e, "CLP status unavailable");
                None
            }
        };

        debug!(
            dryers = dryers.len(),
            configs = configs.len(),
            history = history.len(),
            "collected snapshot"
        );

        Ok(DashboardSnapshot {
            dryers,
            configs,
            history,
            clp_online,
        })
    }

    /// [`collect`](Self::collect), logging in again once when the token is
    /// rejected and credentials are configured.
    pub async fn refresh(&mut self, query: &HistoryQuery) -> Result<DashboardSnapshot, ApiError> {
        match self.collect(query).await {
            Err(ApiError::Auth(reason)) if self.has_credentials() => {
                warn!(%reason, "token rejected, logging in again");
                self.login().await?;
                self.collect(query).await
            }
            result => result,
        }
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ApiError> {
        let url = format!("{}{}", self.endpoint, path);

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ApiError::Auth(format!("{} rejected the token", path)));
        }

        if !response.status().is_success() {
            return Err(ApiError::Http(format!(
                "{} returned status {}",
                path,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Builder for [`ApiClient`].
#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    empresa: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    /// Set the API base URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the login credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the company whose dryer configurations are fetched.
    pub fn empresa(mut self, empresa: impl Into<String>) -> Self {
        self.empresa = Some(empresa.into());
        self
    }

    /// Use an existing bearer token instead of logging in.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> ApiClient {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        ApiClient {
            client,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| crate::config::DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            username: self.username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            empresa: self.empresa.filter(|e| !e.is_empty()),
            token: self.token.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClpStatus {
    status: bool,
}

fn parse_login(response: Vec<LoginResponse>) -> Result<String, ApiError> {
    match response.into_iter().next() {
        Some(LoginResponse {
            status: true,
            token: Some(token),
        }) if !token.is_empty() => Ok(token),
        Some(_) => Err(ApiError::Auth("invalid username or password".to_string())),
        None => Err(ApiError::InvalidFormat("/login")),
    }
}

/// `/secador/online` answers with a single object when only one dryer exists.
fn parse_cards(value: Value) -> Result<Vec<SerializedDryerCard>, ApiError> {
    match value {
        Value::Array(rows) => Ok(parse_rows("dryer card", rows)),
        card @ Value::Object(_) => Ok(parse_rows("dryer card", vec![card])),
        _ => Err(ApiError::InvalidFormat("/secador/online")),
    }
}

fn history_body(dryer: Option<&str>, range: &DateRange, today: NaiveDate) -> Value {
    let day_start =
        |d: NaiveDate| d.and_hms_opt(0, 0, 0).map(|t| t.format(DATE_TIME_FORMAT).to_string());
    let day_end =
        |d: NaiveDate| d.and_hms_opt(23, 59, 59).map(|t| t.format(DATE_TIME_FORMAT).to_string());

    let (start, end) = if range.is_unbounded() {
        (day_start(today), day_end(today))
    } else {
        (range.start.and_then(day_start), range.end.and_then(day_end))
    };

    let mut body = serde_json::Map::new();
    if let Some(dryer) = dryer {
        body.insert("secador".to_string(), json!(dryer));
    }
    if let Some(start) = start {
        body.insert("dataInicial".to_string(), json!(start));
    }
    if let Some(end) = end {
        body.insert("dataFinal".to_string(), json!(end));
    }
    Value::Object(body)
}

/// A data source that polls the API on a background task.
///
/// Snapshots reach the UI through a [`ChannelSource`]; the latest history
/// query travels the other way on a watch channel and triggers an immediate
/// refetch.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use secador_monitor::{ApiClient, ApiSource, App};
///
/// # tokio_test::block_on(async {
/// let client = ApiClient::builder().token("t0k3n").build();
/// let (source, handle) = ApiSource::spawn(client, Duration::from_secs(5));
/// let app = App::new(Box::new(source));
/// # });
/// ```
#[derive(Debug)]
pub struct ApiSource {
    inner: ChannelSource,
    description: String,
    errors: watch::Receiver<Option<String>>,
    last_error: Option<String>,
    queries: watch::Sender<HistoryQuery>,
}

impl ApiSource {
    /// Spawn the polling task. Must be called from within a tokio runtime.
    pub fn spawn(mut client: ApiClient, interval: Duration) -> (Self, JoinHandle<()>) {
        let description = format!("api: {}", client.endpoint());
        let (snapshot_tx, inner) = ChannelSource::create(client.endpoint());
        let (error_tx, errors) = watch::channel(None);
        let (queries, mut query_rx) = watch::channel(HistoryQuery::default());

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = query_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                let query = query_rx.borrow_and_update().clone();
                match client.refresh(&query).await {
                    Ok(snapshot) => {
                        let _ = error_tx.send(None);
                        if snapshot_tx.send(snapshot).is_err() {
                            // Receiver dropped
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "refresh failed");
                        let _ = error_tx.send(Some(e.to_string()));
                    }
                }
            }
        });

        let source = Self {
            inner,
            description,
            errors,
            last_error: None,
            queries,
        };
        (source, handle)
    }
}

impl DataSource for ApiSource {
    fn poll(&mut self) -> Option<DashboardSnapshot> {
        if self.errors.has_changed().unwrap_or(false) {
            self.last_error = self.errors.borrow_and_update().clone();
        }
        self.inner.poll()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn request_history(&mut self, query: HistoryQuery) {
        self.queries.send_if_modified(|current| {
            if *current == query {
                false
            } else {
                *current = query;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Local stand-in for the API: `/login` issues the token `fresh`, every
    /// other path answers 401 unless that token is presented.
    async fn serve_fake_api() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let request = read_request(&mut stream).await;
                    let (status, body) = fake_response(&request);
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn fake_response(request: &str) -> (&'static str, &'static str) {
        let path = request.split_whitespace().nth(1).unwrap_or("");
        let authorized = request
            .lines()
            .any(|line| line.eq_ignore_ascii_case("authorization: bearer fresh"));
        match path {
            "/login" => ("200 OK", r#"[{"status": true, "token": "fresh"}]"#),
            _ if !authorized => ("401 Unauthorized", "[]"),
            "/status-clp" => ("200 OK", r#"[{"status": true}]"#),
            _ => ("200 OK", "[]"),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let client = ApiClient::builder().build();
        assert_eq!(client.endpoint(), crate::config::DEFAULT_API_URL);
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_builder_trims_endpoint_and_keeps_token() {
        let client = ApiClient::builder()
            .endpoint("http://localhost:8080/")
            .token("abc")
            .build();
        assert_eq!(client.endpoint(), "http://localhost:8080");
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_history_body_defaults_to_today() {
        let body = history_body(Some("Secador 1"), &DateRange::default(), date(2024, 3, 5));
        assert_eq!(
            body,
            json!({
                "secador": "Secador 1",
                "dataInicial": "2024-03-05 00:00:00",
                "dataFinal": "2024-03-05 23:59:59"
            })
        );
    }

    #[test]
    fn test_history_body_uses_present_bounds() {
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 3)));
        let body = history_body(None, &range, date(2024, 3, 5));
        assert_eq!(
            body,
            json!({
                "dataInicial": "2024-01-01 00:00:00",
                "dataFinal": "2024-01-03 23:59:59"
            })
        );

        let start_only = DateRange::new(Some(date(2024, 1, 2)), None);
        let body = history_body(None, &start_only, date(2024, 3, 5));
        assert_eq!(body, json!({ "dataInicial": "2024-01-02 00:00:00" }));
    }

    #[test]
    fn test_parse_login() {
        let ok = vec![LoginResponse {
            status: true,
            token: Some("t0k3n".to_string()),
        }];
        assert_eq!(parse_login(ok).unwrap(), "t0k3n");

        let rejected = vec![LoginResponse {
            status: false,
            token: Some("t0k3n".to_string()),
        }];
        assert!(matches!(parse_login(rejected), Err(ApiError::Auth(_))));

        let no_token = vec![LoginResponse {
            status: true,
            token: None,
        }];
        assert!(matches!(parse_login(no_token), Err(ApiError::Auth(_))));

        assert!(matches!(parse_login(Vec::new()), Err(ApiError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_cards_accepts_single_object() {
        let single = json!({ "idSecador": 1, "secador": "Secador 1" });
        let cards = parse_cards(single).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].secador.as_deref(), Some("Secador 1"));

        let many = json!([{ "secador": "A" }, { "secador": "B" }]);
        assert_eq!(parse_cards(many).unwrap().len(), 2);

        let mixed = json!([{ "secador": "A" }, { "secador": 7 }, { "unidade": "Penha" }]);
        let cards = parse_cards(mixed).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].secador.as_deref(), Some("A"));
        assert_eq!(cards[1].unidade.as_deref(), Some("Penha"));

        assert!(parse_cards(json!({ "secador": ["A"] })).unwrap().is_empty());

        assert!(matches!(
            parse_cards(json!("oops")),
            Err(ApiError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_logs_in_again_when_token_is_rejected() {
        let endpoint = serve_fake_api().await;
        let mut client = ApiClient::builder()
            .endpoint(&endpoint)
            .credentials("operador", "senha")
            .token("stale")
            .build();

        let snapshot = client.refresh(&HistoryQuery::default()).await.unwrap();
        assert_eq!(snapshot.clp_online, Some(true));
        assert_eq!(client.token.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_refresh_without_credentials_keeps_auth_error() {
        let endpoint = serve_fake_api().await;
        let mut client = ApiClient::builder().endpoint(&endpoint).token("stale").build();
        assert!(!client.has_credentials());

        let result = client.refresh(&HistoryQuery::default()).await;
        assert!(matches!(result, Err(ApiError::Auth(_))));
        assert_eq!(client.token.as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn test_api_source_recovers_from_expired_token() {
        let endpoint = serve_fake_api().await;
        let client = ApiClient::builder()
            .endpoint(&endpoint)
            .credentials("operador", "senha")
            .token("stale")
            .build();
        let (mut source, handle) = ApiSource::spawn(client, Duration::from_secs(60));

        // The first poll yields the empty initial snapshot
        let mut clp_online = None;
        for _ in 0..50 {
            if let Some(snapshot) = source.poll() {
                if snapshot.clp_online.is_some() {
                    clp_online = snapshot.clp_online;
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        handle.abort();

        assert_eq!(clp_online, Some(true));
        assert!(source.error().is_none());
    }

    #[tokio::test]
    async fn test_api_source_reports_connection_errors() {
        let client = ApiClient::builder()
            .endpoint("http://127.0.0.1:1")
            .timeout(Duration::from_millis(200))
            .build();
        let (mut source, handle) = ApiSource::spawn(client, Duration::from_secs(60));
        assert_eq!(source.description(), "api: http://127.0.0.1:1");

        let mut error = None;
        for _ in 0..50 {
            source.poll();
            if let Some(e) = source.error() {
                error = Some(e.to_string());
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        handle.abort();

        assert!(error.is_some());
    }
}

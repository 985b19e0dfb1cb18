//! Virtual user pool and run loop

use assessor_config::LoadgenConfig;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::checks::{CheckResults, RequestOutcome};
use crate::error::{LoadError, LoadResult};
use crate::metrics::{MetricsTracker, RunSummary};
use crate::stages::StageSchedule;
use crate::thresholds::{evaluate_thresholds, ThresholdReport};

const DATA_PATH: &str = "/api/data";
const READY_PATH: &str = "/readyz";
const VERBOSE_BODY_CHARS: usize = 200;

/// Outcome of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub thresholds: ThresholdReport,
    /// VUs that had to be aborted after the graceful stop window
    pub aborted_vus: usize,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.thresholds.all_passed()
    }
}

/// State shared by every virtual user
struct VuContext {
    client: Client,
    url: String,
    tracker: MetricsTracker,
    max_response_time: Duration,
    verbose: bool,
}

struct VirtualUser {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl VirtualUser {
    fn spawn(ctx: Arc<VuContext>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = tokio::spawn(async move {
            while !flag.load(Ordering::Relaxed) {
                let outcome = send_request(&ctx.client, &ctx.url).await;
                let checks = CheckResults::evaluate(&outcome, ctx.max_response_time);
                if ctx.verbose && !checks.passed() {
                    log_failure(&outcome);
                }
                ctx.tracker.record(&outcome, &checks).await;
            }
        });
        Self { stop, handle }
    }

    /// Ask the VU to stop after its in-flight request
    fn signal_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Growable pool of looping VUs
struct VuPool {
    ctx: Arc<VuContext>,
    active: Vec<VirtualUser>,
    retiring: Vec<VirtualUser>,
}

impl VuPool {
    fn new(ctx: Arc<VuContext>) -> Self {
        Self {
            ctx,
            active: Vec::new(),
            retiring: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.active.len()
    }

    fn resize(&mut self, target: usize) {
        while self.active.len() < target {
            self.active.push(VirtualUser::spawn(self.ctx.clone()));
        }
        while self.active.len() > target {
            if let Some(vu) = self.active.pop() {
                vu.signal_stop();
                self.retiring.push(vu);
            }
        }
        self.retiring.retain(|vu| !vu.handle.is_finished());
    }

    /// Stop everyone, wait up to `grace`, abort stragglers; returns the
    /// number aborted
    async fn shutdown(self, grace: Duration) -> usize {
        let all: Vec<VirtualUser> = self.active.into_iter().chain(self.retiring).collect();
        for vu in &all {
            vu.signal_stop();
        }

        let deadline = Instant::now() + grace;
        let mut aborted = 0;
        for mut vu in all {
            if tokio::time::timeout_at(deadline, &mut vu.handle).await.is_err() {
                vu.handle.abort();
                aborted += 1;
            }
        }
        aborted
    }
}

async fn send_request(client: &Client, url: &str) -> RequestOutcome {
    let start = Instant::now();
    let response = match client.get(url).header(ACCEPT, "application/json").send().await {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, "request failed before a response arrived");
            return RequestOutcome::transport_failure(start.elapsed());
        }
    };

    let status = response.status().as_u16();
    // A body cut short by the client timeout counts as a transport failure
    match response.text().await {
        Ok(body) => RequestOutcome {
            status: Some(status),
            duration: start.elapsed(),
            body: Some(body),
        },
        Err(e) => {
            debug!(status, error = %e, "response body could not be read");
            RequestOutcome::transport_failure(start.elapsed())
        }
    }
}

fn log_failure(outcome: &RequestOutcome) {
    let body: String = outcome
        .body
        .as_deref()
        .unwrap_or("")
        .chars()
        .take(VERBOSE_BODY_CHARS)
        .collect();
    warn!(
        status = outcome.status.map(i64::from).unwrap_or(-1),
        duration_ms = outcome.duration.as_millis() as u64,
        body = %body,
        "Request failed"
    );
}

/// Drives one load test run against a base URL
pub struct LoadRunner {
    config: LoadgenConfig,
    client: Client,
    schedule: StageSchedule,
    tracker: MetricsTracker,
}

impl LoadRunner {
    pub fn new(config: LoadgenConfig) -> LoadResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let schedule = StageSchedule::new(config.stages.clone());
        Ok(Self {
            config,
            client,
            schedule,
            tracker: MetricsTracker::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Refuse to start unless the readiness probe answers 200
    pub async fn preflight(&self) -> LoadResult<()> {
        let url = self.url(READY_PATH);
        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(LoadError::NotReady { url, status });
        }
        info!("Pre-flight readiness check passed: {}", url);
        Ok(())
    }

    pub async fn run(self) -> LoadResult<RunReport> {
        self.preflight().await?;

        let total = self.schedule.total_duration();
        info!(
            base_url = %self.config.base_url,
            stages = self.schedule.stages().len(),
            duration = %humantime::format_duration(total),
            "Starting load test"
        );

        let ctx = Arc::new(VuContext {
            client: self.client.clone(),
            url: self.url(DATA_PATH),
            tracker: self.tracker.clone(),
            max_response_time: self.config.max_response_time,
            verbose: self.config.verbose,
        });
        let mut pool = VuPool::new(ctx);

        let start = Instant::now();
        let mut ticker = interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut current_stage = None;

        loop {
            ticker.tick().await;
            let elapsed = start.elapsed();
            if elapsed >= total {
                break;
            }

            let stage = self.schedule.stage_index_at(elapsed);
            if stage != current_stage {
                if let Some(index) = stage {
                    let config = &self.schedule.stages()[index];
                    info!(
                        "Stage {}/{}: ramping to {} VUs over {}",
                        index + 1,
                        self.schedule.stages().len(),
                        config.target,
                        humantime::format_duration(config.duration)
                    );
                }
                current_stage = stage;
            }

            let target = self.schedule.target_at(elapsed) as usize;
            pool.resize(target);
            debug!(
                vus = pool.len(),
                requests = self.tracker.total_requests(),
                "tick"
            );
        }

        info!(
            "All stages complete, waiting up to {:?} for in-flight requests",
            self.config.graceful_stop
        );
        let aborted_vus = pool.shutdown(self.config.graceful_stop).await;
        if aborted_vus > 0 {
            warn!("Aborted {} VUs still running after graceful stop", aborted_vus);
        }

        let summary = self.tracker.summary(start.elapsed()).await;
        let thresholds = evaluate_thresholds(&summary, &self.config.thresholds);

        Ok(RunReport {
            summary,
            thresholds,
            aborted_vus,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessor_config::StageConfig;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn quick_config(base_url: String) -> LoadgenConfig {
        LoadgenConfig {
            base_url,
            stages: vec![
                StageConfig::new(Duration::from_millis(300), 4),
                StageConfig::new(Duration::from_millis(200), 0),
            ],
            tick_interval: Duration::from_millis(50),
            graceful_stop: Duration::from_secs(2),
            ..LoadgenConfig::default()
        }
    }

    #[tokio::test]
    async fn test_preflight_aborts_when_not_ready() {
        let hits = Arc::new(AtomicUsize::new(0));
        let data_hits = hits.clone();
        let app = Router::new()
            .route(
                "/readyz",
                get(|| async {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        Json(json!({"status": "not ready", "error": "DB not connected"})),
                    )
                }),
            )
            .route(
                "/api/data",
                get(move || {
                    data_hits.fetch_add(1, Ordering::SeqCst);
                    async { "unexpected" }
                }),
            );
        let base_url = serve(app).await;

        let result = LoadRunner::new(quick_config(base_url)).unwrap().run().await;
        assert!(matches!(result, Err(LoadError::NotReady { status: 503, .. })));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_against_healthy_service() {
        let app = Router::new()
            .route("/readyz", get(|| async { Json(json!({"status": "ready"})) }))
            .route(
                "/api/data",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Json(json!({"status": "success", "writes": [], "reads": []}))
                }),
            );
        let base_url = serve(app).await;

        let report = LoadRunner::new(quick_config(base_url)).unwrap().run().await.unwrap();
        assert!(report.summary.total_requests > 0);
        assert_eq!(report.summary.failed_requests, 0);
        assert_eq!(report.aborted_vus, 0);
        assert!(report.passed(), "{}", report.thresholds);
    }

    #[tokio::test]
    async fn test_run_fails_thresholds_on_errors() {
        let app = Router::new()
            .route("/readyz", get(|| async { "ok" }))
            .route(
                "/api/data",
                get(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"status": "error", "message": "boom"})),
                    )
                }),
            );
        let base_url = serve(app).await;

        let report = LoadRunner::new(quick_config(base_url)).unwrap().run().await.unwrap();
        assert!(report.summary.total_requests > 0);
        assert_eq!(report.summary.error_rate, 1.0);
        assert_eq!(report.summary.http_req_failed, 1.0);
        assert!(!report.passed());
    }

    #[tokio::test]
    async fn test_body_timeout_counts_as_transport_failure() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Headers promise more body than is ever sent
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let head = b"HTTP/1.1 200 OK\r\n\
                content-type: application/json\r\n\
                content-length: 100\r\n\r\n";
            socket.write_all(head).await.unwrap();
            socket.write_all(b"{\"status\"").await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = Client::builder().timeout(Duration::from_millis(200)).build().unwrap();
        let outcome = send_request(&client, &format!("http://{}{}", addr, DATA_PATH)).await;

        assert_eq!(outcome.status, None);
        assert!(outcome.body.is_none());
        assert!(outcome.http_failed());
        assert!(!CheckResults::evaluate(&outcome, Duration::from_secs(2)).passed());
    }
}

// src/lambda/mod.rs

//! AWS Lambda handlers.
//!
//! - [`crawl_handler`]: scheduled trigger, runs the write pipeline
//! - [`fulfillment_handler`]: conversational webhook, answers one turn
//!
//! Both share a [`LambdaState`] built once per container.

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde_json::{Value, json};
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::fulfillment::{self, WebhookRequest};
use crate::models::Config;
use crate::pipeline::{CrawlSummary, run_crawler};
use crate::storage::s3::S3Storage;
use crate::storage::{CaseRepository, JsonDocumentStore, StoreOutcome};
use crate::utils::http::HttpSource;

/// Handles shared by every invocation of a Lambda container.
pub struct LambdaState {
    pub config: Config,
    pub source: HttpSource,
    pub repository: CaseRepository,
}

impl LambdaState {
    /// Build configuration, HTTP client and S3-backed repository from the environment.
    pub async fn from_env() -> Result<Self> {
        let config = load_lambda_config();
        config.validate()?;

        let source = HttpSource::from_config(&config.crawler)?;
        let storage = S3Storage::from_env().await?;
        let repository = CaseRepository::new(JsonDocumentStore::new(storage));

        Ok(Self {
            config,
            source,
            repository,
        })
    }
}

/// Scheduled crawl handler.
#[instrument(skip(state, event))]
pub async fn crawl_handler(
    state: &LambdaState,
    event: LambdaEvent<Value>,
) -> std::result::Result<Value, LambdaError> {
    let start = std::time::Instant::now();
    info!("Handling crawl event: {:?}", event.payload);

    let result = run_crawler(&state.source, &state.config.site, &state.repository).await;
    crawl_response(result, start.elapsed().as_millis() as u64)
}

/// Success body for a finished crawl; failures fail the invocation.
fn crawl_response(
    result: Result<CrawlSummary>,
    elapsed_ms: u64,
) -> std::result::Result<Value, LambdaError> {
    match result {
        Ok(summary) => {
            info!("Crawl completed in {}ms: {:?}", elapsed_ms, summary);
            Ok(summary_body(&summary, elapsed_ms))
        }
        Err(e) => {
            error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Conversational webhook handler.
///
/// Accepts the webhook request directly or wrapped in an API Gateway proxy
/// event, and answers in the same shape.
#[instrument(skip(state, event))]
pub async fn fulfillment_handler(
    state: &LambdaState,
    event: LambdaEvent<Value>,
) -> std::result::Result<Value, LambdaError> {
    let (payload, _context) = event.into_parts();
    let proxied = payload.get("body").and_then(Value::as_str).map(str::to_owned);

    let request: WebhookRequest = match &proxied {
        Some(body) => serde_json::from_str(body)?,
        None => serde_json::from_value(payload)?,
    };

    let site = &state.config.site;
    let result = fulfillment::fulfill(&state.repository, &request, site.today(), &site.origin).await;

    match (result, proxied.is_some()) {
        (Ok(body), true) => Ok(proxy_response(200, &body)),
        (Ok(body), false) => Ok(body),
        (Err(e), true) => {
            error!("Fulfillment failed: {}", e);
            Ok(proxy_response(500, &json!({ "error": e.to_string() })))
        }
        (Err(e), false) => {
            error!("Fulfillment failed: {}", e);
            Err(e.into())
        }
    }
}

fn summary_body(summary: &CrawlSummary, elapsed_ms: u64) -> Value {
    match summary {
        CrawlSummary::NothingToDo => json!({
            "status": "success",
            "stored": false,
            "execution_time_ms": elapsed_ms,
        }),
        CrawlSummary::Completed { link, outcome } => {
            let (stored, categories, total) = match outcome {
                StoreOutcome::Stored {
                    categories, total, ..
                } => (true, Some(*categories), Some(*total)),
                StoreOutcome::AlreadyStored { .. } => (false, None, None),
            };
            json!({
                "status": "success",
                "date": link.date,
                "href": link.href,
                "stored": stored,
                "categories": categories,
                "total": total,
                "execution_time_ms": elapsed_ms,
            })
        }
    }
}

fn proxy_response(status: u16, body: &Value) -> Value {
    json!({
        "statusCode": status,
        "headers": { "Content-Type": "application/json; charset=utf-8" },
        "body": body.to_string(),
    })
}

/// Load configuration suitable for Lambda environment.
fn load_lambda_config() -> Config {
    // In Lambda, use environment variables or defaults
    let mut config = Config::default();

    if let Ok(timeout) = std::env::var("CRAWL_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse() {
            config.crawler.timeout_secs = secs;
        }
    }

    if let Ok(origin) = std::env::var("SITE_ORIGIN") {
        config.site.origin = origin;
    }

    if let Ok(offset) = std::env::var("SITE_UTC_OFFSET_HOURS") {
        if let Ok(hours) = offset.parse() {
            config.site.utc_offset_hours = hours;
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{Link, link_key};

    #[test]
    fn test_summary_body_stored() {
        let summary = CrawlSummary::Completed {
            link: Link::new("t", "/stf/newpage_1.html", 20200305),
            outcome: StoreOutcome::Stored {
                key: link_key(20200305),
                categories: 2,
                total: 10,
            },
        };
        let body = summary_body(&summary, 12);
        assert_eq!(body["stored"], true);
        assert_eq!(body["total"], 10);
        assert_eq!(body["date"], 20200305);
    }

    #[test]
    fn test_summary_body_nothing_to_do() {
        let body = summary_body(&CrawlSummary::NothingToDo, 3);
        assert_eq!(body["status"], "success");
        assert_eq!(body["stored"], false);
    }

    #[test]
    fn test_crawl_failure_fails_invocation() {
        let result = Err(AppError::Status {
            url: "https://www.mhlw.go.jp/stf/houdou/houdou_list_202003.html".to_string(),
            status: 500,
        });
        let err = crawl_response(result, 5).unwrap_err();
        assert!(err.to_string().contains("HTTP status 500"));

        let body = crawl_response(Ok(CrawlSummary::NothingToDo), 5).unwrap();
        assert_eq!(body["status"], "success");
    }

    #[test]
    fn test_proxy_response_wraps_body() {
        let response = proxy_response(200, &json!({ "fulfillmentText": "hi" }));
        assert_eq!(response["statusCode"], 200);
        let body: Value = serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
        assert_eq!(body["fulfillmentText"], "hi");
    }
}

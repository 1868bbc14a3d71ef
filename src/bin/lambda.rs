//! AWS Lambda entry point for the scheduled crawl.
//!
//! Deploy with `cargo lambda build --release --features lambda`.

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use mhlw_cases::lambda::{LambdaState, crawl_handler};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("mhlw-cases crawl Lambda starting...");

    let state = LambdaState::from_env().await?;
    let state = &state;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        crawl_handler(state, event).await
    }))
    .await
}

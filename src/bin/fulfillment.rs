//! AWS Lambda entry point for the conversational webhook.

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use mhlw_cases::lambda::{LambdaState, fulfillment_handler};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("mhlw-cases fulfillment Lambda starting...");

    let state = LambdaState::from_env().await?;
    let state = &state;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        fulfillment_handler(state, event).await
    }))
    .await
}

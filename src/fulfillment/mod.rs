//! Voice-assistant fulfillment.
//!
//! - `phrase`: relative date phrasing
//! - `messages`: wording per locale
//! - `response`: reply decision and repository lookups
//! - `webhook`: Dialogflow request/response mapping

pub mod messages;
pub mod phrase;
pub mod response;
pub mod webhook;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::Result;
use crate::storage::CaseRepository;

pub use messages::Locale;
pub use phrase::date_phrase;
pub use response::{Card, Facts, Intent, LinkButton, Reply, ReplyItem, Turn, compose, respond};
pub use webhook::{WebhookRequest, render};

/// Answer one webhook request with a webhook response body.
pub async fn fulfill(
    repository: &CaseRepository,
    request: &WebhookRequest,
    today: NaiveDate,
    origin: &str,
) -> Result<Value> {
    let turn = request.to_turn();
    log::info!("Fulfilling {:?} ({:?})", turn.intent, turn.locale);
    let reply = respond(repository, &turn, today, origin).await?;
    Ok(render(&reply))
}

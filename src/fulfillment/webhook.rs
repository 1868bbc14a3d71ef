//! Dialogflow webhook adapter.
//!
//! Parses a Dialogflow v2 webhook request into a [`Turn`] and renders a
//! [`Reply`] as an Actions on Google rich response.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::messages::Locale;
use super::response::{Intent, LinkButton, Reply, ReplyItem, Turn};

pub const WELCOME_INTENT: &str = "Default Welcome Intent";
pub const CATEGORY_INTENT: &str = "prefecture";
pub const HELP_INTENT: &str = "help";
pub const END_INTENT: &str = "end";

/// Slot carrying the category name.
pub const CATEGORY_PARAMETER: &str = "prefecture";

const SCREEN_CAPABILITY: &str = "actions.capability.SCREEN_OUTPUT";
const WEB_BROWSER_CAPABILITY: &str = "actions.capability.WEB_BROWSER";

/// Incoming webhook request, reduced to the fields the fulfillment reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub query_result: QueryResult,
    #[serde(default)]
    pub original_detect_intent_request: Option<OriginalRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub intent: IntentInfo,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub language_code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentInfo {
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OriginalRequest {
    #[serde(default)]
    pub payload: AssistantPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantPayload {
    #[serde(default)]
    pub user: Option<AssistantUser>,
    #[serde(default)]
    pub surface: Option<Surface>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantUser {
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Surface {
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Capability {
    pub name: String,
}

impl WebhookRequest {
    fn payload(&self) -> Option<&AssistantPayload> {
        self.original_detect_intent_request
            .as_ref()
            .map(|request| &request.payload)
    }

    fn has_capability(&self, name: &str) -> bool {
        self.payload()
            .and_then(|payload| payload.surface.as_ref())
            .is_some_and(|surface| surface.capabilities.iter().any(|c| c.name == name))
    }

    /// Category named by the user, if any.
    pub fn category(&self) -> Option<String> {
        match self.query_result.parameters.get(CATEGORY_PARAMETER)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// Locale of the user, falling back to the query language.
    pub fn locale(&self) -> Locale {
        let tag = self
            .payload()
            .and_then(|payload| payload.user.as_ref())
            .and_then(|user| user.locale.as_deref())
            .unwrap_or(self.query_result.language_code.as_str());
        Locale::from_tag(tag)
    }

    /// Convert the request into a conversational turn.
    pub fn to_turn(&self) -> Turn {
        let intent = match self.query_result.intent.display_name.as_str() {
            WELCOME_INTENT => Intent::Welcome,
            CATEGORY_INTENT => Intent::Category(self.category()),
            HELP_INTENT => Intent::Help,
            END_INTENT => Intent::End,
            other => Intent::Unknown(other.to_string()),
        };

        Turn {
            intent,
            locale: self.locale(),
            screen: self.has_capability(SCREEN_CAPABILITY),
            web_browser: self.has_capability(WEB_BROWSER_CAPABILITY),
        }
    }
}

/// Render a reply as a webhook response body.
pub fn render(reply: &Reply) -> Value {
    let items: Vec<Value> = reply.items.iter().map(render_item).collect();

    json!({
        "fulfillmentText": reply.speech(),
        "payload": {
            "google": {
                "expectUserResponse": !reply.close,
                "richResponse": { "items": items }
            }
        }
    })
}

fn render_item(item: &ReplyItem) -> Value {
    match item {
        ReplyItem::Speech { speech, text } => {
            let mut simple = json!({ "textToSpeech": speech });
            if let Some(text) = text {
                simple["displayText"] = json!(text);
            }
            json!({ "simpleResponse": simple })
        }
        ReplyItem::Card(card) => {
            let buttons: Vec<Value> = card.button.iter().map(render_button).collect();
            json!({
                "basicCard": {
                    "title": card.title,
                    "subtitle": card.subtitle,
                    "formattedText": card.text,
                    "buttons": buttons
                }
            })
        }
        ReplyItem::Carousel(items) => {
            let items: Vec<Value> = items.iter().map(render_button).collect();
            json!({ "carouselBrowse": { "items": items } })
        }
    }
}

fn render_button(button: &LinkButton) -> Value {
    json!({
        "title": button.title,
        "openUrlAction": { "url": button.url }
    })
}

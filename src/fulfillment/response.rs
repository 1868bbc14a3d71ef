//! Conversation responses.
//!
//! [`compose`] is a pure decision over the turn (intent, locale, surface
//! capabilities) and the stored facts; [`respond`] gathers the facts from the
//! repository first.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::Link;
use crate::storage::CaseRepository;

use super::messages::{Catalog, Locale, fill};
use super::phrase::date_phrase;

const COVID_PAGE_PATH: &str = "/stf/seisakunitsuite/bunya/0000164708_00001.html";
const PRESS_INDEX_PATH: &str = "/stf/houdou/index.html";
const TOP_PAGE_PATH: &str = "/index.html";
const ENGLISH_SITE_PATH: &str = "/english";

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Conversation start: report the national total
    Welcome,
    /// Case count for a category, if the user named one
    Category(Option<String>),
    Help,
    End,
    /// Any intent this fulfillment does not handle
    Unknown(String),
}

/// One conversational turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub intent: Intent,
    pub locale: Locale,
    /// Device can display cards
    pub screen: bool,
    /// Device can open web pages
    pub web_browser: bool,
}

/// Stored data relevant to a turn.
#[derive(Debug, Clone, Default)]
pub struct Facts {
    pub latest: Option<Link>,
    pub total: Option<u64>,
    pub count: Option<u64>,
}

/// A titled URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub title: String,
    pub url: String,
}

/// Card shown on devices with a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub subtitle: String,
    pub text: String,
    pub button: Option<LinkButton>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyItem {
    /// Spoken text, with an optional shorter display text
    Speech { speech: String, text: Option<String> },
    Card(Card),
    Carousel(Vec<LinkButton>),
}

/// Response to a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub items: Vec<ReplyItem>,
    /// Ends the conversation when set
    pub close: bool,
}

impl Reply {
    fn ask() -> Self {
        Self {
            items: Vec::new(),
            close: false,
        }
    }

    fn close() -> Self {
        Self {
            items: Vec::new(),
            close: true,
        }
    }

    fn say(mut self, speech: impl Into<String>) -> Self {
        self.items.push(ReplyItem::Speech {
            speech: speech.into(),
            text: None,
        });
        self
    }

    fn say_with_text(mut self, speech: impl Into<String>, text: impl Into<String>) -> Self {
        self.items.push(ReplyItem::Speech {
            speech: speech.into(),
            text: Some(text.into()),
        });
        self
    }

    fn card(mut self, card: Card) -> Self {
        self.items.push(ReplyItem::Card(card));
        self
    }

    fn carousel(mut self, items: Vec<LinkButton>) -> Self {
        self.items.push(ReplyItem::Carousel(items));
        self
    }

    /// All spoken text, in order.
    pub fn speech(&self) -> String {
        self.items
            .iter()
            .filter_map(|item| match item {
                ReplyItem::Speech { speech, .. } => Some(speech.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Decide the reply for `turn` given the stored `facts`.
pub fn compose(turn: &Turn, facts: &Facts, today: NaiveDate, origin: &str) -> Reply {
    let catalog = turn.locale.catalog();
    let origin = origin.trim_end_matches('/');

    match &turn.intent {
        Intent::Welcome => welcome(turn, facts, today, origin, catalog),
        Intent::Category(None) => Reply::ask().say(catalog.category_prompt),
        Intent::Category(Some(category)) => {
            category_count(turn, facts, category, today, origin, catalog)
        }
        Intent::Help | Intent::Unknown(_) => Reply::ask().say(catalog.help),
        Intent::End => farewell(turn, origin, catalog),
    }
}

fn welcome(turn: &Turn, facts: &Facts, today: NaiveDate, origin: &str, catalog: &Catalog) -> Reply {
    let (Some(link), Some(total)) = (&facts.latest, facts.total.filter(|&total| total > 0)) else {
        return Reply::close().say(catalog.welcome_no_information);
    };

    let date = phrase_for(link, today, turn.locale);
    let count = total.to_string();
    let params = [("date", date.as_str()), ("count", count.as_str())];
    let speech = fill(catalog.welcome_speech, &params);
    let card = |url: String| Card {
        title: fill(catalog.welcome_card_title, &params),
        subtitle: fill(catalog.welcome_card_subtitle, &params),
        text: catalog.welcome_card_text.to_string(),
        button: Some(LinkButton {
            title: catalog.welcome_card_button.to_string(),
            url,
        }),
    };

    match (turn.locale, turn.screen) {
        (Locale::English, true) => Reply::close()
            .say_with_text(speech, catalog.welcome_text)
            .card(card(format!("{origin}{ENGLISH_SITE_PATH}")))
            .say(format!("{}{}", catalog.end_thanks, catalog.end_advice)),
        (Locale::English, false) => Reply::close()
            .say(speech)
            .say(format!("{}{}", catalog.end_thanks, catalog.end_advice)),
        (Locale::Japanese, true) => Reply::ask()
            .say_with_text(speech, catalog.welcome_text)
            .card(card(link.url(origin)))
            .say(catalog.welcome_ask),
        (Locale::Japanese, false) => Reply::ask().say(format!("{speech}{}", catalog.welcome_ask)),
    }
}

fn category_count(
    turn: &Turn,
    facts: &Facts,
    category: &str,
    today: NaiveDate,
    origin: &str,
    catalog: &Catalog,
) -> Reply {
    let Some(link) = &facts.latest else {
        return Reply::close().say(catalog.category_no_information);
    };

    let date = phrase_for(link, today, turn.locale);

    let count = match facts.count {
        Some(count) if count > 0 => count.to_string(),
        _ => {
            let params = [("date", date.as_str()), ("category", category)];
            return Reply::ask()
                .say(fill(catalog.category_none, &params))
                .say(catalog.category_ask);
        }
    };

    let params = [
        ("date", date.as_str()),
        ("category", category),
        ("count", count.as_str()),
    ];
    let speech = fill(catalog.category_speech, &params);

    if turn.screen {
        Reply::ask()
            .say_with_text(speech, fill(catalog.category_text, &params))
            .card(Card {
                title: fill(catalog.category_card_title, &params),
                subtitle: fill(catalog.category_card_subtitle, &params),
                text: fill(catalog.category_card_text, &params),
                button: Some(LinkButton {
                    title: catalog.category_card_button.to_string(),
                    url: link.url(origin),
                }),
            })
            .say(catalog.category_ask)
    } else {
        Reply::ask().say(format!("{speech}{}", catalog.category_ask))
    }
}

fn farewell(turn: &Turn, origin: &str, catalog: &Catalog) -> Reply {
    if turn.screen && turn.web_browser {
        let [covid, press, top] = catalog.end_carousel;
        Reply::close()
            .say(catalog.end_thanks)
            .carousel(vec![
                LinkButton {
                    title: covid.to_string(),
                    url: format!("{origin}{COVID_PAGE_PATH}"),
                },
                LinkButton {
                    title: press.to_string(),
                    url: format!("{origin}{PRESS_INDEX_PATH}"),
                },
                LinkButton {
                    title: top.to_string(),
                    url: format!("{origin}{TOP_PAGE_PATH}"),
                },
            ])
            .say(catalog.end_advice)
    } else {
        Reply::close().say(format!("{}{}", catalog.end_thanks, catalog.end_advice))
    }
}

fn phrase_for(link: &Link, today: NaiveDate, locale: Locale) -> String {
    match link.published_on() {
        Some(date) => date_phrase(date, today, locale),
        None => link.date.to_string(),
    }
}

/// Look up the facts a turn needs and compose the reply.
pub async fn respond(
    repository: &CaseRepository,
    turn: &Turn,
    today: NaiveDate,
    origin: &str,
) -> Result<Reply> {
    let mut facts = Facts::default();

    match &turn.intent {
        Intent::Welcome => {
            facts.latest = repository.fetch_latest_link().await?;
            if let Some(link) = &facts.latest {
                facts.total = repository.fetch_total(link).await?;
            }
        }
        Intent::Category(Some(category)) => {
            facts.latest = repository.fetch_latest_link().await?;
            if let Some(link) = &facts.latest {
                facts.count = repository.fetch_category_count(link, category).await?;
            }
        }
        _ => {}
    }

    log::debug!("Turn {:?} with facts {:?}", turn.intent, facts);
    Ok(compose(turn, &facts, today, origin))
}

//! Response wording per locale.
//!
//! Templates use named placeholders (`{date}`, `{count}`, `{category}`) so
//! each language can order them freely.

/// Supported response languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Japanese,
    English,
}

impl Locale {
    /// Resolve a BCP 47 tag. Only `en-US` selects English.
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("en-US") {
            Locale::English
        } else {
            Locale::Japanese
        }
    }

    pub fn catalog(self) -> &'static Catalog {
        match self {
            Locale::Japanese => &JA_JP,
            Locale::English => &EN_US,
        }
    }
}

/// Message templates for one locale.
#[derive(Debug)]
pub struct Catalog {
    pub date_long: &'static str,
    pub date_short: &'static str,
    pub today: &'static str,

    pub welcome_speech: &'static str,
    pub welcome_text: &'static str,
    pub welcome_card_title: &'static str,
    pub welcome_card_subtitle: &'static str,
    pub welcome_card_text: &'static str,
    pub welcome_card_button: &'static str,
    pub welcome_ask: &'static str,
    pub welcome_no_information: &'static str,

    pub category_speech: &'static str,
    pub category_text: &'static str,
    pub category_card_title: &'static str,
    pub category_card_subtitle: &'static str,
    pub category_card_text: &'static str,
    pub category_card_button: &'static str,
    pub category_none: &'static str,
    pub category_prompt: &'static str,
    pub category_ask: &'static str,
    pub category_no_information: &'static str,

    pub help: &'static str,

    pub end_thanks: &'static str,
    pub end_advice: &'static str,
    pub end_carousel: [&'static str; 3],
}

static JA_JP: Catalog = Catalog {
    date_long: "%Y年%-m月%-d日",
    date_short: "%-m月%-d日",
    today: "本日",

    welcome_speech: "{date}時点の国内の感染者数は{count}人です。",
    welcome_text: "最新の感染者数をお知らせします。",
    welcome_card_title: "国内の感染者数 {count}人",
    welcome_card_subtitle: "{date}時点",
    welcome_card_text: "厚生労働省の報道発表資料をもとに集計しています。",
    welcome_card_button: "報道発表資料を見る",
    welcome_ask: "都道府県名を言うと、その都道府県の感染者数をお伝えします。",
    welcome_no_information: "申し訳ありません。現在、感染者数の情報を取得できていません。",

    category_speech: "{date}時点の{category}の感染者数は{count}人です。",
    category_text: "{category}の感染者数をお知らせします。",
    category_card_title: "{category}の感染者数 {count}人",
    category_card_subtitle: "{date}時点",
    category_card_text: "{category}の感染者数は厚生労働省の報道発表資料をもとに集計しています。",
    category_card_button: "報道発表資料を見る",
    category_none: "{date}時点で、{category}の感染者は報告されていません。",
    category_prompt: "どの都道府県の感染者数を知りたいですか？",
    category_ask: "他に知りたい都道府県はありますか？",
    category_no_information: "申し訳ありません。現在、感染者数の情報を取得できていません。",

    help: "都道府県名を言うと、厚生労働省が発表している最新の感染者数をお伝えします。どの都道府県について知りたいですか？",

    end_thanks: "ご利用ありがとうございました。",
    end_advice: "手洗いと咳エチケットを心がけましょう。",
    end_carousel: [
        "新型コロナウイルス感染症について",
        "報道発表資料",
        "厚生労働省",
    ],
};

static EN_US: Catalog = Catalog {
    date_long: "%B %-d, %Y",
    date_short: "%B %-d",
    today: "today, ",

    welcome_speech: "There are {count} confirmed cases in Japan as of {date}.",
    welcome_text: "Here is the latest case count.",
    welcome_card_title: "{count} cases in Japan",
    welcome_card_subtitle: "As of {date}",
    welcome_card_text: "Counted from the press releases of the Ministry of Health, Labour and Welfare.",
    welcome_card_button: "Visit the ministry's English site",
    welcome_ask: "Tell me a prefecture to hear its case count.",
    welcome_no_information: "Sorry, case information is not available right now.",

    category_speech: "As of {date}, {category} has {count} confirmed cases.",
    category_text: "Here is the case count for {category}.",
    category_card_title: "{count} cases in {category}",
    category_card_subtitle: "As of {date}",
    category_card_text: "The count for {category} is taken from the ministry's press release.",
    category_card_button: "Read the press release",
    category_none: "No cases have been recorded for {category} as of {date}.",
    category_prompt: "Which prefecture would you like to know about?",
    category_ask: "Is there another prefecture you would like to know about?",
    category_no_information: "Sorry, case information is not available right now.",

    help: "Tell me a prefecture and I will read the latest case count published by the Ministry of Health, Labour and Welfare. Which prefecture would you like to know about?",

    end_thanks: "Thank you for using this service.",
    end_advice: "Please remember to wash your hands.",
    end_carousel: [
        "About COVID-19",
        "Press releases",
        "Ministry of Health, Labour and Welfare",
    ],
};

/// Substitute `{name}` placeholders in `template` in a single pass.
///
/// Substituted values are never rescanned. Unknown placeholders are kept.
pub fn fill(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail.find('}').and_then(|close| {
            let name = &tail[1..close];
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

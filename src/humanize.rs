//! Human-facing formatting: publication dates and reading time.
//!
//! Dates follow the `dd LLL yyyy` pattern lower-cased (`15 mar 2021`), and
//! are always rendered in UTC so a build produces the same HTML regardless
//! of the machine's timezone.
//!
//! Reading time is the total word count of a post (section headings plus
//! body text) divided by a words-per-minute rate, rounded up.

use crate::types::ContentSection;
use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Display language for dates and the fixed UI strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en")]
    En,
}

/// Fixed UI strings for one locale.
#[derive(Debug)]
pub struct Labels {
    pub html_lang: &'static str,
    pub load_more: &'static str,
    pub previous_post: &'static str,
    pub next_post: &'static str,
    pub minutes: &'static str,
    pub edited_on: &'static str,
    pub at: &'static str,
    pub not_found: &'static str,
    pub back_home: &'static str,
    pub preview: &'static str,
    pub no_posts: &'static str,
}

const PT_BR_LABELS: Labels = Labels {
    html_lang: "pt-BR",
    load_more: "Carregar mais posts",
    previous_post: "Post anterior",
    next_post: "Próximo post",
    minutes: "min",
    edited_on: "editado em",
    at: "às",
    not_found: "Post não encontrado",
    back_home: "Voltar para o início",
    preview: "Modo preview",
    no_posts: "Nenhum post publicado ainda.",
};

const EN_LABELS: Labels = Labels {
    html_lang: "en",
    load_more: "Load more posts",
    previous_post: "Previous post",
    next_post: "Next post",
    minutes: "min",
    edited_on: "edited on",
    at: "at",
    not_found: "Post not found",
    back_home: "Back to the home page",
    preview: "Preview mode",
    no_posts: "No posts published yet.",
};

const PT_BR_MONTHS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

const EN_MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

impl Locale {
    /// Lower-case abbreviated month name, `month` is 1-based.
    pub fn month_abbr(self, month: u32) -> &'static str {
        let months = match self {
            Locale::PtBr => &PT_BR_MONTHS,
            Locale::En => &EN_MONTHS,
        };
        let idx = (month.clamp(1, 12) - 1) as usize;
        months[idx]
    }

    pub fn labels(self) -> &'static Labels {
        match self {
            Locale::PtBr => &PT_BR_LABELS,
            Locale::En => &EN_LABELS,
        }
    }
}

/// Parse a CMS timestamp.
///
/// Prismic emits `2021-03-25T19:25:28+0000` (offset without a colon), which
/// is not valid RFC 3339, so that pattern is tried first.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::<FixedOffset>::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `15 mar 2021`
pub fn format_date(dt: &DateTime<Utc>, locale: Locale) -> String {
    format!(
        "{:02} {} {}",
        dt.day(),
        locale.month_abbr(dt.month()),
        dt.year()
    )
}

/// `* editado em 19 mar 2021, às 15:49`
pub fn format_edited(dt: &DateTime<Utc>, locale: Locale) -> String {
    let labels = locale.labels();
    format!(
        "* {} {}, {} {:02}:{:02}",
        labels.edited_on,
        format_date(dt, locale),
        labels.at,
        dt.hour(),
        dt.minute()
    )
}

/// Count words across every section's heading and body text.
pub fn count_words(content: &[ContentSection]) -> usize {
    content
        .iter()
        .map(|section| {
            let heading = section
                .heading
                .as_deref()
                .map(|h| h.split_whitespace().count())
                .unwrap_or(0);
            let body: usize = section
                .body
                .iter()
                .map(|block| block.text().split_whitespace().count())
                .sum();
            heading + body
        })
        .sum()
}

/// Minutes needed to read `words` at `words_per_minute`, rounded up.
pub fn reading_time(words: usize, words_per_minute: u32) -> u32 {
    let wpm = words_per_minute.max(1) as usize;
    words.div_ceil(wpm) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::{RichTextBlock, TextBlock};
    use chrono::TimeZone;

    fn paragraph(text: &str) -> RichTextBlock {
        RichTextBlock::Paragraph(TextBlock {
            text: text.to_string(),
            spans: vec![],
        })
    }

    #[test]
    fn parses_prismic_offset_without_colon() {
        let dt = parse_timestamp("2021-03-25T19:25:28+0000").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap());
    }

    #[test]
    fn parses_rfc3339() {
        let dt = parse_timestamp("2021-03-25T22:25:28+03:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap());
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn formats_date_pt_br() {
        let dt = Utc.with_ymd_and_hms(2021, 3, 5, 10, 0, 0).unwrap();
        assert_eq!(format_date(&dt, Locale::PtBr), "05 mar 2021");
        let dt = Utc.with_ymd_and_hms(2021, 2, 15, 10, 0, 0).unwrap();
        assert_eq!(format_date(&dt, Locale::PtBr), "15 fev 2021");
    }

    #[test]
    fn formats_date_en() {
        let dt = Utc.with_ymd_and_hms(2020, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(format_date(&dt, Locale::En), "31 dec 2020");
    }

    #[test]
    fn formats_edited_line() {
        let dt = Utc.with_ymd_and_hms(2021, 3, 19, 15, 49, 0).unwrap();
        assert_eq!(
            format_edited(&dt, Locale::PtBr),
            "* editado em 19 mar 2021, às 15:49"
        );
        assert_eq!(
            format_edited(&dt, Locale::En),
            "* edited on 19 mar 2021, at 15:49"
        );
    }

    #[test]
    fn month_abbr_clamps_out_of_range() {
        assert_eq!(Locale::PtBr.month_abbr(0), "jan");
        assert_eq!(Locale::PtBr.month_abbr(13), "dez");
    }

    #[test]
    fn locale_deserializes_from_tag() {
        #[derive(Deserialize)]
        struct Wrap {
            locale: Locale,
        }
        let w: Wrap = toml::from_str(r#"locale = "en""#).unwrap();
        assert_eq!(w.locale, Locale::En);
        let w: Wrap = toml::from_str(r#"locale = "pt-BR""#).unwrap();
        assert_eq!(w.locale, Locale::PtBr);
    }

    #[test]
    fn counts_heading_and_body_words() {
        let content = vec![
            ContentSection {
                heading: Some("Proin et varius".to_string()),
                body: vec![paragraph("one two three"), paragraph("four  five")],
            },
            ContentSection {
                heading: None,
                body: vec![paragraph("six")],
            },
        ];
        assert_eq!(count_words(&content), 9);
    }

    #[test]
    fn empty_content_has_no_words() {
        assert_eq!(count_words(&[]), 0);
        let content = vec![ContentSection {
            heading: Some("   ".to_string()),
            body: vec![paragraph("")],
        }];
        assert_eq!(count_words(&content), 0);
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time(0, 200), 0);
        assert_eq!(reading_time(1, 200), 1);
        assert_eq!(reading_time(200, 200), 1);
        assert_eq!(reading_time(201, 200), 2);
        assert_eq!(reading_time(850, 200), 5);
    }

    #[test]
    fn reading_time_zero_rate_is_treated_as_one() {
        assert_eq!(reading_time(3, 0), 3);
    }
}

//! CMS document model shared by the fetch and generate stages.
//!
//! These types deserialize straight from the Prismic search API and are
//! written back out unchanged into the stage 1 manifest, so the field names
//! follow the API, not Rust conventions.

use crate::richtext::RichTextBlock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A `posts` document as returned by the CMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDocument {
    pub id: String,
    /// URL slug. Documents without one cannot be routed and are dropped.
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default, with = "prismic_date")]
    pub first_publication_date: Option<DateTime<Utc>>,
    #[serde(default, with = "prismic_date")]
    pub last_publication_date: Option<DateTime<Utc>>,
    pub data: PostData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub banner: Banner,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentSection>,
}

/// Banner image. An image field left empty in the CMS arrives as `{}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Banner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// One repeatable content group: an optional heading and a rich text body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<RichTextBlock>,
}

impl PostDocument {
    pub fn uid(&self) -> &str {
        self.uid.as_deref().unwrap_or(&self.id)
    }

    /// True when the document was republished after its first publication.
    pub fn was_edited(&self) -> bool {
        match (self.first_publication_date, self.last_publication_date) {
            (Some(first), Some(last)) => last > first,
            _ => false,
        }
    }
}

/// Empty CMS fields arrive as `null`; read them as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde adapter for Prismic timestamps (`2021-03-25T19:25:28+0000`).
mod prismic_date {
    use crate::humanize::parse_timestamp;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => parse_timestamp(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DOCUMENT: &str = r#"{
        "id": "YFziMRIAACIAj3aC",
        "uid": "como-utilizar-hooks",
        "type": "posts",
        "first_publication_date": "2021-03-15T19:25:28+0000",
        "last_publication_date": "2021-03-19T15:49:00+0000",
        "data": {
            "title": "Como utilizar Hooks",
            "subtitle": "Pensando em sincronização em vez de ciclos de vida",
            "author": "Joseph Oliveira",
            "banner": {"url": "https://images.prismic.io/banner.png", "alt": null},
            "content": [
                {"heading": "Proin et varius", "body": [
                    {"type": "paragraph", "text": "Lorem ipsum dolor", "spans": []}
                ]}
            ]
        }
    }"#;

    #[test]
    fn deserializes_api_document() {
        let doc: PostDocument = serde_json::from_str(DOCUMENT).unwrap();
        assert_eq!(doc.uid(), "como-utilizar-hooks");
        assert_eq!(doc.data.author, "Joseph Oliveira");
        assert_eq!(
            doc.first_publication_date,
            Some(Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 28).unwrap())
        );
        assert_eq!(
            doc.data.banner.url.as_deref(),
            Some("https://images.prismic.io/banner.png")
        );
        assert_eq!(doc.data.content.len(), 1);
        assert!(doc.was_edited());
    }

    #[test]
    fn timestamps_survive_manifest_roundtrip() {
        let doc: PostDocument = serde_json::from_str(DOCUMENT).unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("2021-03-15T19:25:28+0000"));
        let back: PostDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn empty_banner_and_null_dates() {
        let doc: PostDocument = serde_json::from_str(
            r#"{"id": "x", "uid": null, "first_publication_date": null,
                "last_publication_date": null,
                "data": {"title": "Draft", "banner": {}}}"#,
        )
        .unwrap();
        assert_eq!(doc.uid(), "x");
        assert!(doc.data.banner.url.is_none());
        assert!(doc.data.content.is_empty());
        assert!(!doc.was_edited());
    }

    #[test]
    fn null_fields_read_as_empty() {
        let doc: PostDocument = serde_json::from_str(
            r#"{"id": "x", "uid": "x",
                "data": {"title": null, "subtitle": null, "author": null,
                         "banner": null, "content": [{"heading": null, "body": null}]}}"#,
        )
        .unwrap();
        assert_eq!(doc.data.title, "");
        assert_eq!(doc.data.author, "");
        assert!(doc.data.subtitle.is_none());
        assert!(doc.data.banner.url.is_none());
        assert_eq!(doc.data.content.len(), 1);
        assert!(doc.data.content[0].heading.is_none());
        assert!(doc.data.content[0].body.is_empty());
    }

    #[test]
    fn invalid_timestamp_is_error() {
        let result: Result<PostDocument, _> = serde_json::from_str(
            r#"{"id": "x", "first_publication_date": "soon", "data": {"title": "t"}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn same_timestamps_are_not_edited() {
        let mut doc: PostDocument = serde_json::from_str(DOCUMENT).unwrap();
        doc.last_publication_date = doc.first_publication_date;
        assert!(!doc.was_edited());
    }
}

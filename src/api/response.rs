//! Response bodies returned by the service.
//!
//! Every field is optional or defaulted: a missing key is reported by the
//! stage that needs it, not by the decoder.

use serde::Deserialize;

/// `POST /language`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageResponse {
    #[serde(default)]
    pub language_detections: Vec<LanguageDetection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageDetection {
    pub language: Option<String>,
    pub confidence: Option<f64>,
}

impl LanguageResponse {
    /// Code of the most likely language.
    pub fn top_language(&self) -> Option<&str> {
        self.language_detections
            .first()
            .and_then(|d| d.language.as_deref())
    }
}

/// `POST /categories`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Vec<Label>,
}

impl CategoriesResponse {
    /// Label of the highest ranked category.
    pub fn top_label(&self) -> Option<&str> {
        self.categories
            .first()
            .and_then(|c| c.label.as_deref())
            .filter(|l| !l.trim().is_empty())
    }
}

/// A label with optional confidence (categories, sentiment).
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub label: Option<String>,
    pub confidence: Option<f64>,
}

/// `POST /sentiment`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentimentResponse {
    pub document: Option<Label>,
    /// Entity-level sentiment, same record shape as `/entities`.
    pub entities: Option<Vec<ApiEntity>>,
}

impl SentimentResponse {
    /// Document-level sentiment label.
    pub fn document_label(&self) -> Option<&str> {
        self.document
            .as_ref()
            .and_then(|d| d.label.as_deref())
            .filter(|l| !l.trim().is_empty())
    }
}

/// `POST /entities`, also the entity part of `POST /sentiment`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntitiesResponse {
    pub entities: Option<Vec<ApiEntity>>,
}

/// One entity as returned by the service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEntity {
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub mention: Option<String>,
    pub normalized: Option<String>,
    pub count: Option<u64>,
    pub entity_id: Option<String>,
    #[serde(default)]
    pub mention_offsets: Vec<MentionOffset>,
    pub sentiment: Option<Label>,
}

impl ApiEntity {
    /// Most representative mention text: the normalized head mention when present.
    pub fn head_mention(&self) -> Option<&str> {
        self.normalized
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.mention.as_deref())
            .filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionOffset {
    pub start_offset: u64,
    pub end_offset: u64,
}

/// `POST /name-translation`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameTranslationResponse {
    pub translation: Option<String>,
    pub target_language: Option<String>,
    pub target_script: Option<String>,
    pub confidence: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_response() {
        let resp: LanguageResponse = serde_json::from_str(
            r#"{"languageDetections":[{"language":"eng","confidence":0.93},{"language":"sco","confidence":0.01}]}"#,
        )
        .unwrap();
        assert_eq!(resp.top_language(), Some("eng"));

        let empty: LanguageResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.top_language(), None);
    }

    #[test]
    fn test_categories_blank_label_is_missing() {
        let resp: CategoriesResponse =
            serde_json::from_str(r#"{"categories":[{"label":"  "}]}"#).unwrap();
        assert_eq!(resp.top_label(), None);
    }

    #[test]
    fn test_entity_record_shape() {
        let resp: EntitiesResponse = serde_json::from_str(
            r#"{"entities":[{
                "type":"PERSON","mention":"Aykroyd","normalized":"Dan Aykroyd",
                "count":2,"entityId":"Q105221",
                "mentionOffsets":[{"startOffset":21,"endOffset":32},{"startOffset":180,"endOffset":187}],
                "sentiment":{"label":"pos","confidence":0.7}
            }]}"#,
        )
        .unwrap();
        let entities = resp.entities.unwrap();
        let entity = &entities[0];
        assert_eq!(entity.head_mention(), Some("Dan Aykroyd"));
        assert_eq!(entity.entity_type.as_deref(), Some("PERSON"));
        assert_eq!(entity.mention_offsets.len(), 2);
        assert_eq!(entity.mention_offsets[1].start_offset, 180);
        assert_eq!(
            entity.sentiment.as_ref().and_then(|s| s.label.as_deref()),
            Some("pos")
        );
    }

    #[test]
    fn test_head_mention_falls_back_to_mention() {
        let entity = ApiEntity {
            mention: Some("CIA".to_string()),
            normalized: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(entity.head_mention(), Some("CIA"));
    }

    #[test]
    fn test_missing_entities_key() {
        let resp: EntitiesResponse = serde_json::from_str(r#"{"requestId":"x"}"#).unwrap();
        assert!(resp.entities.is_none());
    }
}

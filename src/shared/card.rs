//! Card Data Model
//!
//! Wire and presentation types for the shared picture-card catalog.
//!
//! The server speaks a mixed naming convention (`_id`, `imageUri`,
//! `title_ru`), preserved here through serde renames so persisted records
//! stay byte-compatible with what the server last returned. The
//! presentation [`Card`] is what consumers render after URI resolution and
//! thumbnail derivation.

use serde::{Deserialize, Serialize};

use crate::shared::config::Endpoints;

/// Fixed catalog sections. Every card belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Family,
    Actions,
    Food,
    Drinks,
    FruitsVeggies,
    Toys,
    Emotions,
    Character,
    Professions,
    Animals,
    Clothing,
    Dishes,
    Technology,
    Transport,
    Places,
    Nature,
    Holiday,
    ColorsShapes,
    School,
    Sports,
    Numbers,
    BodyParts,
}

impl Section {
    /// All sections, in catalog display order
    pub const ALL: [Section; 22] = [
        Section::Family,
        Section::Actions,
        Section::Food,
        Section::Drinks,
        Section::FruitsVeggies,
        Section::Toys,
        Section::Emotions,
        Section::Character,
        Section::Professions,
        Section::Animals,
        Section::Clothing,
        Section::Dishes,
        Section::Technology,
        Section::Transport,
        Section::Places,
        Section::Nature,
        Section::Holiday,
        Section::ColorsShapes,
        Section::School,
        Section::Sports,
        Section::Numbers,
        Section::BodyParts,
    ];

    /// Wire identifier for this section
    pub fn id(&self) -> &'static str {
        match self {
            Section::Family => "family",
            Section::Actions => "actions",
            Section::Food => "food",
            Section::Drinks => "drinks",
            Section::FruitsVeggies => "fruits_veggies",
            Section::Toys => "toys",
            Section::Emotions => "emotions",
            Section::Character => "character",
            Section::Professions => "professions",
            Section::Animals => "animals",
            Section::Clothing => "clothing",
            Section::Dishes => "dishes",
            Section::Technology => "technology",
            Section::Transport => "transport",
            Section::Places => "places",
            Section::Nature => "nature",
            Section::Holiday => "holiday",
            Section::ColorsShapes => "colors_shapes",
            Section::School => "school",
            Section::Sports => "sports",
            Section::Numbers => "numbers",
            Section::BodyParts => "body_parts",
        }
    }

    /// Translation key for the section label. A few sections use a longer
    /// key than their wire id.
    pub fn label_key(&self) -> &'static str {
        match self {
            Section::FruitsVeggies => "fruits_and_vegetables",
            Section::Clothing => "clothing_and_shoes",
            Section::ColorsShapes => "colors_and_shapes",
            other => other.id(),
        }
    }
}

/// Catalog manifest: a single pair summarizing the entire shared catalog's
/// current state. Any add/update/delete bumps `version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Catalog-wide monotonic version counter
    pub version: u64,
    /// When the catalog last changed, ISO-8601
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// One catalog mutation since a given point in time. Ephemeral: drives
/// hydration and is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Card identifier the change applies to
    pub id: String,
    /// What happened to the card
    pub action: ChangeAction,
    /// When the change was recorded, ISO-8601
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Change record action tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Add,
    Update,
    Delete,
}

/// Full card record as the server returns it.
///
/// Used both for shared catalog cards and personal cards; personal cards
/// carry an owning `user` reference and no catalog version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalCard {
    /// Server-assigned stable identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Display title
    pub title: String,
    /// Russian title variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_ru: Option<String>,
    /// English title variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    /// Kazakh title variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_kk: Option<String>,
    /// Image URI, absolute or server-relative
    #[serde(rename = "imageUri")]
    pub image_uri: String,
    /// Server-provided thumbnail URI, when the server generated one
    #[serde(rename = "thumbnailUri", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_uri: Option<String>,
    /// Recorded Kazakh audio URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_kk: Option<String>,
    /// Catalog section
    pub section: Section,
    /// Vertical lane within a page, 1-3
    pub line: u8,
    /// Page number, 1-5
    pub page: u8,
    /// Catalog version this record was current at. Absent on personal cards.
    #[serde(default)]
    pub version: u64,
    /// Last modification timestamp, ISO-8601
    #[serde(rename = "updatedAt", default)]
    pub updated_at: String,
    /// Owning user, personal cards only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Card ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub title_ru: Option<String>,
    pub title_en: Option<String>,
    pub title_kk: Option<String>,
    pub section: Section,
    pub line: u8,
    pub page: u8,
    pub image_uri: String,
    pub thumbnail_uri: Option<String>,
    pub audio_kk: Option<String>,
    /// Owning user, personal cards only
    pub user: Option<String>,
}

impl Card {
    /// Build a presentation card from a locally persisted catalog record.
    ///
    /// Prefers the server-provided thumbnail; derives one by naming
    /// convention when the stored record lacks the field.
    pub fn from_catalog(gc: GlobalCard) -> Self {
        let thumbnail_uri = gc
            .thumbnail_uri
            .clone()
            .or_else(|| Some(derive_thumbnail_uri(&gc.image_uri)));
        Self {
            id: gc.id,
            title: gc.title,
            title_ru: gc.title_ru,
            title_en: gc.title_en,
            title_kk: gc.title_kk,
            section: gc.section,
            line: gc.line,
            page: gc.page,
            image_uri: gc.image_uri,
            thumbnail_uri,
            audio_kk: gc.audio_kk,
            user: gc.user,
        }
    }

    /// Build a presentation card from a freshly fetched record, resolving
    /// server-relative media paths against the configured base URL. The
    /// thumbnail falls back to the full image when the server sent none.
    pub fn from_wire(gc: GlobalCard, endpoints: &Endpoints) -> Self {
        let image_uri = endpoints.public_uri(&gc.image_uri);
        let thumbnail_uri = Some(match &gc.thumbnail_uri {
            Some(thumb) => endpoints.public_uri(thumb),
            None => image_uri.clone(),
        });
        Self {
            id: gc.id,
            title: gc.title,
            title_ru: gc.title_ru,
            title_en: gc.title_en,
            title_kk: gc.title_kk,
            section: gc.section,
            line: gc.line,
            page: gc.page,
            image_uri,
            thumbnail_uri,
            audio_kk: gc.audio_kk.map(|a| endpoints.public_uri(&a)),
            user: gc.user,
        }
    }
}

/// Derive a thumbnail URI by naming convention: same directory, filename
/// prefixed with `thumb_`.
pub fn derive_thumbnail_uri(image_uri: &str) -> String {
    match image_uri.rsplit_once('/') {
        Some((dir, filename)) => format!("{}/thumb_{}", dir, filename),
        None => format!("thumb_{}", image_uri),
    }
}

/// Server envelope for card collections
#[derive(Debug, Deserialize)]
pub struct CardsEnvelope {
    pub cards: Vec<GlobalCard>,
}

/// Server envelope for a single card
#[derive(Debug, Deserialize)]
pub struct CardEnvelope {
    pub card: GlobalCard,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_wire_json() -> &'static str {
        r#"{
            "_id": "abc123",
            "title": "Алма",
            "title_ru": "Яблоко",
            "title_en": "Apple",
            "imageUri": "/uploads/apple.jpg",
            "section": "fruits_veggies",
            "line": 1,
            "page": 2,
            "version": 7,
            "updatedAt": "2024-05-01T10:00:00Z"
        }"#
    }

    #[test]
    fn test_wire_card_parse() {
        let gc: GlobalCard = serde_json::from_str(sample_wire_json()).unwrap();
        assert_eq!(gc.id, "abc123");
        assert_eq!(gc.section, Section::FruitsVeggies);
        assert_eq!(gc.line, 1);
        assert_eq!(gc.page, 2);
        assert_eq!(gc.version, 7);
        assert!(gc.thumbnail_uri.is_none());
        assert!(gc.title_kk.is_none());
    }

    #[test]
    fn test_wire_card_roundtrip_keeps_field_names() {
        let gc: GlobalCard = serde_json::from_str(sample_wire_json()).unwrap();
        let json = serde_json::to_value(&gc).unwrap();
        assert_eq!(json["_id"], "abc123");
        assert_eq!(json["imageUri"], "/uploads/apple.jpg");
        assert_eq!(json["updatedAt"], "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_section_serde_names() {
        let s: Section = serde_json::from_str("\"colors_shapes\"").unwrap();
        assert_eq!(s, Section::ColorsShapes);
        assert_eq!(serde_json::to_string(&Section::BodyParts).unwrap(), "\"body_parts\"");
    }

    #[test]
    fn test_section_count_and_labels() {
        assert_eq!(Section::ALL.len(), 22);
        assert_eq!(Section::FruitsVeggies.label_key(), "fruits_and_vegetables");
        assert_eq!(Section::Food.label_key(), "food");
    }

    #[test]
    fn test_derive_thumbnail_uri() {
        assert_eq!(
            derive_thumbnail_uri("https://host/uploads/apple.jpg"),
            "https://host/uploads/thumb_apple.jpg"
        );
        assert_eq!(derive_thumbnail_uri("apple.jpg"), "thumb_apple.jpg");
    }

    #[test]
    fn test_from_catalog_prefers_server_thumbnail() {
        let mut gc: GlobalCard = serde_json::from_str(sample_wire_json()).unwrap();
        gc.thumbnail_uri = Some("/uploads/small_apple.jpg".to_string());
        let card = Card::from_catalog(gc);
        assert_eq!(card.thumbnail_uri.as_deref(), Some("/uploads/small_apple.jpg"));
    }

    #[test]
    fn test_from_catalog_derives_thumbnail_when_absent() {
        let gc: GlobalCard = serde_json::from_str(sample_wire_json()).unwrap();
        let card = Card::from_catalog(gc);
        assert_eq!(card.thumbnail_uri.as_deref(), Some("/uploads/thumb_apple.jpg"));
    }

    #[test]
    fn test_from_wire_resolves_relative_uris() {
        let gc: GlobalCard = serde_json::from_str(sample_wire_json()).unwrap();
        let endpoints = Endpoints::new("https://example.com");
        let card = Card::from_wire(gc, &endpoints);
        assert_eq!(card.image_uri, "https://example.com/uploads/apple.jpg");
        assert_eq!(
            card.thumbnail_uri.as_deref(),
            Some("https://example.com/uploads/apple.jpg")
        );
    }

    #[test]
    fn test_change_action_parse() {
        let changes: Vec<ChangeRecord> = serde_json::from_str(
            r#"[{"id":"a","action":"add","updatedAt":"t"},
                {"id":"b","action":"delete","updatedAt":"t"}]"#,
        )
        .unwrap();
        assert_eq!(changes[0].action, ChangeAction::Add);
        assert_eq!(changes[1].action, ChangeAction::Delete);
    }
}

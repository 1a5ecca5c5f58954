//! # Card APIs
//!
//! HTTP clients for the personal card collection and the admin-managed
//! global catalog, layered on the resilient request pipeline.
//!
//! Create and update of personal cards are offline-tolerant: when the
//! device has no connectivity the mutation is recorded in the
//! [`MutationQueue`] and a placeholder outcome is returned so the UI can
//! render optimistically. Everything else requires the network and fails
//! with a no-connection error when offline (unless the list caches can
//! answer, which the request layer handles).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::client::http::{FormField, RequestOptions, ResilientClient};
use crate::client::offline::queue::{
    MutationQueue, NewCardPayload, PendingMutation, UpdateCardPayload,
};
use crate::client::storage::KeyValueStore;
use crate::shared::card::{Card, CardEnvelope, CardsEnvelope, Section};
use crate::shared::config::is_remote;
use crate::shared::error::{Result, SyncError};

/// Multipart field conventions shared with the server
const IMAGE_FIELD: &str = "image";
const IMAGE_FILE_NAME: &str = "photo.jpg";
const IMAGE_MIME: &str = "image/jpeg";
const AUDIO_FIELD: &str = "audio_kk";
const AUDIO_FILE_NAME: &str = "recording.m4a";
const AUDIO_MIME: &str = "audio/m4a";

/// Input for creating a personal card
#[derive(Debug, Clone)]
pub struct NewCard {
    pub title: String,
    /// Device-local path or absolute URL
    pub image_uri: String,
    pub section: Section,
    pub line: u8,
    pub page: u8,
}

/// Input for updating a personal card
#[derive(Debug, Clone, Default)]
pub struct CardUpdate {
    pub title: String,
    /// Replacement image, device-local path, when the user picked one
    pub image_uri: Option<String>,
    /// Replacement audio recording, device-local path
    pub audio_uri: Option<String>,
}

/// Localized field set for admin catalog cards
#[derive(Debug, Clone, Default)]
pub struct GlobalCardDraft {
    pub title: Option<String>,
    pub title_ru: Option<String>,
    pub title_en: Option<String>,
    pub title_kk: Option<String>,
    pub section: Option<Section>,
    pub line: Option<u8>,
    pub page: Option<u8>,
}

/// Result of an offline-tolerant mutation
#[derive(Debug, Clone)]
pub enum MutationOutcome {
    /// The server accepted the mutation and returned the canonical card
    Applied(Card),
    /// The device is offline; the mutation was queued for replay. Creates
    /// carry a placeholder card for optimistic rendering.
    Queued { placeholder: Option<Card> },
}

impl MutationOutcome {
    /// Whether the mutation was queued rather than applied
    pub fn is_queued(&self) -> bool {
        matches!(self, MutationOutcome::Queued { .. })
    }
}

/// Client for personal and global card endpoints.
#[derive(Debug)]
pub struct CardsApi<S> {
    client: Arc<ResilientClient<S>>,
    queue: MutationQueue<S>,
}

impl<S> Clone for CardsApi<S> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            queue: self.queue.clone(),
        }
    }
}

impl<S: KeyValueStore> CardsApi<S> {
    /// Create an API client over the resilient pipeline and offline queue
    pub fn new(client: Arc<ResilientClient<S>>, queue: MutationQueue<S>) -> Self {
        Self { client, queue }
    }

    /// Offline queue used by this API
    pub fn queue(&self) -> &MutationQueue<S> {
        &self.queue
    }

    /// List personal cards for one section page
    pub async fn personal_cards(
        &self,
        token: Option<&str>,
        section: Section,
        page: u8,
    ) -> Result<Vec<Card>> {
        let mut options = RequestOptions::get()
            .query("section", section.id())
            .query("page", page.to_string());
        if let Some(token) = token {
            options = options.bearer(token);
        }

        let response = self
            .client
            .request(&self.client.endpoints().cards(), options)
            .await?;
        if !response.ok() {
            return Err(SyncError::status(
                "personal cards fetch",
                response.status.as_u16(),
                response.body,
            ));
        }

        let envelope: CardsEnvelope = response.json()?;
        Ok(envelope
            .cards
            .into_iter()
            .map(|gc| Card::from_wire(gc, self.client.endpoints()))
            .collect())
    }

    /// Create a personal card, queueing the mutation when offline
    pub async fn add_card(&self, new: NewCard, token: Option<&str>) -> Result<MutationOutcome> {
        if !self.client.is_online() {
            let placeholder_id = format!("offline-{}", Uuid::new_v4());
            self.queue
                .enqueue(PendingMutation::Add(NewCardPayload {
                    id: placeholder_id.clone(),
                    title: new.title.clone(),
                    image_uri: new.image_uri.clone(),
                    section: new.section,
                    line: new.line,
                    page: new.page,
                }))
                .await?;
            tracing::info!(id = %placeholder_id, "offline, queued card creation");

            return Ok(MutationOutcome::Queued {
                placeholder: Some(Card {
                    id: placeholder_id,
                    title: new.title,
                    title_ru: None,
                    title_en: None,
                    title_kk: None,
                    section: new.section,
                    line: new.line,
                    page: new.page,
                    image_uri: new.image_uri.clone(),
                    thumbnail_uri: Some(new.image_uri),
                    audio_kk: None,
                    user: None,
                }),
            });
        }

        let mut fields = vec![
            text_field("title", &new.title),
            text_field("section", new.section.id()),
            text_field("line", new.line.to_string()),
            text_field("page", new.page.to_string()),
        ];
        if !is_remote(&new.image_uri) {
            fields.push(image_field(&new.image_uri));
        }

        let mut options = RequestOptions::post().form(fields);
        if let Some(token) = token {
            options = options.bearer(token);
        }

        let response = self
            .client
            .request(&self.client.endpoints().cards(), options)
            .await?;
        if !response.ok() {
            return Err(SyncError::status(
                "card creation",
                response.status.as_u16(),
                response.body,
            ));
        }

        let envelope: CardEnvelope = response.json()?;
        Ok(MutationOutcome::Applied(Card::from_wire(
            envelope.card,
            self.client.endpoints(),
        )))
    }

    /// Update a personal card, queueing the mutation when offline
    pub async fn update_card(
        &self,
        id: &str,
        update: CardUpdate,
        token: Option<&str>,
    ) -> Result<MutationOutcome> {
        if !self.client.is_online() {
            self.queue
                .enqueue(PendingMutation::Update(UpdateCardPayload {
                    id: id.to_string(),
                    title: update.title,
                    image_uri: update.image_uri,
                    audio_uri: update.audio_uri,
                }))
                .await?;
            tracing::info!(id, "offline, queued card update");
            return Ok(MutationOutcome::Queued { placeholder: None });
        }

        let mut fields = vec![text_field("title", &update.title)];
        if let Some(image) = update.image_uri.as_deref().filter(|uri| !is_remote(uri)) {
            fields.push(image_field(image));
        }
        if let Some(audio) = update.audio_uri.as_deref().filter(|uri| !is_remote(uri)) {
            fields.push(audio_field(audio));
        }

        let mut options = RequestOptions::put().form(fields);
        if let Some(token) = token {
            options = options.bearer(token);
        }

        let response = self
            .client
            .request(&self.client.endpoints().card(id), options)
            .await?;
        if !response.ok() {
            return Err(SyncError::status(
                "card update",
                response.status.as_u16(),
                response.body,
            ));
        }

        let envelope: CardEnvelope = response.json()?;
        Ok(MutationOutcome::Applied(Card::from_wire(
            envelope.card,
            self.client.endpoints(),
        )))
    }

    /// Delete a personal card. Returns the server's confirmation message.
    pub async fn delete_card(&self, id: &str, token: Option<&str>) -> Result<String> {
        let mut options = RequestOptions::delete();
        if let Some(token) = token {
            options = options.bearer(token);
        }

        let response = self
            .client
            .request(&self.client.endpoints().card(id), options)
            .await?;
        if !response.ok() {
            return Err(SyncError::status(
                "card deletion",
                response.status.as_u16(),
                response.body,
            ));
        }

        #[derive(serde::Deserialize)]
        struct MessageEnvelope {
            message: String,
        }
        let envelope: MessageEnvelope = response.json()?;
        Ok(envelope.message)
    }

    /// List the full global catalog
    pub async fn global_cards(&self, token: Option<&str>) -> Result<Vec<Card>> {
        let mut options = RequestOptions::get();
        if let Some(token) = token {
            options = options.bearer(token);
        }

        let response = self
            .client
            .request(&self.client.endpoints().global_cards(), options)
            .await?;
        if !response.ok() {
            return Err(SyncError::status(
                "global cards fetch",
                response.status.as_u16(),
                response.body,
            ));
        }

        let envelope: CardsEnvelope = response.json()?;
        Ok(envelope
            .cards
            .into_iter()
            .map(|gc| Card::from_wire(gc, self.client.endpoints()))
            .collect())
    }

    /// Create a global catalog card (admin)
    pub async fn create_global_card(
        &self,
        draft: GlobalCardDraft,
        image: &Path,
        audio: Option<&Path>,
        token: Option<&str>,
    ) -> Result<Card> {
        let mut fields = draft_fields(&draft);
        fields.push(file_field(IMAGE_FIELD, image, IMAGE_FILE_NAME, IMAGE_MIME));
        if let Some(audio) = audio {
            fields.push(file_field(AUDIO_FIELD, audio, AUDIO_FILE_NAME, AUDIO_MIME));
        }

        let mut options = RequestOptions::post().form(fields);
        if let Some(token) = token {
            options = options.bearer(token);
        }

        let response = self
            .client
            .request(&self.client.endpoints().admin_cards(), options)
            .await?;
        if !response.ok() {
            return Err(SyncError::status(
                "global card creation",
                response.status.as_u16(),
                response.body,
            ));
        }

        let envelope: CardEnvelope = response.json()?;
        Ok(Card::from_wire(envelope.card, self.client.endpoints()))
    }

    /// Update a global catalog card (admin)
    pub async fn update_global_card(
        &self,
        id: &str,
        draft: GlobalCardDraft,
        image: Option<&Path>,
        audio: Option<&Path>,
        token: Option<&str>,
    ) -> Result<Card> {
        let mut fields = draft_fields(&draft);
        if let Some(image) = image {
            fields.push(file_field(IMAGE_FIELD, image, IMAGE_FILE_NAME, IMAGE_MIME));
        }
        if let Some(audio) = audio {
            fields.push(file_field(AUDIO_FIELD, audio, AUDIO_FILE_NAME, AUDIO_MIME));
        }

        let mut options = RequestOptions::put().form(fields);
        if let Some(token) = token {
            options = options.bearer(token);
        }

        let response = self
            .client
            .request(&self.client.endpoints().admin_card(id), options)
            .await?;
        if !response.ok() {
            return Err(SyncError::status(
                "global card update",
                response.status.as_u16(),
                response.body,
            ));
        }

        let envelope: CardEnvelope = response.json()?;
        Ok(Card::from_wire(envelope.card, self.client.endpoints()))
    }

    /// Hide a global card for the current user
    pub async fn hide_global_card(&self, card_id: &str, token: Option<&str>) -> Result<()> {
        self.toggle_global_card(&self.client.endpoints().global_hide(), card_id, token, "card hide")
            .await
    }

    /// Unhide a global card for the current user
    pub async fn unhide_global_card(&self, card_id: &str, token: Option<&str>) -> Result<()> {
        self.toggle_global_card(
            &self.client.endpoints().global_unhide(),
            card_id,
            token,
            "card unhide",
        )
        .await
    }

    async fn toggle_global_card(
        &self,
        url: &str,
        card_id: &str,
        token: Option<&str>,
        context: &'static str,
    ) -> Result<()> {
        let mut options =
            RequestOptions::post().json(serde_json::json!({ "cardId": card_id }));
        if let Some(token) = token {
            options = options.bearer(token);
        }

        let response = self.client.request(url, options).await?;
        if !response.ok() {
            return Err(SyncError::status(
                context,
                response.status.as_u16(),
                response.body,
            ));
        }
        Ok(())
    }
}

fn text_field(name: &str, value: impl Into<String>) -> FormField {
    FormField::Text {
        name: name.to_string(),
        value: value.into(),
    }
}

fn file_field(name: &str, path: &Path, file_name: &str, mime: &str) -> FormField {
    FormField::File {
        name: name.to_string(),
        path: PathBuf::from(path),
        file_name: file_name.to_string(),
        mime: mime.to_string(),
    }
}

fn image_field(path: &str) -> FormField {
    file_field(IMAGE_FIELD, Path::new(path), IMAGE_FILE_NAME, IMAGE_MIME)
}

fn audio_field(path: &str) -> FormField {
    file_field(AUDIO_FIELD, Path::new(path), AUDIO_FILE_NAME, AUDIO_MIME)
}

fn draft_fields(draft: &GlobalCardDraft) -> Vec<FormField> {
    let mut fields = Vec::new();
    if let Some(title) = &draft.title {
        fields.push(text_field("title", title));
    }
    if let Some(title_ru) = &draft.title_ru {
        fields.push(text_field("title_ru", title_ru));
    }
    if let Some(title_en) = &draft.title_en {
        fields.push(text_field("title_en", title_en));
    }
    if let Some(title_kk) = &draft.title_kk {
        fields.push(text_field("title_kk", title_kk));
    }
    if let Some(section) = draft.section {
        fields.push(text_field("section", section.id()));
    }
    if let Some(line) = draft.line {
        fields.push(text_field("line", line.to_string()));
    }
    if let Some(page) = draft.page {
        fields.push(text_field("page", page.to_string()));
    }
    fields
}

//! 7TV emote catalog client.
//!
//! Looks up the emote set a Twitch user has active on 7TV through the v3
//! GraphQL API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{EmotesError, Result};
use crate::vocabulary::{EmoteVocabularyEntry, VocabularySource, validate_vocabulary};

/// Default 7TV GraphQL endpoint.
pub const SEVENTV_GQL_URL: &str = "https://7tv.io/v3/gql";

const EMOTE_SET_QUERY: &str = "query($id: String!) { userByConnection(platform: TWITCH, id: $id) { connections { emote_set_id platform } emote_sets { id emotes { id name timestamp } } } }";

const TWITCH_PLATFORM: &str = "TWITCH";

#[derive(Debug, Deserialize)]
pub(crate) struct GqlResponse {
    pub data: Option<GqlData>,
    #[serde(default)]
    pub errors: Vec<GqlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GqlData {
    #[serde(rename = "userByConnection")]
    pub user_by_connection: Option<UserByConnection>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserByConnection {
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub emote_sets: Vec<EmoteSet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Connection {
    pub emote_set_id: Option<String>,
    pub platform: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmoteSet {
    pub id: String,
    #[serde(default)]
    pub emotes: Vec<SetEmote>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetEmote {
    pub id: String,
    pub name: String,
    pub timestamp: String,
}

/// 7TV catalog client.
pub struct SevenTvClient {
    client: Client,
    endpoint: String,
}

impl SevenTvClient {
    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, SEVENTV_GQL_URL)
    }

    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GraphQL request body for a Twitch user ID.
    pub fn build_request(user_id: &str) -> serde_json::Value {
        serde_json::json!({
            "query": EMOTE_SET_QUERY,
            "variables": {
                "id": user_id,
            },
        })
    }
}

/// Pick the emote set of the user's Twitch connection.
pub(crate) fn select_emote_set(response: GqlResponse) -> Result<Vec<EmoteVocabularyEntry>> {
    let user = match response.data.and_then(|d| d.user_by_connection) {
        Some(user) => user,
        None if !response.errors.is_empty() => {
            let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
            return Err(EmotesError::catalog(messages.join("; ")));
        }
        None => return Err(EmotesError::catalog("no user found for connection")),
    };

    if user.connections.is_empty() {
        return Err(EmotesError::catalog("no connections found for user"));
    }

    let Some(emote_set_id) = user
        .connections
        .iter()
        .find(|c| c.platform == TWITCH_PLATFORM)
        .and_then(|c| c.emote_set_id.as_deref())
        .filter(|id| !id.is_empty())
    else {
        return Err(EmotesError::catalog("no Twitch connection found for user"));
    };

    let Some(set) = user.emote_sets.iter().find(|s| s.id == emote_set_id) else {
        return Err(EmotesError::catalog(format!(
            "emote set {emote_set_id} not returned for user"
        )));
    };

    set.emotes
        .iter()
        .map(|emote| {
            let added_at = DateTime::parse_from_rfc3339(&emote.timestamp)
                .map_err(|e| {
                    EmotesError::catalog(format!(
                        "invalid timestamp for emote {}: {e}",
                        emote.name
                    ))
                })?
                .with_timezone(&Utc);
            Ok(EmoteVocabularyEntry::new(&emote.id, &emote.name, added_at))
        })
        .collect()
}

#[async_trait]
impl VocabularySource for SevenTvClient {
    fn name(&self) -> &str {
        "7TV"
    }

    async fn fetch(&self, user_id: &str) -> Result<Vec<EmoteVocabularyEntry>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&Self::build_request(user_id))
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        debug!("body: {}", body);

        let response: GqlResponse = serde_json::from_str(&body)?;
        let emotes = select_emote_set(response)?;
        validate_vocabulary(&emotes)?;

        info!(user_id, emotes = emotes.len(), "Fetched emote set from 7TV");
        Ok(emotes)
    }
}

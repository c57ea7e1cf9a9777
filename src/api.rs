use std::env;
use std::time::Duration;

use rayon::prelude::*;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::models::{
    ChatHealth, ChatMessage, ChatReply, Envelope, Manager, Player, SearchCategory, SearchHit,
    SquadFilters, SquadStatistics, Suggestion,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// The backend rejects longer chat messages; callers should trim or refuse
/// before sending.
pub const MAX_CHAT_MESSAGE_LEN: usize = 500;

/// Number of trailing transcript entries sent along as chat context.
pub const CHAT_HISTORY_WINDOW: usize = 10;

/// Blocking client for the Blue's Book REST backend. An explicit instance
/// rather than a process-wide singleton so tests and embedders can point it
/// anywhere.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Base URL from `BLUESBOOK_API_BASE`, timeout from
    /// `BLUESBOOK_TIMEOUT_SECS` (clamped to 1..=120).
    pub fn from_env() -> Result<Self, FetchError> {
        let base_url = env::var("BLUESBOOK_API_BASE")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = env::var("BLUESBOOK_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        Self::new(base_url, Duration::from_secs(timeout))
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Squad list. Position and sort are server-side query parameters; the
    /// nationality filter is applied here, after the response.
    pub fn fetch_squad(&self, filters: &SquadFilters) -> Result<Vec<Player>, FetchError> {
        let mut params: Vec<(&str, String)> =
            vec![("sort_by", filters.sort_by.as_query().to_string())];
        if let Some(position) = &filters.position {
            params.push(("position", position.clone()));
        }
        let mut players: Vec<Player> = self.get("/players", &params)?;
        if let Some(nationality) = &filters.nationality {
            players.retain(|player| &player.nationality == nationality);
        }
        Ok(players)
    }

    pub fn fetch_player(&self, id: &str) -> Result<Player, FetchError> {
        self.get(&format!("/players/{id}"), &[])
    }

    pub fn fetch_random_player(&self) -> Result<Player, FetchError> {
        self.get("/players/random", &[])
    }

    /// Quick player lookup used for the search box dropdown.
    pub fn search_players(&self, query: &str) -> Result<Vec<Player>, FetchError> {
        self.get("/players/search", &[("q", query.to_string())])
    }

    /// Mixed player/manager search.
    pub fn global_search(
        &self,
        query: &str,
        category: SearchCategory,
        limit: u32,
    ) -> Result<Vec<SearchHit>, FetchError> {
        self.get(
            "/search",
            &[
                ("q", query.to_string()),
                ("category", category.as_query().to_string()),
                ("limit", limit.to_string()),
            ],
        )
    }

    pub fn search_suggestions(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Suggestion>, FetchError> {
        self.get(
            "/search/suggestions",
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
    }

    pub fn fetch_current_manager(&self) -> Result<Manager, FetchError> {
        self.get("/managers/current", &[])
    }

    pub fn search_managers(&self, query: &str) -> Result<Vec<Manager>, FetchError> {
        self.get("/managers/search", &[("q", query.to_string())])
    }

    pub fn fetch_statistics(&self) -> Result<SquadStatistics, FetchError> {
        self.get("/players/statistics/advanced", &[])
    }

    /// Stateless chat round-trip; `history` is the rolling transcript, of
    /// which only the trailing window is sent.
    pub fn chat_send(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<ChatReply, FetchError> {
        let window_start = history.len().saturating_sub(CHAT_HISTORY_WINDOW);
        let body = serde_json::json!({
            "message": message,
            "history": &history[window_start..],
        });
        let raw = self.post_raw("/chat/send", &body)?;
        parse_chat_reply_json(raw.text())
    }

    pub fn fetch_chat_suggestions(&self) -> Result<Vec<String>, FetchError> {
        self.get("/chat/suggestions", &[])
    }

    pub fn chat_health(&self) -> Result<ChatHealth, FetchError> {
        let raw = self.get_raw("/chat/health", &[])?;
        parse_chat_health_json(raw.text())
    }

    /// Warms many player profiles at once, collecting per-id errors instead
    /// of failing the batch.
    pub fn fetch_players_parallel(&self, ids: &[String]) -> (Vec<Player>, Vec<String>) {
        let results: Vec<Result<Player, String>> = ids
            .par_iter()
            .map(|id| {
                self.fetch_player(id)
                    .map_err(|err| format!("player {id}: {err}"))
            })
            .collect();

        let mut players = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(player) => players.push(player),
                Err(err) => errors.push(err),
            }
        }
        (players, errors)
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let raw = self.get_raw(path, params)?;
        decode_envelope(&raw.body).map_err(|err| prefer_http_error(err, &raw))
    }

    fn get_raw(&self, path: &str, params: &[(&str, String)]) -> Result<RawResponse, FetchError> {
        let mut request = self.client.get(format!("{}{path}", self.base_url));
        if !params.is_empty() {
            request = request.query(params);
        }
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        Ok(RawResponse { status, body })
    }

    fn post_raw(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<RawResponse, FetchError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()?;
        let status = response.status();
        let body = response.text()?;
        Ok(RawResponse { status, body })
    }
}

#[derive(Debug)]
struct RawResponse {
    status: reqwest::StatusCode,
    body: String,
}

impl RawResponse {
    fn text(&self) -> &str {
        &self.body
    }
}

/// The backend reports failures through the envelope even on 4xx/5xx, so the
/// body is decoded regardless of status. Only when the body is not an
/// envelope at all does the HTTP status decide the error.
fn prefer_http_error(err: FetchError, raw: &RawResponse) -> FetchError {
    match err {
        FetchError::MalformedResponse(_) if !raw.status.is_success() => {
            FetchError::Server(format!("http {}", raw.status))
        }
        other => other,
    }
}

fn decode_envelope<T: DeserializeOwned>(raw: &str) -> Result<T, FetchError> {
    let envelope: Envelope<T> =
        serde_json::from_str(raw).map_err(|err| FetchError::MalformedResponse(err.to_string()))?;
    envelope.into_result()
}

pub fn parse_players_json(raw: &str) -> Result<Vec<Player>, FetchError> {
    decode_envelope(raw)
}

pub fn parse_player_json(raw: &str) -> Result<Player, FetchError> {
    decode_envelope(raw)
}

pub fn parse_search_json(raw: &str) -> Result<Vec<SearchHit>, FetchError> {
    decode_envelope(raw)
}

pub fn parse_suggestions_json(raw: &str) -> Result<Vec<Suggestion>, FetchError> {
    decode_envelope(raw)
}

pub fn parse_manager_json(raw: &str) -> Result<Manager, FetchError> {
    decode_envelope(raw)
}

pub fn parse_managers_json(raw: &str) -> Result<Vec<Manager>, FetchError> {
    decode_envelope(raw)
}

pub fn parse_statistics_json(raw: &str) -> Result<SquadStatistics, FetchError> {
    decode_envelope(raw)
}

/// Chat replies carry their payload next to `success` instead of under
/// `data`.
pub fn parse_chat_reply_json(raw: &str) -> Result<ChatReply, FetchError> {
    #[derive(Deserialize)]
    struct ChatWire {
        success: bool,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        timestamp: Option<i64>,
    }

    let wire: ChatWire = serde_json::from_str(raw)
        .map_err(|err| FetchError::MalformedResponse(err.to_string()))?;
    if !wire.success {
        return Err(FetchError::Server(
            wire.error
                .or(wire.message)
                .unwrap_or_else(|| "unknown chat error".to_string()),
        ));
    }
    let message = wire.message.ok_or_else(|| {
        FetchError::MalformedResponse("chat reply missing message field".to_string())
    })?;
    Ok(ChatReply {
        message,
        timestamp: wire.timestamp,
    })
}

pub fn parse_chat_health_json(raw: &str) -> Result<ChatHealth, FetchError> {
    #[derive(Deserialize)]
    struct HealthWire {
        success: bool,
        #[serde(default)]
        healthy: bool,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        service: Option<String>,
        #[serde(default)]
        error: Option<String>,
    }

    let wire: HealthWire = serde_json::from_str(raw)
        .map_err(|err| FetchError::MalformedResponse(err.to_string()))?;
    if !wire.success {
        return Err(FetchError::Server(
            wire.error
                .unwrap_or_else(|| "chat health check failed".to_string()),
        ));
    }
    Ok(ChatHealth {
        healthy: wire.healthy,
        status: wire.status,
        service: wire.service,
    })
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// The JSON wrapper every backend endpoint returns. Extra bookkeeping fields
/// (`query_time`, `total`, ...) are ignored; only these three are contractual.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// `success: false` is a server error carrying the backend message;
    /// `success: true` without `data` is a shape violation, distinct from a
    /// valid empty result set.
    pub fn into_result(self) -> Result<T, FetchError> {
        if !self.success {
            return Err(FetchError::Server(
                self.error
                    .unwrap_or_else(|| "unknown server error".to_string()),
            ));
        }
        self.data.ok_or_else(|| {
            FetchError::MalformedResponse("successful envelope missing data field".to_string())
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "player_id")]
    pub id: String,
    pub name: String,
    pub position: String,
    pub jersey_number: u32,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub birth_date: Option<String>,
    // Money values stay as server-formatted strings ("£42.5M", "£150,000").
    #[serde(default)]
    pub signing_fee: Option<String>,
    #[serde(default)]
    pub weekly_salary: Option<String>,
    #[serde(default)]
    pub years_at_club: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub fun_facts: Vec<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manager {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub tenure_start: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// One hit from the global `/search` endpoint. The backend tags each hit with
/// its entity type and nests the display fields under `data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum SearchHit {
    Player(PlayerHit),
    Manager(ManagerHit),
}

impl SearchHit {
    pub fn name(&self) -> &str {
        match self {
            SearchHit::Player(hit) => &hit.name,
            SearchHit::Manager(hit) => &hit.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerHit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub jersey_number: Option<u32>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManagerHit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub tenure_start: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Manager,
}

/// Raw row from `/search/suggestions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub jersey_number: Option<u32>,
    #[serde(default)]
    pub nationality: Option<String>,
}

impl From<&SearchHit> for Suggestion {
    fn from(hit: &SearchHit) -> Self {
        match hit {
            SearchHit::Player(p) => Suggestion {
                text: p.name.clone(),
                kind: EntityKind::Player,
                position: p.position.clone(),
                jersey_number: p.jersey_number,
                nationality: p.nationality.clone(),
            },
            SearchHit::Manager(m) => Suggestion {
                text: m.name.clone(),
                kind: EntityKind::Manager,
                position: None,
                jersey_number: None,
                nationality: m.nationality.clone(),
            },
        }
    }
}

/// Display-ready suggestion: text (optionally highlighted), entity kind, and
/// a one-line summary, so rendering needs no further lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRecord {
    pub text: String,
    pub kind: EntityKind,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchCategory {
    #[default]
    All,
    Players,
    Managers,
}

impl SearchCategory {
    pub fn as_query(self) -> &'static str {
        match self {
            SearchCategory::All => "all",
            SearchCategory::Players => "players",
            SearchCategory::Managers => "managers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    JerseyNumber,
    Age,
    Name,
}

impl SortBy {
    pub fn as_query(self) -> &'static str {
        match self {
            SortBy::JerseyNumber => "jersey_number",
            SortBy::Age => "age",
            SortBy::Name => "name",
        }
    }
}

/// Squad-list query parameters. Position and sort go to the server; the
/// nationality filter is applied client-side, matching the original site.
#[derive(Debug, Clone, Default)]
pub struct SquadFilters {
    pub position: Option<String>,
    pub nationality: Option<String>,
    pub sort_by: SortBy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SquadStatistics {
    pub basic_metrics: BasicMetrics,
    #[serde(default)]
    pub tactical_analysis: TacticalAnalysis,
    #[serde(default)]
    pub squad_demographics: SquadDemographics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasicMetrics {
    pub total_players: u32,
    pub average_age: f64,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default)]
    pub nationalities: u32,
    #[serde(default)]
    pub academy_graduates: u32,
    #[serde(default)]
    pub international_players: u32,
    #[serde(default)]
    pub weekly_wage_bill: f64,
    #[serde(default)]
    pub avg_market_value: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TacticalAnalysis {
    #[serde(default)]
    pub position_depth: HashMap<String, u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SquadDemographics {
    #[serde(default)]
    pub age_groups: HashMap<String, u32>,
    #[serde(default)]
    pub nationality_breakdown: HashMap<String, u32>,
}

/// One entry of the rolling chat transcript the client sends back as context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub role: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl ChatMessage {
    pub fn user(message: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role: "user".to_string(),
            message: message.into(),
            timestamp: Some(timestamp),
        }
    }

    pub fn ai(message: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role: "ai".to_string(),
            message: message.into(),
            timestamp: Some(timestamp),
        }
    }
}

/// Reply from `/chat/send`. Unlike the list endpoints, the chat service puts
/// its payload at the top level next to `success` instead of under `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatHealth {
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

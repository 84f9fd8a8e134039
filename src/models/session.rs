use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, Result};

// A session groups a gathering of players: a named lobby with draft rosters
// that later gets a Match linked into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,
    #[serde(default)]
    pub overs: Option<u32>,
    #[serde(default)]
    pub is_live: bool,

    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<ObjectId>,

    #[serde(default)]
    pub toss_winner: String,

    #[serde(default)]
    pub team_a: Vec<String>,
    #[serde(default)]
    pub team_b: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

// For creating new sessions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub name: String,
    #[serde(default)]
    pub overs: Option<u32>,
    #[serde(default)]
    pub team_a: Vec<String>,
    #[serde(default)]
    pub team_b: Vec<String>,
}

// Partial update for PATCH /api/sessions/:id
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    pub name: Option<String>,
    pub overs: Option<u32>,
    pub is_live: Option<bool>,
    pub toss_winner: Option<String>,
    pub team_a: Option<Vec<String>>,
    pub team_b: Option<Vec<String>>,
    #[serde(rename = "match")]
    pub match_id: Option<String>,
}

impl SessionPatch {
    pub fn into_set_document(self) -> Result<Document> {
        let mut set = doc! {};

        if let Some(name) = self.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::invalid_data("Session name must not be blank"));
            }
            set.insert("name", name);
        }
        if let Some(overs) = self.overs {
            set.insert("overs", overs as i64);
        }
        if let Some(is_live) = self.is_live {
            set.insert("isLive", is_live);
        }
        if let Some(toss_winner) = self.toss_winner {
            set.insert("tossWinner", toss_winner);
        }
        if let Some(team_a) = self.team_a {
            set.insert("teamA", team_a);
        }
        if let Some(team_b) = self.team_b {
            set.insert("teamB", team_b);
        }
        if let Some(match_id) = self.match_id {
            set.insert("match", ObjectId::parse_str(&match_id)?);
        }

        if set.is_empty() {
            return Err(AppError::invalid_data(
                "No valid updatable fields provided",
            ));
        }

        set.insert(
            "updatedAt",
            BsonDateTime::from_chrono(chrono::Utc::now()),
        );
        Ok(set)
    }
}

// Body for POST /api/sessions/:id/setup-match
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetupMatchRequest {
    pub team_a: Vec<String>,
    pub team_b: Vec<String>,
    #[validate(range(min = 1, message = "overs must be at least 1"))]
    pub overs: u32,
}

// What the session list endpoint returns: the session joined with its
// match's live status and result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListEntry {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(rename = "match")]
    pub match_id: Option<ObjectId>,
    pub is_live: bool,
    pub result: String,
    pub team_a: Vec<String>,
    pub team_b: Vec<String>,
    pub overs: Option<u32>,
}

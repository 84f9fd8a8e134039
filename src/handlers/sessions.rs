use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::Collection;
use std::collections::HashMap;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::matches::{CreateMatchRequest, Match};
use crate::models::session::{
    CreateSessionRequest, Session, SessionListEntry, SessionPatch, SetupMatchRequest,
};
use crate::state::AppState;

fn sessions_collection(state: &AppState) -> Collection<Session> {
    state.db.collection("sessions")
}

// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Session>)> {
    println!("📋 POST /api/sessions called");

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::invalid_data("Session name must not be blank"));
    }

    let now = BsonDateTime::from_chrono(Utc::now());
    let mut session = Session {
        id: None,
        name,
        overs: payload.overs,
        is_live: false,
        match_id: None,
        toss_winner: String::new(),
        team_a: payload.team_a,
        team_b: payload.team_b,
        created_at: Some(now),
        updated_at: Some(now),
    };

    let collection = sessions_collection(&state);
    let inserted = collection.insert_one(&session).await?;
    session.id = inserted.inserted_id.as_object_id();

    println!("✅ Created session {:?}: {}", session.id, session.name);
    Ok((StatusCode::CREATED, Json(session)))
}

// GET /api/sessions - each session joined with its match's live status
// and result, newest first.
pub async fn get_sessions(State(state): State<AppState>) -> Result<Json<Vec<SessionListEntry>>> {
    println!("🔍 GET /api/sessions called");

    let collection = sessions_collection(&state);
    let cursor = collection.find(doc! {}).await?;
    let mut sessions: Vec<Session> = cursor.try_collect().await?;
    sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    // One $in lookup for every linked match instead of a query per session.
    let match_ids: Vec<ObjectId> = sessions.iter().filter_map(|s| s.match_id).collect();
    let mut linked: HashMap<ObjectId, (bool, String)> = HashMap::new();
    if !match_ids.is_empty() {
        let matches: Collection<Match> = state.db.collection("matches");
        let cursor = matches.find(doc! { "_id": { "$in": match_ids } }).await?;
        let found: Vec<Match> = cursor.try_collect().await?;
        for m in found {
            if let Some(id) = m.id {
                linked.insert(id, (m.is_ongoing, m.result));
            }
        }
    }

    let entries: Vec<SessionListEntry> = sessions
        .into_iter()
        .filter_map(|s| {
            let id = s.id?;
            let match_status = s.match_id.and_then(|mid| linked.get(&mid));
            Some(SessionListEntry {
                id,
                name: s.name,
                created_at: s.created_at,
                match_id: s.match_id,
                is_live: match_status.map(|(ongoing, _)| *ongoing).unwrap_or(false),
                result: match_status
                    .map(|(_, result)| result.clone())
                    .unwrap_or_default(),
                team_a: s.team_a,
                team_b: s.team_b,
                overs: s.overs,
            })
        })
        .collect();

    println!("✅ Successfully fetched {} sessions", entries.len());
    Ok(Json(entries))
}

// GET /api/sessions/:id
pub async fn get_session_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>> {
    let collection = sessions_collection(&state);
    let object_id = ObjectId::parse_str(&id)
        .map_err(|_| AppError::invalid_data("Invalid session ID format"))?;

    match collection.find_one(doc! { "_id": object_id }).await? {
        Some(session) => Ok(Json(session)),
        None => Err(AppError::SessionNotFound),
    }
}

// PATCH /api/sessions/:id
pub async fn patch_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SessionPatch>,
) -> Result<Json<Session>> {
    println!("📝 PATCH /api/sessions/{} called", id);

    let collection = sessions_collection(&state);
    let object_id = ObjectId::parse_str(&id)
        .map_err(|_| AppError::invalid_data("Invalid session ID format"))?;

    let set = payload.into_set_document()?;
    let update_result = collection
        .update_one(doc! { "_id": object_id }, doc! { "$set": set })
        .await?;

    if update_result.matched_count == 0 {
        return Err(AppError::SessionNotFound);
    }

    match collection.find_one(doc! { "_id": object_id }).await? {
        Some(session) => {
            println!("✅ Updated session {}", id);
            Ok(Json(session))
        }
        None => Err(AppError::SessionNotFound),
    }
}

// POST /api/sessions/:id/setup-match - create the Match and link it into
// the session in one step.
pub async fn setup_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SetupMatchRequest>,
) -> Result<(StatusCode, Json<Match>)> {
    println!("🏏 POST /api/sessions/{}/setup-match called", id);

    let session_oid = ObjectId::parse_str(&id)
        .map_err(|_| AppError::invalid_data("Invalid session ID format"))?;

    if payload.team_a.is_empty() || payload.team_b.is_empty() {
        return Err(AppError::configuration(
            "Both team rosters must have at least one entry",
        ));
    }
    payload.validate()?;

    let sessions = sessions_collection(&state);
    if sessions
        .find_one(doc! { "_id": session_oid })
        .await?
        .is_none()
    {
        return Err(AppError::SessionNotFound);
    }

    let create = CreateMatchRequest {
        team_a: payload.team_a,
        team_b: payload.team_b,
        overs: payload.overs,
        session_id: None,
    };
    let mut match_doc = create.into_match(Some(session_oid));

    let matches: Collection<Match> = state.db.collection("matches");
    let inserted = matches.insert_one(&match_doc).await?;
    match_doc.id = inserted.inserted_id.as_object_id();

    let update = doc! {
        "$set": {
            "match": match_doc.id,
            "teamA": match_doc.team_a.clone(),
            "teamB": match_doc.team_b.clone(),
            "overs": match_doc.overs as i64,
            "isLive": true,
            "updatedAt": BsonDateTime::from_chrono(Utc::now()),
        }
    };
    sessions
        .update_one(doc! { "_id": session_oid }, update)
        .await?;

    println!(
        "✅ Session {} linked to new match {:?}",
        id, match_doc.id
    );
    Ok((StatusCode::CREATED, Json(match_doc)))
}

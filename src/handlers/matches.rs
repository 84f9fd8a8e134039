use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::Collection;
use validator::Validate;

use crate::engine;
use crate::engine::stats::MatchSummary;
use crate::errors::{AppError, Result};
use crate::models::matches::{
    CreateMatchRequest, InningsHalf, Match, MatchPatch, ScoreEvent,
};
use crate::state::AppState;

fn matches_collection(state: &AppState) -> Collection<Match> {
    state.db.collection("matches")
}

async fn fetch_match(collection: &Collection<Match>, id: &ObjectId) -> Result<Match> {
    collection
        .find_one(doc! { "_id": *id })
        .await?
        .ok_or(AppError::MatchNotFound)
}

// POST /api/matches
pub async fn create_match(
    State(state): State<AppState>,
    Json(payload): Json<CreateMatchRequest>,
) -> Result<(StatusCode, Json<Match>)> {
    println!("🏏 POST /api/matches called");

    if payload.team_a.is_empty() || payload.team_b.is_empty() {
        return Err(AppError::configuration(
            "Both team rosters must have at least one entry",
        ));
    }
    payload.validate()?;

    let session_id = payload
        .session_id
        .as_deref()
        .map(ObjectId::parse_str)
        .transpose()?;

    let mut match_doc = payload.into_match(session_id);

    let collection = matches_collection(&state);
    let inserted = collection.insert_one(&match_doc).await?;
    match_doc.id = inserted.inserted_id.as_object_id();

    println!(
        "✅ Created match {:?}: {} vs {}, {} overs",
        match_doc.id,
        match_doc.team_a.first().map(String::as_str).unwrap_or(""),
        match_doc.team_b.first().map(String::as_str).unwrap_or(""),
        match_doc.overs
    );
    Ok((StatusCode::CREATED, Json(match_doc)))
}

// GET /api/matches
pub async fn get_matches(State(state): State<AppState>) -> Result<Json<Vec<Match>>> {
    println!("🔍 GET /api/matches called");

    let collection = matches_collection(&state);
    let cursor = collection.find(doc! {}).await?;
    let mut matches: Vec<Match> = cursor.try_collect().await?;

    // Newest first
    matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    println!("✅ Successfully fetched {} matches", matches.len());
    Ok(Json(matches))
}

// GET /api/matches/:id
pub async fn get_match_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Match>> {
    let collection = matches_collection(&state);
    let object_id = ObjectId::parse_str(&id)
        .map_err(|_| AppError::invalid_data("Invalid match ID format"))?;

    let match_doc = fetch_match(&collection, &object_id).await?;
    Ok(Json(match_doc))
}

// PATCH /api/matches/:id - whitelisted partial update. Backs toss entry,
// mid-game roster/overs edits, and snapshot-replay undo.
pub async fn patch_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MatchPatch>,
) -> Result<Json<Match>> {
    println!("📝 PATCH /api/matches/{} called", id);

    let collection = matches_collection(&state);
    let object_id = ObjectId::parse_str(&id)
        .map_err(|_| AppError::invalid_data("Invalid match ID format"))?;

    let set = payload.into_set_document()?;
    println!("   → Updating fields: {:?}", set.keys().collect::<Vec<_>>());

    let filter = doc! { "_id": object_id };
    let update_result = collection
        .update_one(filter.clone(), doc! { "$set": set })
        .await?;

    if update_result.matched_count == 0 {
        println!("❌ Match not found: {}", id);
        return Err(AppError::MatchNotFound);
    }

    let updated = fetch_match(&collection, &object_id).await?;
    println!("✅ Updated match {}", id);
    Ok(Json(updated))
}

// DELETE /api/matches/:id
pub async fn delete_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    println!("🗑️ DELETE /api/matches/{} called", id);

    let collection = matches_collection(&state);
    let object_id = ObjectId::parse_str(&id)
        .map_err(|_| AppError::invalid_data("Invalid match ID format"))?;

    let delete_result = collection.delete_one(doc! { "_id": object_id }).await?;
    if delete_result.deleted_count == 0 {
        return Err(AppError::MatchNotFound);
    }

    println!("✅ Deleted match {}", id);
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/matches/:id/balls - one umpire scoring event through the engine.
pub async fn record_ball(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(event): Json<ScoreEvent>,
) -> Result<Json<Match>> {
    println!("🏏 POST /api/matches/{}/balls called: {:?}", id, event);

    let collection = matches_collection(&state);
    let object_id = ObjectId::parse_str(&id)
        .map_err(|_| AppError::invalid_data("Invalid match ID format"))?;

    let current = fetch_match(&collection, &object_id).await?;

    let Some(updated) = engine::apply_score_event(&current, &event) else {
        // Event after the result: ignored, no state change surfaced.
        println!("   → Match already decided, event ignored");
        return Ok(Json(current));
    };

    // PATCH semantics: only the fields the event touches are written.
    let (innings_key, innings_doc) = match updated.innings {
        InningsHalf::First => ("innings1", bson::to_bson(&updated.innings1)?),
        InningsHalf::Second => ("innings2", bson::to_bson(&updated.innings2)?),
    };
    let mut set = doc! {
        "score": updated.score,
        "outs": updated.outs,
        "result": updated.result.clone(),
        "isOngoing": updated.is_ongoing,
        "balls": bson::to_bson(&updated.balls)?,
        "updatedAt": BsonDateTime::from_chrono(Utc::now()),
    };
    set.insert(innings_key, innings_doc);
    collection
        .update_one(doc! { "_id": object_id }, doc! { "$set": set })
        .await?;

    println!(
        "✅ Recorded ball for match {}: score {}/{}{}",
        id,
        updated.score,
        updated.outs,
        if updated.is_decided() {
            format!(" - {}", updated.result)
        } else {
            String::new()
        }
    );
    Ok(Json(updated))
}

// POST /api/matches/:id/advance - umpire-triggered innings handoff or
// match termination.
pub async fn advance_innings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Match>> {
    println!("🔁 POST /api/matches/{}/advance called", id);

    let collection = matches_collection(&state);
    let object_id = ObjectId::parse_str(&id)
        .map_err(|_| AppError::invalid_data("Invalid match ID format"))?;

    let current = fetch_match(&collection, &object_id).await?;
    let updated = engine::advance(&current)?;

    let update = doc! {
        "$set": {
            "score": updated.score,
            "outs": updated.outs,
            "innings": bson::to_bson(&updated.innings)?,
            "result": updated.result.clone(),
            "isOngoing": updated.is_ongoing,
            "balls": bson::to_bson(&updated.balls)?,
            "updatedAt": BsonDateTime::from_chrono(Utc::now()),
        }
    };
    collection
        .update_one(doc! { "_id": object_id }, update)
        .await?;

    if updated.is_decided() {
        println!("✅ Match {} concluded: {}", id, updated.result);
    } else {
        println!("✅ Match {} moved to the second innings", id);
    }
    Ok(Json(updated))
}

// GET /api/matches/:id/summary
pub async fn get_match_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MatchSummary>> {
    let collection = matches_collection(&state);
    let object_id = ObjectId::parse_str(&id)
        .map_err(|_| AppError::invalid_data("Invalid match ID format"))?;

    let match_doc = fetch_match(&collection, &object_id).await?;
    Ok(Json(engine::match_summary(&match_doc)))
}

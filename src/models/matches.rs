use mongodb::bson::{self, doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, Result};

/// Delivery classification. A ball carrying no extra type is a legal
/// delivery and counts toward the 6-ball over limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraType {
    Wide,
    Noball,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TossDecision {
    Bat,
    Bowl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InningsHalf {
    First,
    Second,
}

// One recorded delivery. Wire format matches the stored document exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ball {
    pub runs: i32,
    #[serde(default)]
    pub is_out: bool,
    #[serde(default)]
    pub extra_type: Option<ExtraType>,
}

impl Ball {
    pub fn is_legal(&self) -> bool {
        self.extra_type.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Over {
    pub over_number: u32,
    #[serde(default)]
    pub balls: Vec<Ball>,
    #[serde(default)]
    pub bowler: String,
}

impl Over {
    pub fn legal_ball_count(&self) -> usize {
        self.balls.iter().filter(|b| b.is_legal()).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Innings {
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub history: Vec<Over>,
}

// Main Match model - one document per match in the `matches` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub team_a: Vec<String>,
    pub team_b: Vec<String>,
    pub overs: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<ObjectId>,

    #[serde(default)]
    pub toss_winner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toss_decision: Option<TossDecision>,

    // Mirrors of the active innings, updated on every scoring event.
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub outs: i32,

    pub is_ongoing: bool,
    pub innings: InningsHalf,
    #[serde(default)]
    pub result: String,

    pub innings1: Innings,
    pub innings2: Innings,

    // Flat event log for the active innings, cleared at the handoff.
    #[serde(default)]
    pub balls: Vec<Ball>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

impl Match {
    pub fn active_innings(&self) -> &Innings {
        match self.innings {
            InningsHalf::First => &self.innings1,
            InningsHalf::Second => &self.innings2,
        }
    }

    pub fn active_innings_mut(&mut self) -> &mut Innings {
        match self.innings {
            InningsHalf::First => &mut self.innings1,
            InningsHalf::Second => &mut self.innings2,
        }
    }

    /// Roster of the side currently batting. The batting team is identified
    /// by name: innings team name against teamA's slot-0 entry.
    pub fn batting_roster(&self) -> &[String] {
        let batting_team = &self.active_innings().team;
        if self.team_a.first() == Some(batting_team) {
            &self.team_a
        } else {
            &self.team_b
        }
    }

    /// Number of actual batters on the batting side. Slot 0 of a roster
    /// holds the team name, not a player.
    pub fn batting_player_count(&self) -> i32 {
        self.batting_roster().len().saturating_sub(1) as i32
    }

    pub fn is_decided(&self) -> bool {
        !self.result.is_empty()
    }
}

// For creating new matches
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    // Roster emptiness is a ConfigurationError, checked in the handler so
    // match setup fails there rather than at scoring time.
    pub team_a: Vec<String>,
    pub team_b: Vec<String>,
    #[validate(range(min = 1, message = "overs must be at least 1"))]
    pub overs: u32,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl CreateMatchRequest {
    pub fn into_match(self, session_id: Option<ObjectId>) -> Match {
        Match {
            id: None,
            team_a: self.team_a,
            team_b: self.team_b,
            overs: self.overs,
            session_id,
            toss_winner: String::new(),
            toss_decision: None,
            score: 0,
            outs: 0,
            is_ongoing: true,
            innings: InningsHalf::First,
            result: String::new(),
            innings1: Innings::default(),
            innings2: Innings::default(),
            balls: Vec::new(),
            created_at: Some(BsonDateTime::from_chrono(chrono::Utc::now())),
            updated_at: Some(BsonDateTime::from_chrono(chrono::Utc::now())),
        }
    }
}

// One scoring event from the umpire: runs completed, dismissal flag,
// optional extra classification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEvent {
    pub runs: i32,
    #[serde(default)]
    pub is_out: bool,
    #[serde(default)]
    pub extra_type: Option<ExtraType>,
}

// Whitelisted partial update for PATCH /api/matches/:id. Anything not
// listed here is dropped from the payload.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPatch {
    pub score: Option<i32>,
    pub outs: Option<i32>,
    pub result: Option<String>,
    pub is_ongoing: Option<bool>,
    pub innings: Option<InningsHalf>,
    pub innings1: Option<Innings>,
    pub innings2: Option<Innings>,
    pub balls: Option<Vec<Ball>>,
    pub toss_winner: Option<String>,
    pub toss_decision: Option<TossDecision>,
    pub team_a: Option<Vec<String>>,
    pub team_b: Option<Vec<String>>,
    pub overs: Option<u32>,
}

impl MatchPatch {
    /// Builds the `$set` body from whichever fields were provided.
    /// Returns a ValidationError when nothing recognizable was sent.
    pub fn into_set_document(self) -> Result<Document> {
        let mut set = doc! {};

        if let Some(score) = self.score {
            set.insert("score", score);
        }
        if let Some(outs) = self.outs {
            set.insert("outs", outs);
        }
        if let Some(result) = self.result {
            set.insert("result", result);
        }
        if let Some(is_ongoing) = self.is_ongoing {
            set.insert("isOngoing", is_ongoing);
        }
        if let Some(innings) = self.innings {
            set.insert("innings", bson::to_bson(&innings)?);
        }
        if let Some(innings1) = self.innings1 {
            set.insert("innings1", bson::to_bson(&innings1)?);
        }
        if let Some(innings2) = self.innings2 {
            set.insert("innings2", bson::to_bson(&innings2)?);
        }
        if let Some(balls) = self.balls {
            set.insert("balls", bson::to_bson(&balls)?);
        }
        if let Some(toss_winner) = self.toss_winner {
            set.insert("tossWinner", toss_winner);
        }
        if let Some(toss_decision) = self.toss_decision {
            set.insert("tossDecision", bson::to_bson(&toss_decision)?);
        }
        if let Some(team_a) = self.team_a {
            set.insert("teamA", team_a);
        }
        if let Some(team_b) = self.team_b {
            set.insert("teamB", team_b);
        }
        if let Some(overs) = self.overs {
            if overs == 0 {
                return Err(AppError::invalid_data("overs must be at least 1"));
            }
            set.insert("overs", overs as i64);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ball_wire_format_matches_stored_documents() {
        let ball: Ball = serde_json::from_str(r#"{"runs":1,"isOut":false,"extraType":"wide"}"#)
            .expect("ball json");
        assert_eq!(ball.runs, 1);
        assert_eq!(ball.extra_type, Some(ExtraType::Wide));
        assert!(!ball.is_legal());

        // extraType omitted entirely is a legal delivery
        let legal: Ball = serde_json::from_str(r#"{"runs":4}"#).expect("ball json");
        assert!(legal.is_legal());
        assert!(!legal.is_out);
    }

    #[test]
    fn batting_roster_resolves_by_team_name() {
        let mut m = CreateMatchRequest {
            team_a: vec!["Strikers".into(), "Asha".into(), "Bilal".into()],
            team_b: vec!["Rovers".into(), "Chitra".into()],
            overs: 2,
            session_id: None,
        }
        .into_match(None);
        m.innings1.team = "Rovers".into();

        assert_eq!(m.batting_roster()[0], "Rovers");
        assert_eq!(m.batting_player_count(), 1);
    }

    #[test]
    fn empty_patch_is_rejected() {
        let patch = MatchPatch::default();
        assert!(patch.into_set_document().is_err());
    }

    #[test]
    fn patch_whitelists_and_renames_fields() {
        let patch: MatchPatch =
            serde_json::from_str(r#"{"score":10,"isOngoing":false,"bogus":1}"#).expect("patch");
        let set = patch.into_set_document().expect("set doc");
        assert_eq!(set.get_i32("score").unwrap(), 10);
        assert!(!set.get_bool("isOngoing").unwrap());
        assert!(!set.contains_key("bogus"));
    }
}

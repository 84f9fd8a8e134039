//! Innings handoff and match termination.
//!
//! The state machine runs InFirstInnings -> InSecondInnings -> MatchOver and
//! never reverses. Undo is the caller replaying a saved snapshot through the
//! raw PATCH surface, not event inversion.

use serde::Serialize;
use thiserror::Error;

use crate::models::matches::{InningsHalf, Match};

use super::event::chase_won_result;
use super::overs::legal_ball_count;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchPhase {
    InFirstInnings,
    InSecondInnings,
    MatchOver,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdvanceError {
    #[error("match already has a result")]
    MatchAlreadyDecided,
    #[error("innings end condition not met")]
    InningsInProgress,
}

/// Current phase, derived from the document rather than held as state.
pub fn phase(m: &Match) -> MatchPhase {
    if m.is_decided() || !m.is_ongoing {
        MatchPhase::MatchOver
    } else {
        match m.innings {
            InningsHalf::First => MatchPhase::InFirstInnings,
            InningsHalf::Second => MatchPhase::InSecondInnings,
        }
    }
}

/// The active innings ends when the allotted overs are bowled out or the
/// batting side has no batters left.
pub fn innings_ended(m: &Match) -> bool {
    let legal_balls = legal_ball_count(&m.active_innings().history);
    let overs_done = legal_balls >= (m.overs as usize) * 6;
    let player_count = m.batting_player_count();
    let all_out = player_count > 0 && m.outs >= player_count;
    overs_done || all_out
}

/// Umpire-triggered transition: first innings to second, or second innings
/// to the final result. Requires the end condition to hold; a chase that
/// already finished sets the result inside the event processor and makes
/// this call a MatchAlreadyDecided error.
pub fn advance(current: &Match) -> Result<Match, AdvanceError> {
    if current.is_decided() {
        return Err(AdvanceError::MatchAlreadyDecided);
    }
    if !innings_ended(current) {
        return Err(AdvanceError::InningsInProgress);
    }

    let mut next = current.clone();
    match next.innings {
        InningsHalf::First => {
            next.score = 0;
            next.outs = 0;
            next.balls.clear();
            next.innings = InningsHalf::Second;
        }
        InningsHalf::Second => {
            next.result = final_result(&next);
            next.is_ongoing = false;
        }
    }
    Ok(next)
}

fn final_result(m: &Match) -> String {
    let first = m.innings1.score;
    let second = m.innings2.score;

    if second > first {
        chase_won_result(m)
    } else if first > second {
        let margin = first - second;
        format!(
            "{} won by {} {}.",
            m.innings1.team,
            margin,
            if margin == 1 { "run" } else { "runs" }
        )
    } else {
        "Match Tied".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::event::apply_score_event;
    use crate::models::matches::{CreateMatchRequest, ScoreEvent};

    fn match_with_rosters(overs: u32, a: usize, b: usize) -> Match {
        let team_a: Vec<String> = std::iter::once("Strikers".to_string())
            .chain((1..=a).map(|i| format!("A{i}")))
            .collect();
        let team_b: Vec<String> = std::iter::once("Rovers".to_string())
            .chain((1..=b).map(|i| format!("B{i}")))
            .collect();
        let mut m = CreateMatchRequest {
            team_a,
            team_b,
            overs,
            session_id: None,
        }
        .into_match(None);
        m.innings1.team = "Strikers".into();
        m.innings2.team = "Rovers".into();
        m
    }

    fn legal(runs: i32) -> ScoreEvent {
        ScoreEvent {
            runs,
            is_out: false,
            extra_type: None,
        }
    }

    fn play_over(mut m: Match, runs: [i32; 6]) -> Match {
        for r in runs {
            m = apply_score_event(&m, &legal(r)).unwrap();
        }
        m
    }

    #[test]
    fn advance_is_refused_mid_innings() {
        let m = match_with_rosters(1, 4, 4);
        assert_eq!(advance(&m), Err(AdvanceError::InningsInProgress));
        assert_eq!(phase(&m), MatchPhase::InFirstInnings);
    }

    #[test]
    fn handoff_resets_the_mirrors_and_keeps_innings1() {
        let m = play_over(match_with_rosters(1, 4, 4), [4, 1, 0, 6, 2, 1]);
        assert!(innings_ended(&m));

        let m = advance(&m).unwrap();
        assert_eq!(m.innings, InningsHalf::Second);
        assert_eq!(phase(&m), MatchPhase::InSecondInnings);
        assert_eq!(m.score, 0);
        assert_eq!(m.outs, 0);
        assert!(m.balls.is_empty());
        // The first-innings record survives untouched.
        assert_eq!(m.innings1.score, 14);
        assert_eq!(m.innings1.history.len(), 1);
    }

    #[test]
    fn outs_reset_exactly_once_across_the_match() {
        let mut m = match_with_rosters(1, 4, 4);
        m = apply_score_event(&m, &ScoreEvent { runs: 0, is_out: true, extra_type: None }).unwrap();
        m = play_over(m, [0, 0, 0, 0, 0, 0]);
        assert_eq!(m.outs, 1);

        m = advance(&m).unwrap();
        assert_eq!(m.outs, 0);

        m = apply_score_event(&m, &ScoreEvent { runs: 0, is_out: true, extra_type: None }).unwrap();
        assert_eq!(m.outs, 1);
    }

    #[test]
    fn all_out_ends_the_innings_before_the_overs_run_out() {
        let mut m = match_with_rosters(10, 2, 2);
        for _ in 0..2 {
            m = apply_score_event(&m, &ScoreEvent { runs: 0, is_out: true, extra_type: None })
                .unwrap();
        }
        assert!(innings_ended(&m));
        assert!(advance(&m).is_ok());
    }

    #[test]
    fn defending_side_wins_by_runs() {
        let m = play_over(match_with_rosters(1, 4, 4), [4, 4, 4, 4, 4, 4]);
        let m = advance(&m).unwrap();
        assert_eq!(m.innings1.score, 24);

        let m = play_over(m, [4, 4, 4, 4, 2, 1]);
        assert!(m.result.is_empty());
        let m = advance(&m).unwrap();
        assert_eq!(m.result, "Strikers won by 5 runs.");
        assert!(!m.is_ongoing);
        assert_eq!(phase(&m), MatchPhase::MatchOver);
    }

    #[test]
    fn one_run_margin_is_singular() {
        let mut m = match_with_rosters(1, 4, 4);
        m.innings1.score = 60;
        m.innings = InningsHalf::Second;
        m = play_over(m, [10, 10, 10, 10, 10, 9]);
        let m = advance(&m).unwrap();
        assert_eq!(m.result, "Strikers won by 1 run.");
    }

    #[test]
    fn level_scores_tie_the_match() {
        let mut m = match_with_rosters(1, 4, 4);
        m.innings1.score = 40;
        m.innings = InningsHalf::Second;
        m = play_over(m, [10, 10, 10, 10, 0, 0]);
        let m = advance(&m).unwrap();
        assert_eq!(m.result, "Match Tied");
        assert!(!m.is_ongoing);
    }

    #[test]
    fn decided_match_refuses_further_transitions() {
        let mut m = match_with_rosters(1, 4, 4);
        m.result = "Match Tied".into();
        m.is_ongoing = false;
        assert_eq!(advance(&m), Err(AdvanceError::MatchAlreadyDecided));
    }
}

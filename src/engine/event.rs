//! The score event processor: one umpire event in, the next match state out.
//!
//! Pure and synchronous. The caller owns persistence; a returned state that
//! fails to save is simply discarded and the authoritative document
//! re-fetched.

use crate::models::matches::{Ball, InningsHalf, Match, ScoreEvent};

/// Applies a single scoring event to a copy of the match.
///
/// Returns None when the match already has a result: the event is ignored
/// without touching any state. Otherwise the new state carries the updated
/// active-innings score (mirrored into the top-level `score`), the wicket
/// count, the appended ball in both the flat log and the over history, and,
/// when the event completes the chase, the final result text.
pub fn apply_score_event(current: &Match, event: &ScoreEvent) -> Option<Match> {
    if current.is_decided() {
        return None;
    }

    let mut next = current.clone();

    let innings = next.active_innings_mut();
    innings.score += event.runs;
    next.score = next.active_innings().score;
    if event.is_out {
        next.outs += 1;
    }

    let ball = Ball {
        runs: event.runs,
        is_out: event.is_out,
        extra_type: event.extra_type,
    };
    next.balls.push(ball.clone());
    super::overs::append_ball(&mut next.active_innings_mut().history, ball);

    if next.innings == InningsHalf::Second && next.score > next.innings1.score {
        next.is_ongoing = false;
        next.result = chase_won_result(&next);
    }

    Some(next)
}

/// Result text for a successful chase. The margin is the count of unused
/// batting slots, floored at 1 so a last-man-standing side still wins by
/// one wicket.
pub(crate) fn chase_won_result(m: &Match) -> String {
    let wickets_left = (m.batting_player_count() - m.outs).max(1);
    format!(
        "{} won by {} {}.",
        m.innings2.team,
        wickets_left,
        if wickets_left == 1 { "wicket" } else { "wickets" }
    )
}

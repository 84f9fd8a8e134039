//! Post-innings aggregates for the scorecard and charts. Pure reads over the
//! recorded over history; nothing here touches the database.

use serde::Serialize;

use crate::models::matches::{ExtraType, Innings, InningsHalf, Match};

use super::innings::{innings_ended, phase, MatchPhase};
use super::overs::{legal_ball_count, overs_display};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringBreakdown {
    pub singles: u32,
    pub doubles: u32,
    pub threes: u32,
    pub fours: u32,
    pub sixes: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsSummary {
    pub team: String,
    pub score: i32,
    pub wickets: u32,
    pub legal_balls: u32,
    pub overs_display: String,
    pub run_rate: f64,
    pub dots: u32,
    pub wides: u32,
    pub noballs: u32,
    pub extras: u32,
    pub breakdown: ScoringBreakdown,
    pub runs_from_boundaries: i32,
    pub runs_from_running: i32,
    pub runs_per_over: Vec<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub phase: MatchPhase,
    pub innings: InningsHalf,
    pub innings_ended: bool,
    pub score: i32,
    pub outs: i32,
    pub overs: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<i32>,
    pub result: String,
    pub is_ongoing: bool,
    pub toss_winner: String,
    pub innings1: InningsSummary,
    pub innings2: InningsSummary,
}

pub fn innings_summary(innings: &Innings) -> InningsSummary {
    let all_balls = || innings.history.iter().flat_map(|o| o.balls.iter());

    let legal_balls = legal_ball_count(&innings.history) as u32;
    let overs_faced = f64::from(legal_balls) / 6.0;
    let run_rate = if legal_balls > 0 {
        (f64::from(innings.score) / overs_faced * 100.0).round() / 100.0
    } else {
        0.0
    };

    let wickets = all_balls().filter(|b| b.is_out).count() as u32;
    let dots = all_balls()
        .filter(|b| b.is_legal() && b.runs == 0 && !b.is_out)
        .count() as u32;
    let wides = all_balls()
        .filter(|b| b.extra_type == Some(ExtraType::Wide))
        .count() as u32;
    let noballs = all_balls()
        .filter(|b| b.extra_type == Some(ExtraType::Noball))
        .count() as u32;

    // Boundary counts include extras (a no-ball hit for four is a four);
    // running counts come off legal deliveries only.
    let fours = all_balls().filter(|b| b.runs == 4).count() as u32;
    let sixes = all_balls().filter(|b| b.runs == 6).count() as u32;
    let count_legal_runs =
        |n: i32| all_balls().filter(|b| b.is_legal() && b.runs == n).count() as u32;
    let breakdown = ScoringBreakdown {
        singles: count_legal_runs(1),
        doubles: count_legal_runs(2),
        threes: count_legal_runs(3),
        fours,
        sixes,
    };

    let runs_from_boundaries = (fours * 4 + sixes * 6) as i32;
    let runs_from_running =
        (breakdown.singles + breakdown.doubles * 2 + breakdown.threes * 3) as i32;

    let runs_per_over = innings
        .history
        .iter()
        .map(|o| o.balls.iter().map(|b| b.runs).sum())
        .collect();

    InningsSummary {
        team: innings.team.clone(),
        score: innings.score,
        wickets,
        legal_balls,
        overs_display: overs_display(&innings.history),
        run_rate,
        dots,
        wides,
        noballs,
        extras: wides + noballs,
        breakdown,
        runs_from_boundaries,
        runs_from_running,
        runs_per_over,
    }
}

pub fn match_summary(m: &Match) -> MatchSummary {
    let phase = phase(m);
    let target = if m.innings == InningsHalf::Second && m.is_ongoing {
        Some(m.innings1.score + 1)
    } else {
        None
    };

    MatchSummary {
        phase,
        innings: m.innings,
        innings_ended: innings_ended(m),
        score: m.score,
        outs: m.outs,
        overs: m.overs,
        target,
        result: m.result.clone(),
        is_ongoing: m.is_ongoing,
        toss_winner: m.toss_winner.clone(),
        innings1: innings_summary(&m.innings1),
        innings2: innings_summary(&m.innings2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::event::apply_score_event;
    use crate::models::matches::{CreateMatchRequest, ScoreEvent};

    fn scored_innings() -> Innings {
        let mut m = CreateMatchRequest {
            team_a: vec!["Strikers".into(), "Asha".into(), "Bilal".into()],
            team_b: vec!["Rovers".into(), "Chitra".into(), "Dev".into()],
            overs: 2,
            session_id: None,
        }
        .into_match(None);
        m.innings1.team = "Strikers".into();

        for (runs, out, extra) in [
            (4, false, None),
            (1, false, None),
            (0, false, None),
            (1, false, Some(ExtraType::Wide)),
            (6, false, None),
            (2, false, None),
            (0, true, None),
            // second over
            (3, false, None),
            (4, false, Some(ExtraType::Noball)),
        ] {
            m = apply_score_event(
                &m,
                &ScoreEvent {
                    runs,
                    is_out: out,
                    extra_type: extra,
                },
            )
            .unwrap();
        }
        m.innings1
    }

    #[test]
    fn summary_counts_only_what_was_recorded() {
        let s = innings_summary(&scored_innings());

        assert_eq!(s.score, 21);
        assert_eq!(s.wickets, 1);
        assert_eq!(s.legal_balls, 7);
        assert_eq!(s.overs_display, "1.1");
        assert_eq!(s.dots, 1);
        assert_eq!(s.wides, 1);
        assert_eq!(s.noballs, 1);
        assert_eq!(s.extras, 2);
        assert_eq!(s.breakdown.singles, 1);
        assert_eq!(s.breakdown.doubles, 1);
        assert_eq!(s.breakdown.threes, 1);
        // The no-ball four still counts as a boundary.
        assert_eq!(s.breakdown.fours, 2);
        assert_eq!(s.breakdown.sixes, 1);
        assert_eq!(s.runs_from_boundaries, 14);
        assert_eq!(s.runs_from_running, 6);
        assert_eq!(s.runs_per_over, vec![14, 7]);
    }

    #[test]
    fn run_rate_is_score_over_overs_faced() {
        let s = innings_summary(&scored_innings());
        // 21 runs off 7 legal balls = 21 / (7/6) = 18.0
        assert_eq!(s.run_rate, 18.0);

        assert_eq!(innings_summary(&Innings::default()).run_rate, 0.0);
    }

    #[test]
    fn target_appears_only_during_a_live_chase() {
        let mut m = CreateMatchRequest {
            team_a: vec!["Strikers".into(), "Asha".into()],
            team_b: vec!["Rovers".into(), "Bilal".into()],
            overs: 1,
            session_id: None,
        }
        .into_match(None);
        m.innings1.team = "Strikers".into();
        m.innings2.team = "Rovers".into();

        assert_eq!(match_summary(&m).target, None);

        m.innings1.score = 12;
        m.innings = InningsHalf::Second;
        assert_eq!(match_summary(&m).target, Some(13));

        m.result = "Rovers won by 1 wicket.".into();
        m.is_ongoing = false;
        let s = match_summary(&m);
        assert_eq!(s.target, None);
        assert_eq!(s.phase, MatchPhase::MatchOver);
    }
}

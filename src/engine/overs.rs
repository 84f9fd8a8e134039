//! Ball-to-over bookkeeping.
//!
//! An over holds up to 6 legal deliveries. Wides and no-balls attach to the
//! over in progress without counting toward the limit, and never open a new
//! over by themselves: the rollover happens lazily, when the next legal ball
//! arrives against a full over.

use crate::models::matches::{Ball, Over};

/// Appends one delivery to the over history, starting a new over when the
/// current one already holds 6 legal balls and the incoming ball is legal.
pub fn append_ball(history: &mut Vec<Over>, ball: Ball) {
    let over_number = match history.last_mut() {
        Some(last) if !(ball.is_legal() && last.legal_ball_count() >= 6) => {
            last.balls.push(ball);
            return;
        }
        Some(last) => last.over_number + 1,
        None => 1,
    };

    history.push(Over {
        over_number,
        balls: vec![ball],
        bowler: String::new(),
    });
}

/// Legal deliveries bowled across the whole innings.
pub fn legal_ball_count(history: &[Over]) -> usize {
    history.iter().map(|o| o.legal_ball_count()).sum()
}

/// Overs-bowled display string: completed overs, dot, balls into the
/// current over. 13 legal balls -> "2.1".
pub fn overs_display(history: &[Over]) -> String {
    let legal = legal_ball_count(history);
    format!("{}.{}", legal / 6, legal % 6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matches::ExtraType;

    fn legal(runs: i32) -> Ball {
        Ball {
            runs,
            is_out: false,
            extra_type: None,
        }
    }

    fn extra(runs: i32, kind: ExtraType) -> Ball {
        Ball {
            runs,
            is_out: false,
            extra_type: Some(kind),
        }
    }

    #[test]
    fn six_legal_balls_fill_an_over() {
        let mut history = Vec::new();
        for _ in 0..6 {
            append_ball(&mut history, legal(1));
        }
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].over_number, 1);
        assert_eq!(history[0].legal_ball_count(), 6);
    }

    #[test]
    fn seventh_legal_ball_opens_the_next_over() {
        let mut history = Vec::new();
        for _ in 0..7 {
            append_ball(&mut history, legal(0));
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].over_number, 2);
        assert_eq!(history[1].balls.len(), 1);
        // No over ever exceeds 6 legal balls.
        assert!(history.iter().all(|o| o.legal_ball_count() <= 6));
    }

    #[test]
    fn extras_do_not_count_toward_the_over_limit() {
        let mut history = Vec::new();
        for _ in 0..5 {
            append_ball(&mut history, legal(0));
        }
        append_ball(&mut history, extra(1, ExtraType::Wide));
        append_ball(&mut history, extra(2, ExtraType::Noball));
        append_ball(&mut history, legal(0));

        // 5 legal + 2 extras + 1 legal all fit in the first over.
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].balls.len(), 8);
        assert_eq!(history[0].legal_ball_count(), 6);
        assert_eq!(legal_ball_count(&history), 6);
    }

    #[test]
    fn extra_against_a_full_over_stays_in_that_over() {
        let mut history = Vec::new();
        for _ in 0..6 {
            append_ball(&mut history, legal(1));
        }
        // Wide bowled while the over is full: joins the full over. Only the
        // next legal ball rolls over.
        append_ball(&mut history, extra(1, ExtraType::Wide));
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].balls.len(), 7);

        append_ball(&mut history, legal(4));
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].balls.len(), 1);
    }

    #[test]
    fn overs_display_counts_only_legal_balls() {
        let mut history = Vec::new();
        assert_eq!(overs_display(&history), "0.0");
        for _ in 0..13 {
            append_ball(&mut history, legal(0));
        }
        append_ball(&mut history, extra(1, ExtraType::Wide));
        assert_eq!(overs_display(&history), "2.1");
    }
}

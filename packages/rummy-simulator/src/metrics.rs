//! Metrics collection and output for simulation results.

use serde::Serialize;

use crate::simulator::{GameResult, RoundRecord};

/// Complete game metrics for output.
#[derive(Debug, Clone, Serialize)]
pub struct GameMetrics {
    pub game_num: u32,
    pub game_id: String,
    pub seed: u64,
    pub timestamp: String,
    pub ai_types: [String; 2],
    pub final_scores: [i32; 2],
    /// "player1", "player2" or "tie".
    pub winner: String,
    pub actions: usize,
    pub stalled_rounds: usize,
    pub duration_ms: f64,
    pub rounds: Vec<RoundRecord>,
}

/// One CSV row per game.
#[derive(Debug, Clone, Serialize)]
pub struct CsvSummaryRow {
    pub game_num: u32,
    pub game_id: String,
    pub seed: u64,
    pub rounds: usize,
    pub winner: String,
    pub player1_score: i32,
    pub player2_score: i32,
    pub player1_ai: String,
    pub player2_ai: String,
    pub stalled_rounds: usize,
}

impl From<&GameMetrics> for CsvSummaryRow {
    fn from(m: &GameMetrics) -> Self {
        Self {
            game_num: m.game_num,
            game_id: m.game_id.clone(),
            seed: m.seed,
            rounds: m.rounds.len(),
            winner: m.winner.clone(),
            player1_score: m.final_scores[0],
            player2_score: m.final_scores[1],
            player1_ai: m.ai_types[0].clone(),
            player2_ai: m.ai_types[1].clone(),
            stalled_rounds: m.stalled_rounds,
        }
    }
}

pub fn build_game_metrics(
    game_num: u32,
    seed: u64,
    ai_types: [String; 2],
    result: &GameResult,
    duration_ms: f64,
) -> GameMetrics {
    let timestamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());
    let winner = result
        .winner()
        .map_or_else(|| "tie".to_string(), |slot| slot.key().to_string());

    GameMetrics {
        game_num,
        game_id: result.game_id.clone(),
        seed,
        timestamp,
        ai_types,
        final_scores: result.final_scores,
        winner,
        actions: result.actions,
        stalled_rounds: result.rounds.iter().filter(|r| r.stalled).count(),
        duration_ms,
        rounds: result.rounds.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(scores: [i32; 2]) -> GameResult {
        GameResult {
            game_id: "ABC234".into(),
            rounds: vec![
                RoundRecord {
                    round: 1,
                    player1_delta: scores[0],
                    player2_delta: scores[1],
                    turns: 12,
                    stalled: false,
                },
                RoundRecord {
                    round: 2,
                    player1_delta: 0,
                    player2_delta: 0,
                    turns: 501,
                    stalled: true,
                },
            ],
            final_scores: scores,
            actions: 40,
        }
    }

    #[test]
    fn summary_row_reflects_metrics() {
        let metrics = build_game_metrics(
            3,
            42,
            ["Greedy".into(), "RandomPlayer".into()],
            &result([30, -5]),
            1.5,
        );
        assert_eq!(metrics.winner, "player1");
        assert_eq!(metrics.stalled_rounds, 1);

        let row = CsvSummaryRow::from(&metrics);
        assert_eq!(row.rounds, 2);
        assert_eq!(row.player2_score, -5);
        assert_eq!(row.player2_ai, "RandomPlayer");
    }

    #[test]
    fn equal_totals_are_a_tie() {
        let metrics = build_game_metrics(1, 1, ["Greedy".into(), "Greedy".into()], &result([10, 10]), 0.0);
        assert_eq!(metrics.winner, "tie");
    }
}

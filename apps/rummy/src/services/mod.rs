pub mod game_flow;

pub use game_flow::{ActionOutcome, AiTurn, GameFlowService, GameSession, JoinOutcome};

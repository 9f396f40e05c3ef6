//! Turn-level transitions: draw, discard pickup, meld, lay-off, discard, go out.
//!
//! Each function reads a `GameState`, checks that the move is legal for the
//! acting seat, and returns a `Move` describing the partial write. Nothing
//! here mutates state; a rejected move never produces a write.

use rand::Rng;
use tracing::debug;

use crate::domain::cards_logic::display_name;
use crate::domain::dealing::shuffle_deck;
use crate::domain::game_update::GameUpdate;
use crate::domain::melds::{validate_lay_off, validate_meld};
use crate::domain::state::{require_player, require_turn, GameState, GameStatus, PlayerSlot, TurnPhase};
use crate::domain::Card;
use crate::errors::domain::{DomainError, TransitionKind, ValidationKind};

/// Result of a legal turn action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub update: GameUpdate,
    /// Card that must be melded or laid off before this turn may discard.
    pub must_play: Option<Card>,
    /// The acting hand is empty after this write; the round must be scored next.
    pub goes_out: bool,
}

impl Move {
    fn new(update: GameUpdate, must_play: Option<Card>) -> Self {
        Self {
            update,
            must_play,
            goes_out: false,
        }
    }
}

/// Address of a meld on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeldRef {
    pub owner: PlayerSlot,
    pub index: usize,
}

fn take_from_hand(hand: &mut Vec<Card>, card: Card) -> Result<(), DomainError> {
    let pos = hand.iter().position(|c| *c == card).ok_or_else(|| {
        DomainError::validation(ValidationKind::CardNotInHand, "Card not in hand")
    })?;
    hand.remove(pos);
    Ok(())
}

fn went_out(name: &str) -> String {
    format!("{name} went out!")
}

/// Draw the head of the stock. An empty stock is rebuilt from the discard
/// pile minus its top card; with one card or fewer in discard the draw is refused.
pub fn draw_from_deck<R: Rng + ?Sized>(
    state: &GameState,
    actor: PlayerSlot,
    rng: &mut R,
) -> Result<Move, DomainError> {
    require_turn(state, actor, TurnPhase::Draw)?;
    let player = require_player(state, actor)?;

    let (mut deck, discard, reshuffled) = if state.deck.is_empty() {
        if state.discard.len() <= 1 {
            return Err(DomainError::validation(
                ValidationKind::NothingToDraw,
                "No cards to draw!",
            ));
        }
        let (top, rest) = state
            .discard
            .split_last()
            .ok_or_else(|| DomainError::validation(ValidationKind::NothingToDraw, "No cards to draw!"))?;
        (shuffle_deck(rest, rng), Some(vec![*top]), true)
    } else {
        (state.deck.clone(), None, false)
    };

    let card = deck.remove(0);
    let mut hand = player.hand.clone();
    hand.push(card);
    debug!(game_id = %state.game_id, slot = %actor, reshuffled, "draw from deck");

    let text = if reshuffled {
        format!("{} drew from the deck (reshuffled)", player.name)
    } else {
        format!("{} drew from the deck", player.name)
    };
    let mut update = GameUpdate::new()
        .with_deck(deck)
        .with_status(GameStatus::Playing(TurnPhase::Play))
        .with_hand(actor, hand)
        .with_last_action(text);
    if let Some(discard) = discard {
        update = update.with_discard(discard);
    }
    Ok(Move::new(update, None))
}

/// Take the discard card at `index` together with every card stacked above it.
///
/// Picking up more than one card obliges the player to meld or lay off the
/// deepest card before discarding this turn.
pub fn pick_up_discard(
    state: &GameState,
    actor: PlayerSlot,
    index: usize,
) -> Result<Move, DomainError> {
    require_turn(state, actor, TurnPhase::Draw)?;
    let player = require_player(state, actor)?;
    if index >= state.discard.len() {
        return Err(DomainError::validation(
            ValidationKind::InvalidIndex,
            format!("No discard card at position {index}"),
        ));
    }

    let (remaining, picked) = state.discard.split_at(index);
    let mut hand = player.hand.clone();
    hand.extend_from_slice(picked);
    let must_play = if picked.len() > 1 { Some(picked[0]) } else { None };
    debug!(game_id = %state.game_id, slot = %actor, index, count = picked.len(), "pick up discard");

    let text = match picked {
        [single] => format!("{} picked up {} from discard", player.name, display_name(*single)),
        _ => format!("{} picked up {} cards from discard", player.name, picked.len()),
    };
    let update = GameUpdate::new()
        .with_discard(remaining.to_vec())
        .with_status(GameStatus::Playing(TurnPhase::Play))
        .with_hand(actor, hand)
        .with_last_action(text);
    Ok(Move::new(update, must_play))
}

/// Lay a new meld of three or more cards from the hand.
pub fn lay_down_meld(
    state: &GameState,
    actor: PlayerSlot,
    cards: &[Card],
    must_play: Option<Card>,
) -> Result<Move, DomainError> {
    require_turn(state, actor, TurnPhase::Play)?;
    let player = require_player(state, actor)?;
    validate_meld(cards)?;

    let mut hand = player.hand.clone();
    for card in cards {
        take_from_hand(&mut hand, *card)?;
    }
    let mut melds = player.melds.clone();
    melds.push(cards.to_vec());
    let must_play = must_play.filter(|c| !cards.contains(c));
    debug!(game_id = %state.game_id, slot = %actor, size = cards.len(), "lay down meld");

    let goes_out = hand.is_empty();
    let text = if goes_out {
        went_out(&player.name)
    } else {
        let shown: Vec<String> = cards.iter().map(|c| display_name(*c)).collect();
        format!("{} laid down a meld: {}", player.name, shown.join(" "))
    };
    let update = GameUpdate::new()
        .with_hand(actor, hand)
        .with_melds(actor, melds)
        .with_last_action(text);
    Ok(Move {
        update,
        must_play,
        goes_out,
    })
}

/// Append one hand card to any meld on the table, own or opponent's.
pub fn lay_off(
    state: &GameState,
    actor: PlayerSlot,
    card: Card,
    target: MeldRef,
    must_play: Option<Card>,
) -> Result<Move, DomainError> {
    require_turn(state, actor, TurnPhase::Play)?;
    let player = require_player(state, actor)?;
    let owner = require_player(state, target.owner)?;
    let meld = owner.melds.get(target.index).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::InvalidIndex,
            format!("No meld at position {}", target.index),
        )
    })?;
    validate_lay_off(card, meld)?;

    let mut hand = player.hand.clone();
    take_from_hand(&mut hand, card)?;
    let mut extended = meld.clone();
    extended.push(card);
    let must_play = must_play.filter(|c| *c != card);
    debug!(game_id = %state.game_id, slot = %actor, %card, owner = %target.owner, index = target.index, "lay off");

    let goes_out = hand.is_empty();
    let text = if goes_out {
        went_out(&player.name)
    } else {
        format!("{} laid off {}", player.name, display_name(card))
    };
    let update = GameUpdate::new()
        .with_hand(actor, hand)
        .with_meld_write(target.owner, target.index, extended)
        .with_last_action(text);
    Ok(Move {
        update,
        must_play,
        goes_out,
    })
}

/// Discard one card and pass the turn. Refused while a must-play card is outstanding.
///
/// Discarding the last card ends the round instead: the write carries no
/// phase or turn change.
pub fn discard(
    state: &GameState,
    actor: PlayerSlot,
    card: Card,
    must_play: Option<Card>,
) -> Result<Move, DomainError> {
    require_turn(state, actor, TurnPhase::Play)?;
    let player = require_player(state, actor)?;
    if let Some(pending) = must_play {
        return Err(DomainError::validation(
            ValidationKind::MustPlayOutstanding,
            format!("Must lay down {} before discarding", display_name(pending)),
        ));
    }

    let mut hand = player.hand.clone();
    take_from_hand(&mut hand, card)?;
    let mut pile = state.discard.clone();
    pile.push(card);
    debug!(game_id = %state.game_id, slot = %actor, %card, "discard");

    let goes_out = hand.is_empty();
    let mut update = GameUpdate::new()
        .with_hand(actor, hand)
        .with_discard(pile)
        .with_current_turn(actor.other())
        .with_status(GameStatus::Playing(TurnPhase::Draw));
    update = if goes_out {
        update.without_turn_handoff().with_last_action(went_out(&player.name))
    } else {
        update.with_last_action(format!("{} discarded {}", player.name, display_name(card)))
    };
    Ok(Move {
        update,
        must_play: None,
        goes_out,
    })
}

/// Explicit go-out call; only legal for the current player with an empty hand.
pub fn go_out(state: &GameState, actor: PlayerSlot) -> Result<Move, DomainError> {
    if !matches!(state.status, GameStatus::Playing(_)) {
        return Err(DomainError::illegal(
            TransitionKind::NotPlaying,
            "Round is not in play",
        ));
    }
    if !state.is_turn_of(actor) {
        return Err(DomainError::illegal(
            TransitionKind::NotYourTurn,
            "Not your turn",
        ));
    }
    let player = require_player(state, actor)?;
    if !player.hand.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::HandNotEmpty,
            "Play every card before going out",
        ));
    }
    let update = GameUpdate::new().with_last_action(went_out(&player.name));
    Ok(Move {
        update,
        must_play: None,
        goes_out: true,
    })
}

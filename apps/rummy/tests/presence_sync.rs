mod common;
mod support;

use rummy::domain::state::PlayerSlot;
use rummy::GameTransition;
use support::{started_game, state, World};

#[tokio::test]
async fn joining_marks_both_seats_online() {
    let world = World::new();
    let (_alice, mut a, _bob, _b) = started_game(&world).await;

    let game = state(&mut a);
    assert_eq!(game.player1.online, Some(true));
    assert_eq!(game.player2.as_ref().and_then(|p| p.online), Some(true));
}

#[tokio::test]
async fn dropped_connection_flags_seat_offline() {
    let world = World::new();
    let (_alice, mut a, bob, b) = started_game(&world).await;
    a.refresh().unwrap();
    let subscribers = world.store.subscriber_count();

    bob.connection.disconnect();
    drop(b);

    let transitions = a.next_change().await.unwrap();
    assert!(transitions.contains(&GameTransition::PresenceChanged {
        slot: PlayerSlot::Player2,
        online: false,
    }));
    let game = state(&mut a);
    let seat = game.player2.unwrap();
    assert_eq!(seat.online, Some(false));
    assert!(seat.last_seen.is_some());
    assert_eq!(game.player1.online, Some(true));
    assert!(world.store.subscriber_count() < subscribers);
}

#[tokio::test]
async fn resuming_brings_the_seat_back_online() {
    let world = World::new();
    let (_alice, mut a, bob, b) = started_game(&world).await;
    let code = b.game_id().to_string();
    let token = b.token().to_string();
    bob.connection.disconnect();
    a.refresh().unwrap();

    let phone = world.client(77);
    let resumed = phone.service.resume_with_token(&code, &token).await.unwrap();
    assert_eq!(resumed.slot(), PlayerSlot::Player2);

    let game = state(&mut a);
    assert_eq!(game.player2.and_then(|p| p.online), Some(true));
}

#[tokio::test]
async fn presence_notice_survives_an_intervening_action() {
    let world = World::new();
    let (alice, mut a, bob, b) = started_game(&world).await;
    assert!(a.is_my_turn());
    a.refresh().unwrap();

    bob.connection.disconnect();
    drop(b);
    alice.service.draw_from_deck(&mut a).await.unwrap();

    let seen = a.refresh().unwrap();
    assert!(seen.contains(&GameTransition::PresenceChanged {
        slot: PlayerSlot::Player2,
        online: false,
    }));
    assert!(a.refresh().unwrap().is_empty());
}

use cluedo_board::{Board, Item};
use cluedo_controller::{apply, Controller};
use cluedo_core::{
    AccusationOutcome, CellCoord, Claim, Command, Event, MoveError, MovePath, Player, PlayerId,
    Status, TurnError,
};
use cluedo_system_pathfinding::Pathfinder;

fn three_players(seed: u64) -> Controller {
    let board = Board::classic().expect("classic board builds");
    let mut controller = Controller::seeded(board, seed);
    controller
        .set_players(vec![
            Player::new("Ann", "Colonel Mustard"),
            Player::new("Bob", "Professor Plum"),
            Player::new("Cid", "Mrs. White"),
        ])
        .expect("players seated");
    controller.deal_cards().expect("cards dealt");
    controller
}

fn path(cells: &[(u32, u32)]) -> MovePath {
    cells
        .iter()
        .map(|(column, row)| CellCoord::new(*column, *row))
        .collect()
}

fn piece_cell(controller: &Controller, name: &str) -> CellCoord {
    controller
        .board()
        .item_by_name(name)
        .map(Item::cell)
        .expect("piece exists")
}

fn walk(controller: &mut Controller) {
    while controller.status() == Status::Moving {
        controller.tick().expect("step succeeds");
    }
}

/// Rolls one and steps a single square, leaving the turn waiting.
fn step_one_square(controller: &mut Controller, to: (u32, u32)) {
    controller.set_dice_roll(1).expect("roll");
    controller
        .attempt_player_move(path(&[to]))
        .expect("single step accepted");
    walk(controller);
    assert_eq!(controller.status(), Status::Waiting);
}

fn shuffle_one_square(controller: &mut Controller, to: (u32, u32)) {
    step_one_square(controller, to);
    let _ = controller.finish_turn().expect("turn finished");
}

fn wrong_claim(controller: &Controller) -> Claim {
    let solution = controller.solution().expect("solution drawn");
    let character = if solution.character() == "Colonel Mustard" {
        "Professor Plum"
    } else {
        "Colonel Mustard"
    };
    Claim::new(character, solution.weapon(), solution.room())
}

#[test]
fn three_step_path_into_room_ends_waiting() {
    let mut controller = three_players(1);
    shuffle_one_square(&mut controller, (1, 17));
    shuffle_one_square(&mut controller, (16, 23));
    shuffle_one_square(&mut controller, (9, 1));

    assert_eq!(controller.current(), Some(PlayerId::new(0)));
    controller.set_dice_roll(3).expect("roll");
    controller
        .attempt_player_move(path(&[(2, 17), (3, 17), (3, 18)]))
        .expect("path accepted");
    walk(&mut controller);

    assert_eq!(controller.status(), Status::Waiting);
    assert_eq!(controller.moves_remaining(), 0);
    let lounge = controller.board().room_by_name("Lounge").expect("lounge").id();
    let mustard = controller
        .board()
        .item_by_name("Colonel Mustard")
        .expect("mustard");
    assert_eq!(mustard.room(), lounge);
}

#[test]
fn entering_a_room_ends_movement_early() {
    let mut controller = three_players(2);
    controller.set_dice_roll(8).expect("roll");
    controller
        .attempt_player_move(path(&[(1, 17), (2, 17), (3, 17), (3, 18)]))
        .expect("path accepted");
    walk(&mut controller);

    assert_eq!(controller.status(), Status::Waiting);
    assert_eq!(controller.moves_remaining(), 4);
    assert!(controller.current_path().is_empty());
}

#[test]
fn short_corridor_path_returns_to_move_selection() {
    let mut controller = three_players(3);
    controller.set_dice_roll(3).expect("roll");
    controller
        .attempt_player_move(path(&[(1, 17), (2, 17)]))
        .expect("path accepted");
    assert_eq!(controller.status(), Status::Moving);

    controller.tick().expect("first step");
    assert_eq!(controller.status(), Status::Moving);
    controller.tick().expect("second step");

    assert_eq!(controller.status(), Status::SelectingMove);
    assert_eq!(controller.moves_remaining(), 1);
    assert_eq!(piece_cell(&controller, "Colonel Mustard"), CellCoord::new(2, 17));
}

#[test]
fn running_out_of_moves_stops_the_walk() {
    let mut controller = three_players(4);
    controller.set_dice_roll(2).expect("roll");
    controller
        .attempt_player_move(path(&[(1, 17), (2, 17), (3, 17)]))
        .expect("path accepted");
    walk(&mut controller);

    assert_eq!(controller.status(), Status::Waiting);
    assert_eq!(piece_cell(&controller, "Colonel Mustard"), CellCoord::new(2, 17));
}

#[test]
fn planned_route_is_accepted_and_walked() {
    let mut controller = three_players(5);
    controller.set_dice_roll(12).expect("roll");
    let mustard = controller
        .board()
        .item_by_name("Colonel Mustard")
        .map(Item::id)
        .expect("mustard");
    let route = Pathfinder::default()
        .plan_route(controller.board(), mustard, CellCoord::new(10, 20))
        .expect("route to the hall");
    assert_eq!(route.len(), 12);
    controller.attempt_player_move(route).expect("route accepted");
    walk(&mut controller);

    let hall = controller.board().room_by_name("Hall").expect("hall").id();
    assert_eq!(controller.board().item(mustard).map(Item::room), Some(hall));
    assert_eq!(controller.status(), Status::Waiting);
}

#[test]
fn portal_step_is_accepted_only_from_the_linked_room() {
    let mut controller = three_players(6);
    controller.set_dice_roll(6).expect("roll");
    controller
        .attempt_player_move(path(&[(1, 17), (2, 17), (3, 17), (3, 18)]))
        .expect("path into the lounge");
    walk(&mut controller);
    let _ = controller.finish_turn().expect("turn finished");
    shuffle_one_square(&mut controller, (16, 23));
    shuffle_one_square(&mut controller, (9, 1));

    controller.set_dice_roll(6).expect("roll");
    let hall_square = path(&[(10, 20)]);
    assert!(matches!(
        controller.attempt_player_move(hall_square),
        Err(TurnError::Move(MoveError::NoPortal { .. }))
    ));

    let mustard = controller
        .board()
        .item_by_name("Colonel Mustard")
        .map(Item::id)
        .expect("mustard");
    let route = Pathfinder::default()
        .plan_route(controller.board(), mustard, CellCoord::new(0, 24))
        .expect("portal route");
    controller.attempt_player_move(route).expect("portal accepted");
    walk(&mut controller);

    let conservatory = controller
        .board()
        .room_by_name("Conservatory")
        .expect("conservatory")
        .id();
    assert_eq!(controller.board().item(mustard).map(Item::room), Some(conservatory));
    assert_eq!(controller.status(), Status::Waiting);
}

#[test]
fn finish_turn_advances_modulo_player_count() {
    let mut controller = three_players(7);
    shuffle_one_square(&mut controller, (1, 17));
    assert_eq!(controller.current(), Some(PlayerId::new(1)));
    shuffle_one_square(&mut controller, (16, 23));
    assert_eq!(controller.current(), Some(PlayerId::new(2)));
    shuffle_one_square(&mut controller, (9, 1));
    assert_eq!(controller.current(), Some(PlayerId::new(0)));
    assert_eq!(controller.status(), Status::RollingDice);
}

#[test]
fn correct_accusation_wins() {
    let mut controller = three_players(8);
    step_one_square(&mut controller, (1, 17));
    let solution = controller.solution().cloned().expect("solution drawn");
    let outcome = controller
        .accuse_murderer(solution.character(), solution.weapon(), solution.room())
        .expect("accusation resolved");
    assert_eq!(outcome, AccusationOutcome::Correct);
    assert_eq!(controller.status(), Status::GameOver);
    assert_eq!(controller.winner(), Some(PlayerId::new(0)));
    assert_eq!(controller.current(), Some(PlayerId::new(0)));

    controller.tick().expect("tick is a no-op once the game is over");
    assert_eq!(controller.status(), Status::GameOver);
    assert_eq!(controller.set_dice_roll(3), Err(TurnError::GameOver));
}

#[test]
fn wrong_accusation_eliminates_only_the_accuser() {
    let mut controller = three_players(9);
    step_one_square(&mut controller, (1, 17));
    let claim = wrong_claim(&controller);
    let outcome = controller
        .accuse_murderer(claim.character(), claim.weapon(), claim.room())
        .expect("accusation resolved");
    assert_eq!(outcome, AccusationOutcome::Eliminated);
    assert_eq!(controller.status(), Status::Accusing);
    assert!(controller.is_eliminated(PlayerId::new(0)));
    assert!(!controller.is_eliminated(PlayerId::new(1)));
    assert_eq!(controller.current(), Some(PlayerId::new(0)));

    assert_eq!(
        controller.accuse_murderer(claim.character(), claim.weapon(), claim.room()),
        Err(TurnError::PlayerEliminated(PlayerId::new(0)))
    );

    let (previous, next) = controller.finish_turn().expect("turn handed over");
    assert_eq!((previous, next), (PlayerId::new(0), PlayerId::new(1)));
    assert_eq!(controller.status(), Status::RollingDice);
}

#[test]
fn everyone_wrong_ends_without_winner() {
    let mut controller = three_players(10);
    let claim = wrong_claim(&controller);
    for step in [(1, 17), (16, 23)] {
        step_one_square(&mut controller, step);
        let outcome = controller
            .accuse_murderer(claim.character(), claim.weapon(), claim.room())
            .expect("accusation resolved");
        assert_eq!(outcome, AccusationOutcome::Eliminated);
        let _ = controller.finish_turn().expect("turn handed over");
    }
    step_one_square(&mut controller, (9, 1));
    let outcome = controller
        .accuse_murderer(claim.character(), claim.weapon(), claim.room())
        .expect("accusation resolved");
    assert_eq!(outcome, AccusationOutcome::AllEliminated);
    assert_eq!(controller.status(), Status::GameOver);
    assert_eq!(controller.current(), None);
    assert_eq!(controller.winner(), None);
}

#[test]
fn suggestion_summons_items_and_starts_rotation() {
    let mut controller = three_players(11);
    step_one_square(&mut controller, (1, 17));
    controller
        .suggest_murderer("Mrs. White", "Rope", "Kitchen")
        .expect("suggestion accepted");

    assert_eq!(controller.status(), Status::Suggesting);
    assert_eq!(controller.rotating(), PlayerId::new(1));
    assert!(!controller.rotation_complete());
    let kitchen = controller.board().room_by_name("Kitchen").expect("kitchen").id();
    for name in ["Mrs. White", "Rope"] {
        let item = controller.board().item_by_name(name).expect("item");
        assert_eq!(item.room(), kitchen);
    }

    assert_eq!(
        controller.suggest_murderer("Mrs. White", "Rope", "Kitchen"),
        Err(TurnError::AlreadySuggested)
    );

    let _ = controller.skip_rotating_player().expect("rotation moves on");
    let _ = controller.skip_rotating_player().expect("rotation moves on");
    assert!(controller.rotation_complete());
}

#[test]
fn disproving_cards_come_from_the_rotating_hand() {
    let mut controller = three_players(12);
    let hand = controller.players()[1].hand().to_vec();
    let content = controller.board().content().clone();
    let character = hand
        .iter()
        .find(|card| content.is_character(card))
        .cloned()
        .unwrap_or_else(|| content.characters()[0].name.clone());
    let weapon = hand
        .iter()
        .find(|card| content.is_weapon(card))
        .cloned()
        .unwrap_or_else(|| content.weapons()[0].clone());
    let room = hand
        .iter()
        .find(|card| content.is_room(card))
        .cloned()
        .unwrap_or_else(|| content.rooms()[0].name.clone());

    step_one_square(&mut controller, (1, 17));
    controller
        .suggest_murderer(&character, &weapon, &room)
        .expect("suggestion accepted");
    let disproving = controller.disproving_cards();
    assert!(!disproving.is_empty());
    for card in &disproving {
        assert!(hand.iter().any(|held| held.as_str() == *card));
    }

    let shown = disproving[0].to_owned();
    controller.set_revealing_card(&shown).expect("card revealed");
    assert_eq!(controller.status(), Status::Revealing);
    assert_eq!(controller.revealed_card(), Some(shown.as_str()));
}

#[test]
fn revealing_an_unsuggested_card_is_fatal() {
    let mut controller = three_players(13);
    step_one_square(&mut controller, (1, 17));
    controller
        .suggest_murderer("Mrs. White", "Rope", "Kitchen")
        .expect("suggestion accepted");
    let error = controller
        .set_revealing_card("Dagger")
        .expect_err("dagger was not suggested");
    assert!(error.is_fatal());
    assert_eq!(controller.status(), Status::Suggesting);
}

#[test]
fn reset_restores_the_opening_position() {
    let mut controller = three_players(14);
    controller.set_dice_roll(2).expect("roll");
    controller
        .attempt_player_move(path(&[(1, 17), (2, 17)]))
        .expect("path accepted");
    walk(&mut controller);
    let claim = wrong_claim(&controller);
    let _ = controller
        .accuse_murderer(claim.character(), claim.weapon(), claim.room())
        .expect("accusation resolved");

    controller.reset().expect("reset");
    assert_eq!(controller.status(), Status::RollingDice);
    assert_eq!(controller.current(), Some(PlayerId::new(0)));
    assert!(!controller.is_eliminated(PlayerId::new(0)));
    assert_eq!(piece_cell(&controller, "Colonel Mustard"), CellCoord::new(0, 17));
    assert!(controller.solution().is_some());
    let dealt: usize = controller.players().iter().map(|player| player.hand().len()).sum();
    assert_eq!(dealt, 18);
}

fn play_scripted_game(seed: u64) -> Vec<Event> {
    let mut controller = three_players(seed);
    let mut events = Vec::new();
    let commands = vec![
        Command::SetDiceRoll { value: 1 },
        Command::AttemptMove {
            path: path(&[(1, 17)]),
        },
        Command::Tick,
        Command::Suggest {
            claim: Claim::new("Professor Plum", "Dagger", "Study"),
        },
        Command::SkipRotatingPlayer,
        Command::FinishTurn,
        Command::RollDice,
        Command::Reset,
    ];
    for command in commands {
        let _ = apply(&mut controller, command, &mut events);
    }
    events
}

#[test]
fn scripted_game_replays_identically() {
    let first = play_scripted_game(99);
    let second = play_scripted_game(99);
    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert!(first.contains(&Event::GameReset));
    assert!(first.iter().any(|event| matches!(event, Event::SuggestionMade { .. })));
}

#[test]
fn suggesting_before_rolling_cannot_skip_the_roll() {
    let mut controller = three_players(16);
    assert_eq!(
        controller.suggest_murderer("Mrs. White", "Rope", "Kitchen"),
        Err(TurnError::UnexpectedStatus {
            actual: Status::RollingDice
        })
    );
    assert_eq!(controller.status(), Status::RollingDice);
    assert!(controller.finish_turn().is_err());
    assert_eq!(controller.current(), Some(PlayerId::new(0)));

    step_one_square(&mut controller, (1, 17));
    controller
        .suggest_murderer("Mrs. White", "Rope", "Kitchen")
        .expect("suggestion accepted once waiting");
    let (previous, next) = controller.finish_turn().expect("turn handed over");
    assert_eq!((previous, next), (PlayerId::new(0), PlayerId::new(1)));
}

#[test]
fn apply_reports_the_flow_of_a_turn() {
    let mut controller = three_players(15);
    let mut events = Vec::new();
    apply(&mut controller, Command::SetDiceRoll { value: 1 }, &mut events).expect("roll");
    apply(
        &mut controller,
        Command::AttemptMove {
            path: path(&[(1, 17)]),
        },
        &mut events,
    )
    .expect("move accepted");
    apply(&mut controller, Command::Tick, &mut events).expect("step");
    apply(&mut controller, Command::FinishTurn, &mut events).expect("finish");

    let mustard = controller
        .board()
        .item_by_name("Colonel Mustard")
        .map(Item::id)
        .expect("mustard");
    assert!(events.contains(&Event::ItemMoved {
        item: mustard,
        from: CellCoord::new(0, 17),
        to: CellCoord::new(1, 17),
    }));
    assert!(events.contains(&Event::MoveAccepted {
        player: PlayerId::new(0),
        steps: 1,
    }));
    assert_eq!(
        events.last(),
        Some(&Event::StatusChanged {
            from: Status::Waiting,
            to: Status::RollingDice,
        })
    );
    assert!(events.contains(&Event::TurnFinished {
        previous: PlayerId::new(0),
        next: PlayerId::new(1),
    }));
}

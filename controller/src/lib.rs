#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn and suggestion state machine for Cluedo.
//!
//! The [`Controller`] owns the [`Board`] and is the only component allowed to
//! mutate it during play. Adapters drive it either through its methods or
//! through [`apply`], which accepts [`Command`] values and reports what
//! happened as [`Event`] values.

use std::collections::HashSet;

use cluedo_board::{Board, Item, Room};
use cluedo_core::{
    AccusationOutcome, CellCoord, Claim, Command, ContractViolation, Event, ItemId, ItemKind,
    MoveError, MovePath, Player, PlayerId, SetupError, Status, TurnError, UnfinishedTurn,
    MAX_DICE_ROLL, MAX_PLAYERS, MIN_PLAYERS,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

/// Single step taken by a piece during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Piece that moved.
    pub item: ItemId,
    /// Square the piece left.
    pub from: CellCoord,
    /// Square the piece landed on.
    pub to: CellCoord,
}

/// Referee for a game of Cluedo.
#[derive(Debug)]
pub struct Controller<R = ChaCha8Rng> {
    board: Board,
    rng: R,
    players: Vec<Player>,
    eliminated: Vec<bool>,
    status: Status,
    current: Option<PlayerId>,
    rotating: PlayerId,
    dice: u32,
    moves_remaining: u32,
    has_suggested: bool,
    path: MovePath,
    suggestion: Option<Claim>,
    revealed: Option<String>,
    solution: Option<Claim>,
    winner: Option<PlayerId>,
}

impl Controller<ChaCha8Rng> {
    /// Creates a controller whose random source is seeded from `seed`.
    #[must_use]
    pub fn seeded(board: Board, seed: u64) -> Self {
        Self::new(board, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Controller<R> {
    /// Creates a controller without players.
    #[must_use]
    pub fn new(board: Board, rng: R) -> Self {
        Self {
            board,
            rng,
            players: Vec::new(),
            eliminated: Vec::new(),
            status: Status::RollingDice,
            current: None,
            rotating: PlayerId::new(0),
            dice: 0,
            moves_remaining: 0,
            has_suggested: false,
            path: MovePath::default(),
            suggestion: None,
            revealed: None,
            solution: None,
            winner: None,
        }
    }

    /// Seats the players and puts every item back on its starting square.
    ///
    /// Any game in progress is discarded. Cards are not dealt.
    pub fn set_players(&mut self, players: Vec<Player>) -> Result<(), SetupError> {
        let content = self.board.content();
        let max = MAX_PLAYERS.min(content.characters().len());
        if players.len() < MIN_PLAYERS {
            return Err(SetupError::TooFewPlayers(players.len()));
        }
        if players.len() > max {
            return Err(SetupError::TooManyPlayers {
                max,
                actual: players.len(),
            });
        }

        let mut chosen = HashSet::new();
        for player in &players {
            if !content.is_character(player.piece()) {
                return Err(SetupError::UnknownPiece(player.piece().to_owned()));
            }
            if !chosen.insert(player.piece()) {
                return Err(SetupError::DuplicatePiece(player.piece().to_owned()));
            }
        }

        self.board.set_up(&mut self.rng)?;
        self.players = players;
        for player in &mut self.players {
            player.set_hand(Vec::new());
        }
        self.eliminated = vec![false; self.players.len()];
        self.clear_game();
        info!(players = self.players.len(), "players seated");
        Ok(())
    }

    /// Draws a new solution and deals the remaining cards to the players.
    pub fn deal_cards(&mut self) -> Result<(), TurnError> {
        let deal = cluedo_system_dealing::deal(
            self.board.content(),
            self.players.len(),
            &mut self.rng,
        )
        .ok_or(TurnError::NoPlayers)?;
        let (solution, hands) = deal.into_parts();
        for (player, hand) in self.players.iter_mut().zip(hands) {
            player.set_hand(hand);
        }
        self.solution = Some(solution);
        info!("cards dealt");
        Ok(())
    }

    /// Grants the current player `value` moves.
    pub fn set_dice_roll(&mut self, value: u32) -> Result<(), TurnError> {
        let player = self.active_player()?;
        self.expect_status(Status::RollingDice)?;
        if value == 0 {
            return Err(TurnError::InvalidDiceRoll(value));
        }
        self.dice = value;
        self.moves_remaining = value;
        self.status = Status::SelectingMove;
        debug!(%player, value, "dice set");
        Ok(())
    }

    /// Rolls the dice for the current player and returns the value.
    pub fn roll_dice(&mut self) -> Result<u32, TurnError> {
        let _ = self.active_player()?;
        self.expect_status(Status::RollingDice)?;
        let value = self.rng.gen_range(1..=MAX_DICE_ROLL);
        self.set_dice_roll(value)?;
        Ok(value)
    }

    /// Validates `path` for the current player's piece and starts walking it.
    ///
    /// Every square must be able to hold the piece, and any step from one
    /// room straight into a different room must use the portal of the room
    /// being left.
    pub fn attempt_player_move(&mut self, path: MovePath) -> Result<(), TurnError> {
        let _ = self.active_player()?;
        self.expect_status(Status::SelectingMove)?;
        if self.moves_remaining == 0 {
            return Err(TurnError::UnexpectedStatus {
                actual: self.status,
            });
        }
        if path.is_empty() {
            return Err(MoveError::EmptyPath.into());
        }

        let piece = self.current_piece()?;
        let start = self
            .board
            .item(piece)
            .map(Item::cell)
            .ok_or_else(|| MoveError::UnknownItem(format!("#{}", piece.get())))?;
        self.check_path(start, &path)?;

        debug!(steps = path.len(), "move accepted");
        self.path = path;
        self.status = Status::Moving;
        Ok(())
    }

    fn check_path(&self, start: CellCoord, path: &MovePath) -> Result<(), MoveError> {
        let mut previous = start;
        for step in path.iter() {
            let square = self.board.square(step).ok_or(MoveError::OutOfBounds(step))?;
            let room = square.room().ok_or(MoveError::NoRoom(step))?;
            if !square.can_contain(ItemKind::Piece) {
                return Err(MoveError::Occupied {
                    cell: step,
                    kind: ItemKind::Piece,
                });
            }

            let left = self
                .board
                .square(previous)
                .filter(|origin| origin.is_room())
                .and_then(|origin| origin.room());
            if let Some(left) = left {
                if square.is_room() && left != room {
                    let target = self
                        .board
                        .room(left)
                        .and_then(Room::portal)
                        .map(|portal| portal.target());
                    if target != Some(room) {
                        return Err(MoveError::NoPortal {
                            from: previous,
                            to: step,
                        });
                    }
                }
            }
            previous = step;
        }
        Ok(())
    }

    /// Advances an accepted move by one step.
    ///
    /// Does nothing outside [`Status::Moving`]. A failed step abandons the
    /// rest of the path and hands control back to move selection.
    pub fn tick(&mut self) -> Result<(), TurnError> {
        let _ = self.step()?;
        Ok(())
    }

    fn step(&mut self) -> Result<Option<Step>, TurnError> {
        if self.status != Status::Moving {
            return Ok(None);
        }

        let piece = self.current_piece()?;
        let Some(destination) = self.path.advance() else {
            self.status = Status::SelectingMove;
            return Ok(None);
        };
        let from = self.board.item(piece).map_or(destination, Item::cell);

        let landing = match self.board.move_item(piece, destination, &mut self.rng) {
            Ok(landing) => landing,
            Err(error) => {
                self.path = MovePath::default();
                self.status = Status::SelectingMove;
                warn!(%error, "move abandoned");
                return Err(error.into());
            }
        };
        self.moves_remaining = self.moves_remaining.saturating_sub(1);

        let in_room = self
            .board
            .item(piece)
            .map_or(false, |item| !item.room().is_corridor());
        if in_room || self.moves_remaining == 0 {
            self.path = MovePath::default();
            self.status = Status::Waiting;
        } else if self.path.is_empty() {
            self.status = Status::SelectingMove;
        }

        Ok(Some(Step {
            item: piece,
            from,
            to: landing,
        }))
    }

    /// Suggests a murderer, summoning the named piece and weapon to `room`.
    ///
    /// Only allowed once the current player has finished moving. The
    /// disprove rotation starts with the player seated after the suggester.
    pub fn suggest_murderer(
        &mut self,
        character: &str,
        weapon: &str,
        room: &str,
    ) -> Result<(), TurnError> {
        let player = self.claimant()?;
        self.check_cards(character, weapon, room)?;
        self.board
            .move_to_room(character, weapon, room, &mut self.rng)?;

        let claim = Claim::new(character, weapon, room);
        info!(%player, %claim, "suggestion made");
        self.suggestion = Some(claim);
        self.revealed = None;
        self.has_suggested = true;
        self.rotating = player.next(self.players.len());
        self.status = Status::Suggesting;
        Ok(())
    }

    /// Accuses a murderer once the current player has finished moving.
    ///
    /// A correct accusation ends the game with the accuser as winner. A wrong
    /// one eliminates the accuser; when nobody is left in contention the game
    /// ends without a winner and no player is current.
    pub fn accuse_murderer(
        &mut self,
        character: &str,
        weapon: &str,
        room: &str,
    ) -> Result<AccusationOutcome, TurnError> {
        let player = self.claimant()?;
        self.check_cards(character, weapon, room)?;
        let solution = self.solution.as_ref().ok_or(TurnError::NotDealt)?;

        let claim = Claim::new(character, weapon, room);
        let correct = *solution == claim;
        self.suggestion = Some(claim);
        self.has_suggested = true;
        self.status = Status::Accusing;

        if correct {
            self.status = Status::GameOver;
            self.winner = Some(player);
            info!(%player, "accusation correct");
            return Ok(AccusationOutcome::Correct);
        }

        if let Some(flag) = self.eliminated.get_mut(player.index()) {
            *flag = true;
        }
        info!(%player, "accusation wrong, player eliminated");
        if self.eliminated.iter().all(|eliminated| *eliminated) {
            self.status = Status::GameOver;
            self.current = None;
            info!("every player eliminated");
            return Ok(AccusationOutcome::AllEliminated);
        }
        Ok(AccusationOutcome::Eliminated)
    }

    /// Records the card shown by the rotating player.
    ///
    /// Revealing a card that was not suggested, or revealing without a
    /// suggestion in flight, is a contract violation.
    pub fn set_revealing_card(&mut self, card: &str) -> Result<(), TurnError> {
        let awaiting = matches!(self.status, Status::Suggesting | Status::Revealing);
        let suggestion = self
            .suggestion
            .as_ref()
            .filter(|_| awaiting)
            .ok_or(ContractViolation::NoSuggestion)?;
        if !suggestion.names(card) {
            return Err(ContractViolation::CardNotSuggested {
                card: card.to_owned(),
            }
            .into());
        }
        self.revealed = Some(card.to_owned());
        self.status = Status::Revealing;
        debug!(by = %self.rotating, card, "card revealed");
        Ok(())
    }

    /// Passes the disprove rotation to the next seat and returns it.
    pub fn skip_rotating_player(&mut self) -> Result<PlayerId, TurnError> {
        if self.players.is_empty() {
            return Err(TurnError::NoPlayers);
        }
        self.rotating = self.rotating.next(self.players.len());
        Ok(self.rotating)
    }

    /// Hands the turn to the next seat.
    ///
    /// Returns the players whose turn ended and began.
    pub fn finish_turn(&mut self) -> Result<(PlayerId, PlayerId), TurnError> {
        let previous = self.active_player()?;
        match self.status {
            Status::RollingDice => {
                return Err(TurnError::TurnNotFinished(UnfinishedTurn::DiceNotRolled))
            }
            Status::SelectingMove | Status::Moving => {
                return Err(TurnError::TurnNotFinished(UnfinishedTurn::MoveIncomplete))
            }
            _ => {}
        }

        let next = previous.next(self.players.len());
        self.current = Some(next);
        self.rotating = next;
        self.clear_turn();
        info!(%previous, %next, "turn finished");
        Ok((previous, next))
    }

    /// Starts a new game with the same players and deals fresh cards.
    pub fn reset(&mut self) -> Result<(), TurnError> {
        if self.players.is_empty() {
            return Err(TurnError::NoPlayers);
        }
        self.board.set_up(&mut self.rng)?;
        self.eliminated.iter_mut().for_each(|flag| *flag = false);
        self.clear_game();
        self.deal_cards()?;
        info!("game reset");
        Ok(())
    }

    fn clear_game(&mut self) {
        self.current = (!self.players.is_empty()).then(|| PlayerId::new(0));
        self.rotating = PlayerId::new(0);
        self.solution = None;
        self.winner = None;
        self.clear_turn();
    }

    fn clear_turn(&mut self) {
        self.status = Status::RollingDice;
        self.dice = 0;
        self.moves_remaining = 0;
        self.has_suggested = false;
        self.path = MovePath::default();
        self.suggestion = None;
        self.revealed = None;
    }

    fn active_player(&self) -> Result<PlayerId, TurnError> {
        if self.status == Status::GameOver {
            return Err(TurnError::GameOver);
        }
        self.current.ok_or(TurnError::NoPlayers)
    }

    fn claimant(&self) -> Result<PlayerId, TurnError> {
        let player = self.active_player()?;
        if self.is_eliminated(player) {
            return Err(TurnError::PlayerEliminated(player));
        }
        if self.has_suggested {
            return Err(TurnError::AlreadySuggested);
        }
        self.expect_status(Status::Waiting)?;
        Ok(player)
    }

    fn expect_status(&self, expected: Status) -> Result<(), TurnError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(TurnError::UnexpectedStatus {
                actual: self.status,
            })
        }
    }

    fn check_cards(&self, character: &str, weapon: &str, room: &str) -> Result<(), TurnError> {
        let content = self.board.content();
        let checks = [
            ("character", character, content.is_character(character)),
            ("weapon", weapon, content.is_weapon(weapon)),
            ("room", room, content.is_room(room)),
        ];
        for (category, name, known) in checks {
            if !known {
                return Err(TurnError::UnknownCard {
                    category,
                    name: name.to_owned(),
                });
            }
        }
        Ok(())
    }

    fn current_piece(&self) -> Result<ItemId, TurnError> {
        let player = self.current_player().ok_or(TurnError::NoPlayers)?;
        self.board
            .item_by_name(player.piece())
            .filter(|item| item.kind() == ItemKind::Piece)
            .map(Item::id)
            .ok_or_else(|| MoveError::UnknownItem(player.piece().to_owned()).into())
    }

    /// Current phase of the turn.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Seat of the player whose turn it is.
    #[must_use]
    pub const fn current(&self) -> Option<PlayerId> {
        self.current
    }

    /// Player whose turn it is; `None` once everyone has been eliminated.
    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.current.and_then(|id| self.players.get(id.index()))
    }

    /// Seat being asked to disprove the suggestion.
    #[must_use]
    pub const fn rotating(&self) -> PlayerId {
        self.rotating
    }

    /// Player being asked to disprove the suggestion.
    #[must_use]
    pub fn rotating_player(&self) -> Option<&Player> {
        self.players.get(self.rotating.index())
    }

    /// Value of the last dice roll.
    #[must_use]
    pub const fn dice(&self) -> u32 {
        self.dice
    }

    /// Squares the current player may still travel.
    #[must_use]
    pub const fn moves_remaining(&self) -> u32 {
        self.moves_remaining
    }

    /// Hidden solution, once cards have been dealt.
    #[must_use]
    pub fn solution(&self) -> Option<&Claim> {
        self.solution.as_ref()
    }

    /// Player that solved the murder.
    #[must_use]
    pub const fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Reports whether the player made a wrong accusation.
    #[must_use]
    pub fn is_eliminated(&self, player: PlayerId) -> bool {
        self.eliminated.get(player.index()).copied().unwrap_or(false)
    }

    /// Board the game is played on.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Players in seating order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Latest suggestion or accusation of the current turn.
    #[must_use]
    pub fn suggestion(&self) -> Option<&Claim> {
        self.suggestion.as_ref()
    }

    /// Card shown to disprove the current suggestion.
    #[must_use]
    pub fn revealed_card(&self) -> Option<&str> {
        self.revealed.as_deref()
    }

    /// Squares still to be walked by the current move.
    #[must_use]
    pub fn current_path(&self) -> &MovePath {
        &self.path
    }

    /// Cards in the rotating player's hand that disprove the suggestion.
    #[must_use]
    pub fn disproving_cards(&self) -> Vec<&str> {
        let (Some(suggestion), Some(player)) = (self.suggestion.as_ref(), self.rotating_player())
        else {
            return Vec::new();
        };
        player
            .hand()
            .iter()
            .map(String::as_str)
            .filter(|card| suggestion.names(card))
            .collect()
    }

    /// Reports whether the disprove rotation is back at the suggester.
    #[must_use]
    pub fn rotation_complete(&self) -> bool {
        self.status == Status::Suggesting && self.current == Some(self.rotating)
    }
}

/// Executes `command` and records its outcome in `out_events`.
///
/// A [`Event::StatusChanged`] is emitted whenever the command moved the state
/// machine, including commands that failed part way through.
pub fn apply<R: Rng>(
    controller: &mut Controller<R>,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), TurnError> {
    let before = controller.status();
    let result = dispatch(controller, command, out_events);
    let after = controller.status();
    if before != after {
        out_events.push(Event::StatusChanged {
            from: before,
            to: after,
        });
    }
    if let Err(error) = &result {
        warn!(%error, fatal = error.is_fatal(), "command rejected");
    }
    result
}

fn dispatch<R: Rng>(
    controller: &mut Controller<R>,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), TurnError> {
    match command {
        Command::DealCards => {
            controller.deal_cards()?;
            out_events.push(cards_dealt(controller));
        }
        Command::SetDiceRoll { value } => {
            controller.set_dice_roll(value)?;
            out_events.push(dice_rolled(controller, value)?);
        }
        Command::RollDice => {
            let value = controller.roll_dice()?;
            out_events.push(dice_rolled(controller, value)?);
        }
        Command::AttemptMove { path } => {
            let steps = path.len();
            controller.attempt_player_move(path)?;
            let player = controller.current().ok_or(TurnError::NoPlayers)?;
            out_events.push(Event::MoveAccepted { player, steps });
        }
        Command::Tick => {
            if let Some(step) = controller.step()? {
                out_events.push(Event::ItemMoved {
                    item: step.item,
                    from: step.from,
                    to: step.to,
                });
            }
        }
        Command::Suggest { claim } => {
            controller.suggest_murderer(claim.character(), claim.weapon(), claim.room())?;
            let player = controller.current().ok_or(TurnError::NoPlayers)?;
            out_events.push(Event::SuggestionMade { player, claim });
            out_events.push(Event::RotationAdvanced {
                player: controller.rotating(),
            });
        }
        Command::Accuse { claim } => {
            let accuser = controller.current();
            let outcome =
                controller.accuse_murderer(claim.character(), claim.weapon(), claim.room())?;
            let player = accuser.ok_or(TurnError::NoPlayers)?;
            match outcome {
                AccusationOutcome::Correct => out_events.push(Event::GameOver {
                    winner: Some(player),
                }),
                AccusationOutcome::Eliminated => {
                    out_events.push(Event::PlayerEliminated { player });
                }
                AccusationOutcome::AllEliminated => {
                    out_events.push(Event::PlayerEliminated { player });
                    out_events.push(Event::GameOver { winner: None });
                }
            }
        }
        Command::RevealCard { card } => {
            controller.set_revealing_card(&card)?;
            out_events.push(Event::CardRevealed {
                by: controller.rotating(),
                card,
            });
        }
        Command::SkipRotatingPlayer => {
            let player = controller.skip_rotating_player()?;
            out_events.push(Event::RotationAdvanced { player });
        }
        Command::FinishTurn => {
            let (previous, next) = controller.finish_turn()?;
            out_events.push(Event::TurnFinished { previous, next });
        }
        Command::Reset => {
            controller.reset()?;
            out_events.push(Event::GameReset);
            out_events.push(cards_dealt(controller));
        }
    }
    Ok(())
}

fn cards_dealt<R>(controller: &Controller<R>) -> Event {
    Event::CardsDealt {
        hand_sizes: controller
            .players
            .iter()
            .map(|player| player.hand().len())
            .collect(),
    }
}

fn dice_rolled<R>(controller: &Controller<R>, value: u32) -> Result<Event, TurnError> {
    let player = controller.current.ok_or(TurnError::NoPlayers)?;
    Ok(Event::DiceRolled { player, value })
}

//! # Game State
//!
//! The rules layer: seats, turn order, move legality, win, draw and concession.
//!
//! Every operation is pure. It takes `&self` and hands back a new [`GameState`] or a
//! [`MoveRejected`] explaining why nothing happened, so the caller can keep the old
//! value around (the service layer persists it, the search clones it freely).
//!
//! ## Win and draw
//! A move wins when the mover owns an unbroken chain between their two edges,
//! checked in the mover's canonical frame. A position is a draw when no player
//! could connect even if every empty cell were theirs.

use crate::board::Board;
use crate::connectivity::{has_winning_path, path_exists};
use crate::hex::{generate_hexagons, next_player, HexCell, HexCoord, PLAYER_COUNT};
use crate::symmetry::canonicalize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Seats are still being picked.
    WaitingForPlayers,
    InProgress,
    /// A winner or a draw has been established.
    Finished,
    /// The board was reset while some player had conceded; no moves are accepted.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Winner(u8),
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Winner(player) => write!(f, "player {} wins", player),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeatKind {
    Human,
    Ai,
}

/// A player sitting at one of the three colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSeat {
    pub name: String,
    pub kind: SeatKind,
    pub gave_up: bool,
    pub wins: u32,
}

impl PlayerSeat {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SeatKind::Human,
            gave_up: false,
            wins: 0,
        }
    }

    pub fn ai(name: impl Into<String>) -> Self {
        Self {
            kind: SeatKind::Ai,
            ..Self::human(name)
        }
    }
}

/// Why a game operation was refused. The state it was called on is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejected {
    #[error("the game is not in progress ({0:?})")]
    NotInProgress(GamePhase),

    #[error("it is player {current}'s turn, not player {player}'s")]
    NotYourTurn { player: u8, current: u8 },

    #[error("cell {0} does not exist or is not playable")]
    UnknownCell(usize),

    #[error("cell {0} is already taken")]
    CellTaken(usize),

    #[error("color {0} is already taken")]
    ColorTaken(u8),

    #[error("player id must be 1..=3, got {0}")]
    InvalidPlayer(u8),

    #[error("no one is sitting at color {0}")]
    EmptySeat(u8),

    #[error("player {0} has already conceded")]
    AlreadyConceded(u8),

    #[error("seats can only change before the game starts")]
    SeatsLocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    radius: i32,
    players: [Option<PlayerSeat>; 3],
    current: u8,
    hexagons: Vec<HexCell>,
    phase: GamePhase,
    outcome: Option<Outcome>,
}

fn check_player(player: u8) -> Result<(), MoveRejected> {
    if (1..=PLAYER_COUNT).contains(&player) {
        Ok(())
    } else {
        Err(MoveRejected::InvalidPlayer(player))
    }
}

impl GameState {
    /// A fresh table with empty seats.
    pub fn new(radius: i32) -> Self {
        Self {
            radius,
            players: [None, None, None],
            current: 1,
            hexagons: generate_hexagons(radius),
            phase: GamePhase::WaitingForPlayers,
            outcome: None,
        }
    }

    /// A game already in progress with three AI seats.
    pub fn with_ai_players(radius: i32) -> Self {
        let mut game = Self::new(radius);
        game.seat_missing_ai();
        game
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn winner(&self) -> Option<u8> {
        match self.outcome {
            Some(Outcome::Winner(player)) => Some(player),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    /// The player to move. Only meaningful while the game is in progress.
    pub fn current_player(&self) -> u8 {
        self.current
    }

    pub fn players(&self) -> &[Option<PlayerSeat>; 3] {
        &self.players
    }

    pub fn seat(&self, color: u8) -> Option<&PlayerSeat> {
        self.players.get(color.wrapping_sub(1) as usize)?.as_ref()
    }

    /// All cells in stable index order, border ring included.
    pub fn hexagons(&self) -> &[HexCell] {
        &self.hexagons
    }

    /// Real-frame projection of the current board.
    pub fn board(&self) -> Board {
        Board::from_cells(self.radius, &self.hexagons)
    }

    /// Index of the cell at `coord`, if the board has one there.
    pub fn cell_index_at(&self, coord: HexCoord) -> Option<usize> {
        self.hexagons.iter().find(|cell| cell.coord == coord).map(|cell| cell.index)
    }

    /// Indices of every empty playable cell.
    pub fn playable_cells(&self) -> Vec<usize> {
        self.hexagons
            .iter()
            .filter(|cell| !cell.is_taken() && cell.is_playable(self.radius))
            .map(|cell| cell.index)
            .collect()
    }

    fn has_conceded(&self, player: u8) -> bool {
        self.seat(player).is_some_and(|seat| seat.gave_up)
    }

    /// Sits `seat` at `color`. The game starts once all colors are taken.
    pub fn pick_color(&self, color: u8, seat: PlayerSeat) -> Result<GameState, MoveRejected> {
        check_player(color)?;
        if self.phase != GamePhase::WaitingForPlayers {
            return Err(MoveRejected::SeatsLocked);
        }
        let slot = (color - 1) as usize;
        if self.players[slot].is_some() {
            return Err(MoveRejected::ColorTaken(color));
        }

        let mut next = self.clone();
        next.players[slot] = Some(seat);
        if next.players.iter().all(Option::is_some) {
            next.start();
        }
        Ok(next)
    }

    /// Frees `color` again before the game starts.
    pub fn unpick_color(&self, color: u8) -> Result<GameState, MoveRejected> {
        check_player(color)?;
        if self.phase != GamePhase::WaitingForPlayers {
            return Err(MoveRejected::SeatsLocked);
        }
        let slot = (color - 1) as usize;
        if self.players[slot].is_none() {
            return Err(MoveRejected::EmptySeat(color));
        }

        let mut next = self.clone();
        next.players[slot] = None;
        Ok(next)
    }

    /// Seats AI players at every free color and starts the game.
    pub fn fill_with_ai(&self) -> Result<GameState, MoveRejected> {
        if self.phase != GamePhase::WaitingForPlayers {
            return Err(MoveRejected::SeatsLocked);
        }
        let mut next = self.clone();
        next.seat_missing_ai();
        Ok(next)
    }

    fn seat_missing_ai(&mut self) {
        for (slot, seat) in self.players.iter_mut().enumerate() {
            if seat.is_none() {
                *seat = Some(PlayerSeat::ai(format!("AI {}", slot + 1)));
            }
        }
        self.start();
    }

    fn start(&mut self) {
        self.phase = GamePhase::InProgress;
        self.current = 1;
        debug!(radius = self.radius, "game started");
    }

    /// Claims cell `cell_index` for `player`.
    pub fn apply_move(&self, player: u8, cell_index: usize) -> Result<GameState, MoveRejected> {
        if self.phase != GamePhase::InProgress {
            return Err(MoveRejected::NotInProgress(self.phase));
        }
        check_player(player)?;
        if player != self.current {
            return Err(MoveRejected::NotYourTurn {
                player,
                current: self.current,
            });
        }
        let cell = self
            .hexagons
            .get(cell_index)
            .filter(|cell| cell.is_playable(self.radius))
            .ok_or(MoveRejected::UnknownCell(cell_index))?;
        if cell.is_taken() {
            return Err(MoveRejected::CellTaken(cell_index));
        }

        let mut next = self.clone();
        next.hexagons[cell_index] = cell.with_owner(player);

        let board = next.board();
        if has_winning_path(&canonicalize(&board, player), player) {
            next.finish(Outcome::Winner(player));
        } else if is_draw(&board) {
            next.finish(Outcome::Draw);
        } else {
            next.advance_turn();
        }
        Ok(next)
    }

    fn finish(&mut self, outcome: Outcome) {
        if let Outcome::Winner(player) = outcome {
            if let Some(seat) = self.players[(player - 1) as usize].as_mut() {
                seat.wins += 1;
            }
        }
        self.phase = GamePhase::Finished;
        self.outcome = Some(outcome);
        debug!(%outcome, "game finished");
    }

    fn advance_turn(&mut self) {
        let mut candidate = self.current;
        for _ in 0..PLAYER_COUNT {
            candidate = next_player(candidate);
            if !self.has_conceded(candidate) {
                self.current = candidate;
                return;
            }
        }
    }

    /// `player` gives up. With a single player left standing, that player wins and
    /// the board is reset into [`GamePhase::Halted`].
    pub fn concede(&self, player: u8) -> Result<GameState, MoveRejected> {
        check_player(player)?;
        if self.phase != GamePhase::InProgress {
            return Err(MoveRejected::NotInProgress(self.phase));
        }
        let slot = (player - 1) as usize;
        match &self.players[slot] {
            None => return Err(MoveRejected::EmptySeat(player)),
            Some(seat) if seat.gave_up => return Err(MoveRejected::AlreadyConceded(player)),
            Some(_) => {}
        }

        let mut next = self.clone();
        if let Some(seat) = next.players[slot].as_mut() {
            seat.gave_up = true;
        }
        debug!(player, "player conceded");

        let standing: Vec<u8> = (1..=PLAYER_COUNT).filter(|&p| !next.has_conceded(p)).collect();
        match standing.as_slice() {
            [] => {
                next.phase = GamePhase::Finished;
                next.outcome = None;
            }
            [last] => {
                let winner = *last;
                next = next.reset();
                if let Some(seat) = next.players[(winner - 1) as usize].as_mut() {
                    seat.wins += 1;
                }
                next.outcome = Some(Outcome::Winner(winner));
                debug!(winner, "last player standing");
            }
            _ => {
                if next.current == player {
                    next.advance_turn();
                }
            }
        }
        Ok(next)
    }

    /// Fresh board of the same radius, player 1 to move. Stays [`GamePhase::Halted`]
    /// while any seated player has conceded.
    pub fn reset(&self) -> GameState {
        let mut next = self.clone();
        next.hexagons = generate_hexagons(self.radius);
        next.current = 1;
        next.outcome = None;
        next.phase = if (1..=PLAYER_COUNT).any(|p| self.has_conceded(p)) {
            GamePhase::Halted
        } else if self.players.iter().all(Option::is_some) {
            GamePhase::InProgress
        } else {
            GamePhase::WaitingForPlayers
        };
        next
    }
}

/// Whether no player can connect their edges any more, each checked in their own
/// canonical frame.
pub fn is_draw(board: &Board) -> bool {
    (1..=PLAYER_COUNT).all(|player| !path_exists(&canonicalize(board, player), player, true))
}

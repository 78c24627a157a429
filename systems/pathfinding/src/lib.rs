#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* pathfinding over the board's movement rules.
//!
//! The search runs backwards from the destination toward the moving piece so
//! that following parent links from the piece yields the path already in
//! walking order. Every step of a returned path satisfies
//! [`Board::valid_move`] with the destination square pinned as the exception,
//! which keeps room entries restricted to the destination's own room.

use std::{cmp::Ordering, collections::BinaryHeap};

use cluedo_board::{query, Board};
use cluedo_core::{CellCoord, ItemId, MovePath};
use tracing::debug;

/// Reusable A* search workspace.
#[derive(Debug, Default)]
pub struct Pathfinder {
    nodes: Vec<Node>,
    frontier: BinaryHeap<FrontierEntry>,
    visited: Vec<bool>,
    sequence: u64,
}

impl Pathfinder {
    /// Finds a legal path from `start` to `end`.
    ///
    /// The returned path excludes `start` and ends on `end`. `None` is
    /// returned when the points coincide, when `start` has no legal way out,
    /// or when `end` cannot be reached.
    pub fn find_path(&mut self, board: &Board, start: CellCoord, end: CellCoord) -> Option<MovePath> {
        if start == end {
            return None;
        }

        let exception = Some(end);
        if board.adjacent_squares(start, exception).is_empty() {
            debug!(%start, %end, "start square has no legal exit");
            return None;
        }

        let (columns, rows) = board.dimensions();
        self.prepare_workspace(columns, rows);
        self.push(end, 0, start, None);

        let mut goal = None;
        while let Some(entry) = self.frontier.pop() {
            let node = self.nodes[entry.node];
            let Some(index) = board.square_index(node.cell) else {
                continue;
            };
            if self.visited[index] {
                continue;
            }
            if node.cell == start {
                goal = Some(entry.node);
                break;
            }
            self.visited[index] = true;

            let expandable = board
                .square(node.cell)
                .map_or(false, |square| square.can_contain_piece());
            if !expandable {
                continue;
            }

            for neighbor in board.approach_squares(node.cell, exception) {
                let seen = board
                    .square_index(neighbor)
                    .map_or(true, |neighbor_index| self.visited[neighbor_index]);
                if !seen {
                    self.push(neighbor, node.length + 1, start, Some(entry.node));
                }
            }
        }

        let Some(goal) = goal else {
            debug!(%start, %end, "no path found");
            return None;
        };

        let mut steps = Vec::new();
        let mut cursor = self.nodes[goal].parent;
        while let Some(index) = cursor {
            let node = self.nodes[index];
            steps.push(node.cell);
            cursor = node.parent;
        }
        debug!(%start, %end, steps = steps.len(), "path found");
        Some(MovePath::new(steps))
    }

    /// Plans the route a piece would take toward a clicked square.
    ///
    /// A piece inside a room leaves through the door of that room closest to
    /// the target, and a target inside a room is reached through its door
    /// closest to the departure point. Targets inside the piece's own room are
    /// unreachable, except for the room's portal square, which yields a
    /// single step into the portal's destination room.
    ///
    /// That step names the first free resting square of the destination
    /// room, so the planned route is the same every time. Where the piece
    /// actually lands is chosen at random by [`Board::move_item`] when it
    /// enters the room.
    pub fn plan_route(&mut self, board: &Board, item: ItemId, target: CellCoord) -> Option<MovePath> {
        let start = board.item(item)?.cell();
        let start_square = board.square(start)?;
        let target_square = board.square(target)?;
        let start_room = start_square.room()?;
        let target_room = target_square.room()?;

        if start_square.is_room() && start_room == target_room {
            let destination = target_square.portal()?;
            let landing = board
                .room(destination)?
                .squares()
                .iter()
                .copied()
                .find(|cell| {
                    board.square(*cell).map_or(false, |square| {
                        !square.is_door() && square.portal().is_none() && square.can_contain_piece()
                    })
                })?;
            return Some(MovePath::new([landing]));
        }

        let from = if start_square.is_room() {
            query::closest_door(board, start_room, target)?
        } else {
            start
        };
        let to = if target_square.is_room() {
            query::closest_door(board, target_room, from)?
        } else {
            target
        };

        self.find_path(board, from, to)
    }

    fn prepare_workspace(&mut self, columns: u32, rows: u32) {
        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        if self.visited.len() != cell_count {
            self.visited = vec![false; cell_count];
        } else {
            self.visited.fill(false);
        }
        self.nodes.clear();
        self.frontier.clear();
        self.sequence = 0;
    }

    fn push(&mut self, cell: CellCoord, length: u32, goal: CellCoord, parent: Option<usize>) {
        let estimate = estimate(cell, goal);
        self.nodes.push(Node {
            cell,
            length,
            parent,
        });
        self.frontier.push(FrontierEntry {
            total: f64::from(length) + estimate,
            length,
            sequence: self.sequence,
            node: self.nodes.len() - 1,
        });
        self.sequence += 1;
    }
}

/// Finds a legal path from `start` to `end` with a fresh workspace.
#[must_use]
pub fn find_path(board: &Board, start: CellCoord, end: CellCoord) -> Option<MovePath> {
    Pathfinder::default().find_path(board, start, end)
}

/// Straight-line distance plus one.
fn estimate(from: CellCoord, goal: CellCoord) -> f64 {
    from.euclidean_distance(goal) + 1.0
}

#[derive(Clone, Copy, Debug)]
struct Node {
    cell: CellCoord,
    length: u32,
    parent: Option<usize>,
}

/// Heap entry ordered so the lowest total cost pops first, then the shortest
/// length, then the earliest insertion.
#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    total: f64,
    length: u32,
    sequence: u64,
    node: usize,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .total
            .total_cmp(&self.total)
            .then_with(|| other.length.cmp(&self.length))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

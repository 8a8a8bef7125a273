//! Grid adjacency and connected-component clustering of linkable blocks.
//!
//! Linkable blocks are the vertices, grid adjacency provides the edges, and
//! every connected component with at least two members becomes a candidate
//! session.

use crate::ids::{BlockId, HabitGroupId, HabitId};
use crate::types::{Block, GridPos, Habit, HabitGroup};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Which neighboring cells count as touching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyMode {
    /// Same day, neighboring time slot.
    Vertical,
    /// Vertical, plus same time slot on a neighboring day.
    VerticalAndHorizontal,
}

impl Default for AdjacencyMode {
    fn default() -> Self {
        AdjacencyMode::VerticalAndHorizontal
    }
}

impl AdjacencyMode {
    /// Cells that touch `pos`. Diagonals and the cell itself are excluded.
    fn neighbors(self, pos: GridPos) -> impl Iterator<Item = GridPos> {
        let vertical = [
            pos.time_index.checked_sub(1),
            pos.time_index.checked_add(1),
        ]
        .into_iter()
        .flatten()
        .map(move |time_index| GridPos::new(pos.day_index, time_index));

        let horizontal_enabled = self == AdjacencyMode::VerticalAndHorizontal;
        let horizontal = [pos.day_index.checked_sub(1), pos.day_index.checked_add(1)]
            .into_iter()
            .flatten()
            .filter(move |_| horizontal_enabled)
            .map(move |day_index| GridPos::new(day_index, pos.time_index));

        vertical.chain(horizontal)
    }
}

/// Whether two grid cells touch under `mode`.
pub fn is_adjacent(a: GridPos, b: GridPos, mode: AdjacencyMode) -> bool {
    let same_day_neighbor =
        a.day_index == b.day_index && a.time_index.abs_diff(b.time_index) == 1;
    let same_time_neighbor = mode == AdjacencyMode::VerticalAndHorizontal
        && a.time_index == b.time_index
        && a.day_index.abs_diff(b.day_index) == 1;
    same_day_neighbor || same_time_neighbor
}

/// Whether two blocks sit in touching cells. Unscheduled blocks touch nothing.
pub fn blocks_adjacent(a: &Block, b: &Block, mode: AdjacencyMode) -> bool {
    match (a.slot(), b.slot()) {
        (Some(pa), Some(pb)) => is_adjacent(pa, pb, mode),
        _ => false,
    }
}

/// Scheduled blocks whose habit belongs to a group with adjacent-merge behavior.
///
/// Dangling habit or group references make a block unlinkable rather than
/// being reported as errors. Input order is preserved.
pub fn linkable_blocks<'a>(
    blocks: &'a [Block],
    habits: &[Habit],
    groups: &[HabitGroup],
) -> Vec<&'a Block> {
    let merging_groups: HashSet<HabitGroupId> = groups
        .iter()
        .filter(|g| g.merges_adjacent())
        .map(|g| g.id)
        .collect();
    let linkable_habits: HashSet<HabitId> = habits
        .iter()
        .filter(|h| {
            h.habit_group_id
                .is_some_and(|group| merging_groups.contains(&group))
        })
        .map(|h| h.id)
        .collect();

    blocks
        .iter()
        .filter(|b| b.slot().is_some())
        .filter(|b| b.is_habit_block)
        .filter(|b| b.habit_id.is_some_and(|h| linkable_habits.contains(&h)))
        .collect()
}

/// A connected component of two or more touching linkable blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacentGroup {
    /// Member blocks, in input order.
    pub blocks: Vec<Block>,
    /// Grid cell of each member, parallel to `blocks`.
    pub positions: Vec<GridPos>,
}

impl AdjacentGroup {
    /// Identifiers of the member blocks.
    pub fn block_ids(&self) -> BTreeSet<BlockId> {
        self.blocks.iter().map(|b| b.id).collect()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false for groups returned by [`find_adjacent_groups`].
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Clusters linkable blocks into connected components.
///
/// Components are discovered in input order (each seeded by the first block not
/// yet visited) and expanded breadth-first through a cell index. Components
/// with fewer than two members are dropped.
pub fn find_adjacent_groups(
    blocks: &[Block],
    habits: &[Habit],
    groups: &[HabitGroup],
    mode: AdjacencyMode,
) -> Vec<AdjacentGroup> {
    let linkable = linkable_blocks(blocks, habits, groups);
    if linkable.len() < 2 {
        return Vec::new();
    }

    // cell -> indices into `linkable`
    let mut cells: HashMap<GridPos, Vec<usize>> = HashMap::new();
    for (idx, block) in linkable.iter().enumerate() {
        if let Some(pos) = block.slot() {
            cells.entry(pos).or_default().push(idx);
        }
    }

    let mut visited = vec![false; linkable.len()];
    let mut result = Vec::new();

    for seed in 0..linkable.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;

        let mut members = vec![seed];
        let mut queue = VecDeque::from([seed]);

        while let Some(current) = queue.pop_front() {
            let Some(pos) = linkable[current].slot() else {
                continue;
            };
            for neighbor_pos in mode.neighbors(pos) {
                let Some(occupants) = cells.get(&neighbor_pos) else {
                    continue;
                };
                for &idx in occupants {
                    if !visited[idx] {
                        visited[idx] = true;
                        members.push(idx);
                        queue.push_back(idx);
                    }
                }
            }
        }

        if members.len() < 2 {
            continue;
        }

        members.sort_unstable();
        let group_blocks: Vec<Block> = members.iter().map(|&i| linkable[i].clone()).collect();
        let positions = group_blocks.iter().filter_map(Block::slot).collect();
        result.push(AdjacentGroup {
            blocks: group_blocks,
            positions,
        });
    }

    result
}

//! Navigation graphs parsed from ASCII layouts.

use crate::Direction;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

const UNREACHABLE: u16 = u16::MAX;

const LAYOUT_CLASSIC: &[&str] = &[
    "###################",
    "#........#........#",
    "#o##.###.#.###.##o#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.###-#-###.####",
    "####.#-------#.####",
    "####.#-##G##-#.####",
    "----.--#GGG#--.----",
    "####.#-#####-#.####",
    "####.#-------#.####",
    "####.#-#####-#.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#.....P.....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

const LAYOUT_CROSSROADS: &[&str] = &[
    "###################",
    "#o.......#.......o#",
    "#.##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.###-#-###.####",
    "####.#-------#.####",
    "####.#-##G##-#.####",
    "----.--#GGG#--.----",
    "####.#-#####-#.####",
    "####.#-------#.####",
    "####.#-#####-#.####",
    "#........#........#",
    "#.####.#.#.#.####.#",
    "#o.....#.P.#.....o#",
    "#.###.###.###.###.#",
    "#.................#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    #[error("layout '{0}' has no rows")]
    Empty(String),
    #[error("layout '{name}' row {row} has width {found}, expected {expected}")]
    RaggedRow {
        name: String,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("layout '{0}' has no agent start")]
    MissingAgentStart(String),
    #[error("layout '{0}' has more than one agent start")]
    DuplicateAgentStart(String),
    #[error("layout '{0}' has no adversary start")]
    MissingLair(String),
    #[error("layout '{name}' is disconnected: {reachable}/{total} nodes reachable")]
    Disconnected {
        name: String,
        reachable: usize,
        total: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PillKind {
    Pill,
    PowerPill,
}

#[derive(Debug, Clone)]
pub struct MazeNode {
    pub x: usize,
    pub y: usize,
    pub neighbors: [Option<usize>; 4],
    pub pill: Option<PillKind>,
}

impl MazeNode {
    pub fn degree(&self) -> usize {
        self.neighbors.iter().filter(|item| item.is_some()).count()
    }
}

#[derive(Debug)]
pub struct Maze {
    name: String,
    width: usize,
    height: usize,
    nodes: Vec<MazeNode>,
    junctions: Vec<usize>,
    agent_start: usize,
    lair: Vec<usize>,
    distances: Vec<u16>,
}

impl Maze {
    pub fn parse(name: &str, rows: &[&str]) -> Result<Self, MazeError> {
        let height = rows.len();
        let width = rows
            .first()
            .map(|row| row.chars().count())
            .ok_or_else(|| MazeError::Empty(name.to_string()))?;
        let grid: Vec<Vec<char>> = rows.iter().map(|row| row.chars().collect()).collect();
        for (row, cells) in grid.iter().enumerate() {
            if cells.len() != width {
                return Err(MazeError::RaggedRow {
                    name: name.to_string(),
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
        }

        let mut cell_index = vec![None; width * height];
        let mut nodes = Vec::new();
        let mut agent_start = None;
        let mut lair = Vec::new();
        for (y, cells) in grid.iter().enumerate() {
            for (x, ch) in cells.iter().enumerate() {
                let pill = match ch {
                    '.' => Some(PillKind::Pill),
                    'o' => Some(PillKind::PowerPill),
                    '-' | 'P' | 'G' => None,
                    _ => continue,
                };
                let idx = nodes.len();
                if *ch == 'P' {
                    if agent_start.is_some() {
                        return Err(MazeError::DuplicateAgentStart(name.to_string()));
                    }
                    agent_start = Some(idx);
                }
                if *ch == 'G' {
                    lair.push(idx);
                }
                cell_index[y * width + x] = Some(idx);
                nodes.push(MazeNode {
                    x,
                    y,
                    neighbors: [None; 4],
                    pill,
                });
            }
        }
        let agent_start =
            agent_start.ok_or_else(|| MazeError::MissingAgentStart(name.to_string()))?;
        if lair.is_empty() {
            return Err(MazeError::MissingLair(name.to_string()));
        }

        for node in nodes.iter_mut() {
            let (x, y) = (node.x, node.y);
            let wraps =
                cell_index[y * width].is_some() && cell_index[y * width + width - 1].is_some();
            for dir in Direction::ALL {
                let target = match dir {
                    Direction::Up if y > 0 => Some((x, y - 1)),
                    Direction::Down if y + 1 < height => Some((x, y + 1)),
                    Direction::Left if x > 0 => Some((x - 1, y)),
                    Direction::Left if wraps => Some((width - 1, y)),
                    Direction::Right if x + 1 < width => Some((x + 1, y)),
                    Direction::Right if wraps => Some((0, y)),
                    _ => None,
                };
                node.neighbors[dir.index()] =
                    target.and_then(|(tx, ty)| cell_index[ty * width + tx]);
            }
        }

        let junctions = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.degree() >= 3)
            .map(|(idx, _)| idx)
            .collect();

        let distances = all_pairs_distances(&nodes);
        let reachable = distances[..nodes.len()]
            .iter()
            .filter(|value| **value != UNREACHABLE)
            .count();
        if reachable != nodes.len() {
            return Err(MazeError::Disconnected {
                name: name.to_string(),
                reachable,
                total: nodes.len(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            width,
            height,
            nodes,
            junctions,
            agent_start,
            lair,
            distances,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, index: usize) -> Option<&MazeNode> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[MazeNode] {
        &self.nodes
    }

    pub fn neighbor(&self, index: usize, dir: Direction) -> Option<usize> {
        self.nodes.get(index)?.neighbors[dir.index()]
    }

    pub fn junctions(&self) -> &[usize] {
        &self.junctions
    }

    pub fn agent_start(&self) -> usize {
        self.agent_start
    }

    pub fn lair(&self) -> &[usize] {
        &self.lair
    }

    pub fn pill_nodes(&self) -> impl Iterator<Item = (usize, PillKind)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| node.pill.map(|kind| (idx, kind)))
    }

    /// Shortest path length in moves.
    pub fn distance(&self, from: usize, to: usize) -> u32 {
        let n = self.nodes.len();
        if from >= n || to >= n {
            return u32::MAX;
        }
        match self.distances[from * n + to] {
            UNREACHABLE => u32::MAX,
            value => value as u32,
        }
    }

    pub fn moves_from(&self, index: usize) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|dir| self.neighbor(index, *dir).is_some())
            .collect()
    }

    /// Direction out of `from` that minimises (or maximises) the distance to
    /// `target`, never using `forbidden` unless it is the only exit.
    pub fn step_relative(
        &self,
        from: usize,
        target: usize,
        forbidden: Option<Direction>,
        approach: bool,
    ) -> Option<Direction> {
        let exits = self.moves_from(from);
        let allowed: Vec<Direction> = match forbidden {
            Some(blocked) if exits.len() > 1 => {
                exits.iter().copied().filter(|dir| *dir != blocked).collect()
            }
            _ => exits,
        };
        let scored = allowed.into_iter().filter_map(|dir| {
            let next = self.neighbor(from, dir)?;
            Some((self.distance(next, target), dir))
        });
        if approach {
            scored.min_by_key(|(dist, _)| *dist).map(|(_, dir)| dir)
        } else {
            scored.max_by_key(|(dist, _)| *dist).map(|(_, dir)| dir)
        }
    }
}

fn all_pairs_distances(nodes: &[MazeNode]) -> Vec<u16> {
    let n = nodes.len();
    let mut out = vec![UNREACHABLE; n * n];
    let mut queue = VecDeque::new();
    for source in 0..n {
        let row = &mut out[source * n..(source + 1) * n];
        row[source] = 0;
        queue.clear();
        queue.push_back(source);
        while let Some(current) = queue.pop_front() {
            let next_dist = row[current].saturating_add(1);
            for next in nodes[current].neighbors.iter().flatten() {
                if row[*next] == UNREACHABLE {
                    row[*next] = next_dist;
                    queue.push_back(*next);
                }
            }
        }
    }
    out
}

/// Built-in layouts in level order; levels past the end cycle back.
pub fn builtin_layouts() -> Result<Vec<Arc<Maze>>, MazeError> {
    Ok(vec![
        Arc::new(Maze::parse("classic", LAYOUT_CLASSIC)?),
        Arc::new(Maze::parse("crossroads", LAYOUT_CROSSROADS)?),
    ])
}

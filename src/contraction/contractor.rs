use std::time::{Duration, Instant};

use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use itertools::Itertools;
use log::info;

use super::{edge_filter::EdgeLevelFilter, witness_search::witness_search, PrepareError, Shortcut};
use crate::{
    graphs::{flags, Level, LevelGraph, Vertex, Weight},
    queue::{NodeQueue, Priority},
    utility::get_progressbar,
    weighting::Weighting,
};

// Coefficients of the priority heuristic, the linear combination from the
// contraction-hierarchies literature. The terms must not depend on the
// priority of the vertex itself, otherwise the lazy updates diverge.
const EDGE_DIFFERENCE_COEFFICIENT: Priority = 2;
const ORIGINAL_EDGES_COEFFICIENT: Priority = 4;
const CONTRACTED_NEIGHBOURS_COEFFICIENT: Priority = 1;

/// Outgoing candidate collected while contracting a vertex: the far end of a
/// tail -> vertex -> head pair, with the weight of that detour.
struct Goal {
    head: Vertex,
    original_edges: u32,
    weight: Weight,
}

/// Builds a contraction hierarchy in place. Rewrites every stored distance
/// to its overlay weight, then contracts vertices in priority order, adding
/// the shortcuts the witness searches could not rule out and assigning each
/// vertex its level.
pub struct Contractor<'a, G, W> {
    graph: &'a mut G,
    weighting: W,
    queue: NodeQueue,
    priorities: Vec<Priority>,
    pending: HashMap<u64, Shortcut>,
}

impl<'a, G: LevelGraph, W: Weighting> Contractor<'a, G, W> {
    pub fn new(graph: &'a mut G, weighting: W) -> Contractor<'a, G, W> {
        let number_of_vertices = graph.number_of_vertices() as usize;
        Contractor {
            graph,
            weighting,
            queue: NodeQueue::new(),
            priorities: vec![0; number_of_vertices],
            pending: HashMap::new(),
        }
    }

    /// Runs the whole preparation. Returns the number of shortcuts added.
    pub fn run(&mut self) -> Result<u32, PrepareError> {
        self.prepare_edges()?;
        self.prepare_nodes()?;
        Ok(self.contract_nodes())
    }

    /// Replaces every stored distance with its weight under the chosen
    /// weighting and resets the original-edges counters. Shortcut flags
    /// cannot encode a road class, so from here on all searches read the
    /// weight directly from the distance slot.
    ///
    /// A graph with contracted vertices already stores weights; converting
    /// them a second time would corrupt them, so the rewrite only runs on an
    /// untouched graph.
    pub fn prepare_edges(&mut self) -> Result<(), PrepareError> {
        if self.graph.number_of_edges() == 0 {
            return Err(PrepareError::EmptyGraph);
        }
        let already_prepared = (0..self.graph.number_of_vertices())
            .any(|vertex| self.graph.level(vertex) != 0);
        if already_prepared {
            return Ok(());
        }
        for edge in 0..self.graph.number_of_edges() {
            let weight = self
                .weighting
                .weight(self.graph.edge_weight(edge), self.graph.edge_flags(edge));
            self.graph.set_edge_weight(edge, weight);
            self.graph.set_original_edges(edge, 1);
        }
        Ok(())
    }

    /// Seeds the queue with the priority of every uncontracted vertex.
    pub fn prepare_nodes(&mut self) -> Result<(), PrepareError> {
        for vertex in 0..self.graph.number_of_vertices() {
            if self.graph.level(vertex) != 0 {
                continue;
            }
            let priority = self.calculate_priority(vertex);
            self.priorities[vertex as usize] = priority;
            self.queue.insert(vertex, priority);
        }
        if self.queue.is_empty() {
            return Err(PrepareError::EmptyQueue);
        }
        info!("queue seeded with {} vertices", self.queue.len());
        Ok(())
    }

    /// Contraction main loop: pop the cheapest vertex, re-check its priority
    /// against the queue, contract it and refresh the neighbourhood.
    pub fn contract_nodes(&mut self) -> u32 {
        let mut level: Level = (0..self.graph.number_of_vertices())
            .map(|vertex| self.graph.level(vertex))
            .max()
            .unwrap_or(0)
            + 1;
        let mut new_shortcuts = 0;

        let update_size = std::cmp::max(10, self.queue.len() as u32 / 10);
        let mut counter = 0u32;
        let mut update_counter = 0u32;
        let mut refresh_time = Duration::ZERO;

        let progress = get_progressbar("Contracting", self.queue.len() as u64);
        while !self.queue.is_empty() {
            if counter % update_size == 0 {
                // The lazy updates drift over long runs; every second tick,
                // recompute the priority of every uncontracted vertex.
                if update_counter > 0 && update_counter % 2 == 0 {
                    let start = Instant::now();
                    for vertex in 0..self.graph.number_of_vertices() {
                        if self.graph.level(vertex) != 0 {
                            continue;
                        }
                        let old = self.priorities[vertex as usize];
                        let new = self.calculate_priority(vertex);
                        self.priorities[vertex as usize] = new;
                        self.queue.update(vertex, old, new);
                    }
                    refresh_time += start.elapsed();
                }
                update_counter += 1;
                info!(
                    "iteration {counter}, vertices left: {}, shortcuts: {new_shortcuts}, full refresh time: {refresh_time:?}",
                    self.queue.len()
                );
            }
            counter += 1;

            let Some(vertex) = self.queue.poll_key() else {
                break;
            };

            // The popped priority may be stale. If the vertex got more
            // expensive than the current minimum, requeue it instead.
            let priority = self.calculate_priority(vertex);
            self.priorities[vertex as usize] = priority;
            if let Some(minimum) = self.queue.peek_value() {
                if priority > minimum {
                    self.queue.insert(vertex, priority);
                    continue;
                }
            }

            new_shortcuts += self.add_shortcuts(vertex);
            self.graph.set_level(vertex, level);
            level += 1;
            progress.inc(1);

            let filter = EdgeLevelFilter::new();
            let neighbours = self
                .graph
                .edges(vertex)
                .filter(|edge| filter.accept(&*self.graph, edge))
                .map(|edge| edge.head)
                .unique()
                .collect_vec();
            for neighbour in neighbours {
                let old = self.priorities[neighbour as usize];
                let new = self.calculate_priority(neighbour);
                if new != old {
                    self.priorities[neighbour as usize] = new;
                    self.queue.update(neighbour, old, new);
                }
            }
        }
        progress.finish_and_clear();
        info!("contraction done, {new_shortcuts} new shortcuts");

        new_shortcuts
    }

    /// Priority of contracting `vertex`, evaluated on a simulated
    /// contraction that leaves the graph untouched.
    pub fn calculate_priority(&mut self, vertex: Vertex) -> Priority {
        self.find_shortcuts(vertex);

        let degree = self.graph.edges(vertex).count() as Priority;
        let edge_difference = self.pending.len() as Priority - degree;

        let original_edges: Priority = self
            .pending
            .values()
            .map(|shortcut| shortcut.original_edges as Priority)
            .sum();

        let contracted_neighbours = self
            .graph
            .edges(vertex)
            .filter(|edge| edge.skipped.is_some())
            .count() as Priority;

        EDGE_DIFFERENCE_COEFFICIENT * edge_difference
            + ORIGINAL_EDGES_COEFFICIENT * original_edges
            + CONTRACTED_NEIGHBOURS_COEFFICIENT * contracted_neighbours
    }

    /// Collects the shortcuts that contracting `vertex` would make
    /// necessary, without changing the graph. The result is kept in the
    /// pending map until the next call.
    pub fn find_shortcuts(&mut self, vertex: Vertex) {
        self.pending.clear();

        let in_edges = self
            .graph
            .in_edges(vertex)
            .filter(|edge| self.graph.level(edge.head) == 0)
            .collect_vec();

        for in_edge in in_edges {
            let tail = in_edge.head;

            let mut goals = Vec::new();
            let mut targets = HashSet::new();
            let mut max_weight: Weight = 0.0;
            for out_edge in self.graph.out_edges(vertex) {
                let head = out_edge.head;
                if head == tail || self.graph.level(head) != 0 {
                    continue;
                }
                let weight = in_edge.weight + out_edge.weight;
                if weight > max_weight {
                    max_weight = weight;
                }
                targets.insert(head);
                goals.push(Goal {
                    head,
                    original_edges: out_edge.original_edges,
                    weight,
                });
            }
            if goals.is_empty() {
                continue;
            }

            let witness_weights =
                witness_search(&*self.graph, tail, vertex, max_weight, &targets);

            for goal in goals {
                if let Some(&witness) = witness_weights.get(&goal.head) {
                    if witness <= goal.weight {
                        // A path around `vertex` is at least as good, no
                        // shortcut needed.
                        continue;
                    }
                }
                self.register(
                    tail,
                    goal.head,
                    goal.weight,
                    in_edge.original_edges + goal.original_edges,
                );
            }
        }
    }

    /// Records a pending shortcut, merging the two directions of a pair into
    /// one bidirectional record when they carry the same weight.
    fn register(&mut self, tail: Vertex, head: Vertex, weight: Weight, original_edges: u32) {
        let number_of_vertices = self.graph.number_of_vertices() as u64;
        let forward_key = tail as u64 * number_of_vertices + head as u64;
        let reverse_key = head as u64 * number_of_vertices + tail as u64;

        // Shortcuts end up one-way once the levels are assigned, but the
        // levels are not known yet, so the same pair can surface once per
        // direction.
        let merge_key = match (
            self.pending.get(&forward_key),
            self.pending.get(&reverse_key),
        ) {
            (Some(_), Some(_)) => {
                panic!("pending shortcuts in both directions for {tail} -> {head}")
            }
            (Some(shortcut), None) if shortcut.weight == weight => Some(forward_key),
            (None, Some(shortcut)) if shortcut.weight == weight => Some(reverse_key),
            _ => None,
        };

        if let Some(key) = merge_key {
            // The other direction of the pair was already found with the
            // same weight, one bidirectional record covers both.
            self.pending.get_mut(&key).unwrap().flags = flags::SHORTCUT_BOTH_DIR;
        } else {
            self.pending.insert(
                forward_key,
                Shortcut {
                    tail,
                    head,
                    weight,
                    flags: flags::SHORTCUT_ONE_DIR,
                    original_edges,
                },
            );
        }
    }

    /// Installs the shortcuts for `vertex` into the graph. Returns how many
    /// were freshly added; improving an existing shortcut in place does not
    /// count.
    pub fn add_shortcuts(&mut self, vertex: Vertex) -> u32 {
        self.find_shortcuts(vertex);

        let mut added = 0;
        let Contractor { graph, pending, .. } = self;
        for shortcut in pending.values() {
            let overwrite = graph
                .out_edges(shortcut.tail)
                .find(|edge| {
                    edge.skipped.is_some()
                        && edge.head == shortcut.head
                        && graph.edge_tail(edge.id) == shortcut.tail
                        && flags::can_be_overwritten(edge.flags, shortcut.flags)
                        && edge.weight > shortcut.weight
                })
                .map(|edge| edge.id);

            if let Some(edge) = overwrite {
                graph.set_edge_flags(edge, shortcut.flags);
                graph.set_skipped_vertex(edge, Some(vertex));
                graph.set_edge_weight(edge, shortcut.weight);
                graph.set_original_edges(edge, shortcut.original_edges);
            } else {
                let edge = graph.shortcut(
                    shortcut.tail,
                    shortcut.head,
                    shortcut.weight,
                    shortcut.flags,
                    vertex,
                );
                graph.set_original_edges(edge, shortcut.original_edges);
                added += 1;
            }
        }
        added
    }

    /// Shortcuts produced by the most recent find_shortcuts call.
    pub fn pending_shortcuts(&self) -> impl Iterator<Item = &Shortcut> + '_ {
        self.pending.values()
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::Contractor;
    use crate::{
        graphs::{
            flags,
            graph_functions::{add_bidirectional, add_one_way},
            vec_level_graph::VecLevelGraph,
            LevelGraph,
        },
        weighting::ShortestWeighting,
    };

    #[test]
    fn witness_suppresses_shortcut() {
        let mut graph = VecLevelGraph::new(3);
        add_one_way(&mut graph, 0, 1, 1.0);
        add_one_way(&mut graph, 1, 2, 1.0);
        add_one_way(&mut graph, 0, 2, 1.5);

        let mut contractor = Contractor::new(&mut graph, ShortestWeighting);
        contractor.prepare_edges().unwrap();
        contractor.find_shortcuts(1);
        assert_eq!(contractor.pending_shortcuts().count(), 0);
    }

    #[test]
    fn equal_weight_witness_counts() {
        let mut graph = VecLevelGraph::new(3);
        add_one_way(&mut graph, 0, 1, 1.0);
        add_one_way(&mut graph, 1, 2, 1.0);
        add_one_way(&mut graph, 0, 2, 2.0);

        let mut contractor = Contractor::new(&mut graph, ShortestWeighting);
        contractor.prepare_edges().unwrap();
        contractor.find_shortcuts(1);
        assert_eq!(contractor.pending_shortcuts().count(), 0);
    }

    #[test]
    fn missing_witness_creates_shortcut() {
        let mut graph = VecLevelGraph::new(3);
        add_one_way(&mut graph, 0, 1, 1.0);
        add_one_way(&mut graph, 1, 2, 1.0);
        add_one_way(&mut graph, 0, 2, 5.0);

        let mut contractor = Contractor::new(&mut graph, ShortestWeighting);
        contractor.prepare_edges().unwrap();
        contractor.find_shortcuts(1);

        let shortcuts = contractor.pending_shortcuts().collect_vec();
        assert_eq!(shortcuts.len(), 1);
        assert_eq!(shortcuts[0].tail, 0);
        assert_eq!(shortcuts[0].head, 2);
        assert_eq!(shortcuts[0].weight, 2.0);
        assert_eq!(shortcuts[0].original_edges, 2);
        assert_eq!(shortcuts[0].flags, flags::SHORTCUT_ONE_DIR);
    }

    #[test]
    fn opposite_directions_merge_into_one_record() {
        let mut graph = VecLevelGraph::new(3);
        add_bidirectional(&mut graph, 0, 1, 1.0);
        add_bidirectional(&mut graph, 1, 2, 1.0);

        let mut contractor = Contractor::new(&mut graph, ShortestWeighting);
        contractor.prepare_edges().unwrap();
        contractor.find_shortcuts(1);

        let shortcuts = contractor.pending_shortcuts().collect_vec();
        assert_eq!(shortcuts.len(), 1);
        assert_eq!(shortcuts[0].flags, flags::SHORTCUT_BOTH_DIR);
        assert_eq!(shortcuts[0].weight, 2.0);
        assert_eq!(shortcuts[0].original_edges, 2);
    }

    #[test]
    fn priority_combines_the_three_terms() {
        // Contracting 1 in the no-witness triangle yields one shortcut of
        // two original edges against an undirected degree of two.
        let mut graph = VecLevelGraph::new(3);
        add_one_way(&mut graph, 0, 1, 1.0);
        add_one_way(&mut graph, 1, 2, 1.0);
        add_one_way(&mut graph, 0, 2, 5.0);

        let mut contractor = Contractor::new(&mut graph, ShortestWeighting);
        contractor.prepare_edges().unwrap();
        assert_eq!(contractor.calculate_priority(1), 2 * (1 - 2) + 4 * 2);
    }

    #[test]
    fn add_shortcuts_overwrites_worse_shortcut_in_place() {
        // A worse shortcut 0 -> 2 over the already contracted vertex 3 is
        // present; contracting 1 finds a better one for the same pair.
        let mut graph = VecLevelGraph::new(4);
        add_one_way(&mut graph, 0, 1, 3.0);
        add_one_way(&mut graph, 1, 2, 3.0);
        let stale = graph.shortcut(0, 2, 10.0, flags::SHORTCUT_ONE_DIR, 3);
        graph.set_original_edges(stale, 2);
        graph.set_level(3, 1);

        let edges_before = graph.number_of_edges();
        let mut contractor = Contractor::new(&mut graph, ShortestWeighting);
        let added = contractor.add_shortcuts(1);
        assert_eq!(added, 0);
        assert_eq!(graph.number_of_edges(), edges_before);

        let shortcut = graph
            .out_edges(0)
            .find(|edge| edge.head == 2 && edge.skipped.is_some())
            .unwrap();
        assert_eq!(shortcut.weight, 6.0);
        assert_eq!(shortcut.skipped, Some(1));
        assert_eq!(shortcut.original_edges, 2);
    }
}

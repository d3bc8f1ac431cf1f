use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::LayoutConfig;
use crate::ir::Direction;

/// Longest-path ranks over the given nodes. Nodes on a cycle keep the rank
/// reached before the cycle was detected.
pub(super) fn compute_ranks(node_ids: &[String], edges: &[(String, String)]) -> HashMap<String, usize> {
    let set: HashSet<&str> = node_ids.iter().map(String::as_str).collect();
    let mut indeg: HashMap<&str, usize> = node_ids.iter().map(|id| (id.as_str(), 0)).collect();
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();

    for (from, to) in edges {
        if set.contains(from.as_str()) && set.contains(to.as_str()) {
            adj.entry(from.as_str()).or_default().push(to.as_str());
            *indeg.entry(to.as_str()).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<&str> = node_ids
        .iter()
        .map(String::as_str)
        .filter(|id| indeg.get(id) == Some(&0))
        .collect();

    let mut order: Vec<&str> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    while let Some(node) = queue.pop_front() {
        if !visited.insert(node) {
            continue;
        }
        order.push(node);
        if let Some(nexts) = adj.get(node) {
            for next in nexts {
                if let Some(deg) = indeg.get_mut(next) {
                    *deg = deg.saturating_sub(1);
                    if *deg == 0 {
                        queue.push_back(*next);
                    }
                }
            }
        }
    }

    for id in node_ids {
        if visited.insert(id.as_str()) {
            order.push(id.as_str());
        }
    }

    let order_index: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx))
        .collect();

    let mut ranks: HashMap<String, usize> = HashMap::new();
    for node in &order {
        let rank = *ranks.entry(node.to_string()).or_insert(0);
        let Some(nexts) = adj.get(node) else {
            continue;
        };
        let from_idx = order_index[node];
        for next in nexts {
            if order_index[next] <= from_idx {
                continue;
            }
            let entry = ranks.entry(next.to_string()).or_insert(0);
            *entry = (*entry).max(rank + 1);
        }
    }

    ranks
}

/// Reorders each rank by the mean position of its predecessors in the
/// previous rank. Nodes without predecessors keep their slot order.
pub(super) fn order_rank_nodes(rank_nodes: &mut [Vec<String>], edges: &[(String, String)]) {
    let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, to) in edges {
        incoming.entry(to.as_str()).or_default().push(from.as_str());
    }

    for rank in 1..rank_nodes.len() {
        let (before, after) = rank_nodes.split_at_mut(rank);
        let previous: HashMap<&str, usize> = before[rank - 1]
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.as_str(), idx))
            .collect();
        let bucket = &mut after[0];
        let mut keyed: Vec<(f64, usize, String)> = bucket
            .drain(..)
            .enumerate()
            .map(|(slot, id)| {
                let positions: Vec<usize> = incoming
                    .get(id.as_str())
                    .map(|preds| preds.iter().filter_map(|p| previous.get(p).copied()).collect())
                    .unwrap_or_default();
                let key = if positions.is_empty() {
                    slot as f64
                } else {
                    positions.iter().sum::<usize>() as f64 / positions.len() as f64
                };
                (key, slot, id)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        bucket.extend(keyed.into_iter().map(|(_, _, id)| id));
    }
}

/// Center coordinates for every node using rank slots of uniform size.
pub(super) fn assign_ranked_positions(
    node_ids: &[String],
    edges: &[(String, String)],
    direction: Direction,
    config: &LayoutConfig,
) -> HashMap<String, (f64, f64)> {
    let ranks = compute_ranks(node_ids, edges);
    let max_rank = ranks.values().copied().max().unwrap_or(0);

    let mut rank_nodes: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    for id in node_ids {
        let rank = ranks.get(id).copied().unwrap_or(0);
        rank_nodes[rank].push(id.clone());
    }
    order_rank_nodes(&mut rank_nodes, edges);

    let (main_size, cross_size) = if direction.is_horizontal() {
        (config.node_width, config.node_height)
    } else {
        (config.node_height, config.node_width)
    };
    let main_step = main_size + f64::from(config.rank_spacing);
    let cross_step = cross_size + f64::from(config.node_spacing);

    let mut positions = HashMap::new();
    for (rank, bucket) in rank_nodes.iter().enumerate() {
        let slot_rank = match direction {
            Direction::LeftRight | Direction::TopBottom => rank,
            Direction::RightLeft | Direction::BottomTop => max_rank - rank,
        };
        let main = slot_rank as f64 * main_step + main_size / 2.0;
        for (slot, id) in bucket.iter().enumerate() {
            let cross = slot as f64 * cross_step + cross_size / 2.0;
            let point = if direction.is_horizontal() {
                (main, cross)
            } else {
                (cross, main)
            };
            positions.insert(id.clone(), point);
        }
    }
    positions
}

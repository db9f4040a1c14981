use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt::{Debug, Formatter},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError<T>
where
    T: Debug,
{
    #[error("Cycle detected in dependency graph, from {:?}", .0)]
    CycleDetected(DepRoute<T>),
    #[error("Duplicate edge detected in dependency graph, from {:?}", .0)]
    DuplicateEdge(DepRoute<T>),
}

pub struct DepRoute<T> {
    // first means the start node, last means the end node
    route: Vec<T>,
}

impl<T> DepRoute<T> {
    pub fn nodes(&self) -> &[T] {
        &self.route
    }
}

impl<T> Debug for DepRoute<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Some((last, rest)) = self.route.split_last() else {
            return write!(f, "[]");
        };
        for item in rest {
            write!(f, "{item:?} -> ")?;
        }
        write!(f, "{last:?}")
    }
}

/// Directed graph of "`from` is read by `to`" edges.
///
/// States and computes are nodes; an edge `a -> b` means `b` must be recomputed
/// whenever `a` changes.
#[derive(Debug)]
pub struct Graph<Node>
where
    Node: Debug + Copy + Ord,
{
    routes: Vec<(Node, Node)>,

    // transitive dependents, invalidated whenever a route is added
    route_cache: BTreeMap<Node, BTreeSet<Node>>,
}

impl<Node> Default for Graph<Node>
where
    Node: Debug + Copy + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Node> Graph<Node>
where
    Node: Debug + Copy + Ord,
{
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            route_cache: BTreeMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            routes: Vec::with_capacity(capacity),
            route_cache: BTreeMap::new(),
        }
    }

    pub fn route_to(&mut self, from: Node, to: Node) {
        self.routes.push((from, to));
        self.route_cache.clear();
    }

    /// Drop every route pointing at `to`.
    pub fn remove_routes_to(&mut self, to: Node) {
        self.routes.retain(|(_, target)| *target != to);
        self.route_cache.clear();
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn in_degrees(&self) -> BTreeMap<Node, usize> {
        let mut degrees = BTreeMap::<Node, usize>::new();

        for (from, to) in &self.routes {
            degrees.entry(*from).or_insert(0);
            *degrees.entry(*to).or_insert(0) += 1;
        }

        degrees
    }

    /// Kahn's algorithm. Returns every node that appears on a route, dependencies first.
    pub fn topology_sort(&self) -> Result<Vec<Node>, TopologyError<Node>> {
        let mut degrees = self.in_degrees();
        let mut order = Vec::with_capacity(degrees.len());

        while !degrees.is_empty() {
            let Some(node) = degrees
                .iter()
                .find(|(_, deg)| **deg == 0)
                .map(|(node, _)| *node)
            else {
                let keys: Vec<Node> = degrees.keys().copied().collect();
                let cycle = self.find_cycle(&keys).unwrap_or_default();
                return Err(TopologyError::CycleDetected(DepRoute { route: cycle }));
            };

            degrees.remove(&node);
            order.push(node);

            for connected in self.direct_connected_nodes(node)? {
                if let Some(deg) = degrees.get_mut(&connected) {
                    *deg -= 1;
                }
            }
        }

        Ok(order)
    }

    fn find_cycle(&self, nodes: &[Node]) -> Option<Vec<Node>> {
        let mut visited = BTreeSet::new();
        // nodes on the current DFS path
        let mut path_set = BTreeSet::new();
        let mut path = Vec::new();

        let neighbours_within = |node: Node| {
            self.direct_connected_nodes(node)
                .unwrap_or_default()
                .into_iter()
                .filter(|n| nodes.contains(n))
                .collect::<Vec<_>>()
                .into_iter()
        };

        let mut stack: Vec<(Node, std::vec::IntoIter<Node>)> = Vec::new();

        for &start_node in nodes {
            if visited.contains(&start_node) {
                continue;
            }

            stack.push((start_node, neighbours_within(start_node)));
            visited.insert(start_node);
            path_set.insert(start_node);
            path.push(start_node);

            while let Some((current_node, neighbours)) = stack.last_mut() {
                if let Some(neighbour) = neighbours.next() {
                    if path_set.contains(&neighbour) {
                        let pos = path.iter().position(|&x| x == neighbour)?;
                        let mut cycle = path.split_off(pos);
                        cycle.push(neighbour);
                        return Some(cycle);
                    } else if visited.insert(neighbour) {
                        path_set.insert(neighbour);
                        path.push(neighbour);
                        stack.push((neighbour, neighbours_within(neighbour)));
                    }
                } else {
                    let node_to_remove = *current_node;
                    stack.pop();
                    path_set.remove(&node_to_remove);
                    path.pop();
                }
            }
        }
        None
    }

    /// Every node that transitively depends on `node`.
    pub fn connected(&mut self, node: Node) -> impl Iterator<Item = &Node> {
        let routes = &self.routes;
        self.route_cache
            .entry(node)
            .or_insert_with(|| Self::connected_nodes(routes, node))
            .iter()
    }

    fn direct_connected_nodes(&self, node: Node) -> Result<BTreeSet<Node>, TopologyError<Node>> {
        let mut collected = BTreeSet::new();

        for (from, to) in &self.routes {
            if *from == node && !collected.insert(*to) {
                return Err(TopologyError::DuplicateEdge(DepRoute {
                    route: vec![node, *to],
                }));
            }
        }

        Ok(collected)
    }

    fn connected_nodes(routes: &[(Node, Node)], node: Node) -> BTreeSet<Node> {
        let mut collected = BTreeSet::new();
        let mut queue = VecDeque::from([node]);

        while let Some(current) = queue.pop_front() {
            for (from, to) in routes {
                // collected doubles as the visited set, so cycles cannot loop forever
                if *from == current && collected.insert(*to) {
                    queue.push_back(*to);
                }
            }
        }

        collected
    }
}

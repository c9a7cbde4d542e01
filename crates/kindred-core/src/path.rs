//! Shortest relationship path between two people

use crate::error::{Error, Result};
use crate::graph::RelationshipGraph;
use crate::person::{Person, PersonId};
use crate::relation::{Relationship, RelationshipKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// One traversed edge, with the kind as seen from `from`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub from: PersonId,
    pub to: PersonId,
    pub kind: RelationshipKind,
}

/// Ordered steps connecting two people
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipPath {
    pub steps: Vec<PathStep>,
}

impl RelationshipPath {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Person ids along the path, endpoints included
    pub fn nodes(&self) -> Vec<PersonId> {
        let mut nodes: Vec<PersonId> = self.steps.first().map(|s| s.from).into_iter().collect();
        nodes.extend(self.steps.iter().map(|s| s.to));
        nodes
    }

    /// Kinds along the path, in order
    pub fn kinds(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.kind.as_str()).collect()
    }
}

impl std::fmt::Display for RelationshipPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(first) = self.steps.first() else {
            return Ok(());
        };
        write!(f, "{}", first.from)?;
        for step in &self.steps {
            write!(f, " -[{}]-> {}", step.kind, step.to)?;
        }
        Ok(())
    }
}

/// How the breadth-first search remembers visited people
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStrategy {
    /// One visited set for the whole search, marked on enqueue
    #[default]
    Global,
    /// Every frontier entry carries the set of people on its own path
    PerPath,
}

/// Counters gathered during a search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes_visited: usize,
    pub edges_examined: usize,
}

/// Breadth-first path resolver
///
/// Returns the shortest path by edge count. Among several shortest paths the
/// first one discovered wins, following adjacency order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver {
    strategy: VisitStrategy,
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: VisitStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> VisitStrategy {
        self.strategy
    }

    /// Find the shortest path from `start` to `end`.
    ///
    /// Callers must reject `start == end` beforehand. `None` means the two
    /// people are not connected, including when either is absent from the
    /// graph.
    pub fn find_path(
        &self,
        graph: &RelationshipGraph,
        start: PersonId,
        end: PersonId,
    ) -> Option<RelationshipPath> {
        let (path, stats) = match self.strategy {
            VisitStrategy::Global => Self::global_bfs(graph, start, end),
            VisitStrategy::PerPath => Self::per_path_bfs(graph, start, end),
        };

        tracing::debug!(
            "Path search {} -> {} ({:?}): found={}, visited {} nodes, examined {} edges",
            start,
            end,
            self.strategy,
            path.is_some(),
            stats.nodes_visited,
            stats.edges_examined
        );

        path
    }

    fn global_bfs(
        graph: &RelationshipGraph,
        start: PersonId,
        end: PersonId,
    ) -> (Option<RelationshipPath>, SearchStats) {
        let mut stats = SearchStats::default();
        let mut visited: HashSet<PersonId> = HashSet::new();
        let mut parent: HashMap<PersonId, PathStep> = HashMap::new();
        let mut queue: VecDeque<PersonId> = VecDeque::new();
        let mut found = false;

        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            stats.nodes_visited += 1;

            if current == end {
                found = true;
                break;
            }

            for neighbor in graph.neighbors(current) {
                stats.edges_examined += 1;

                if visited.insert(neighbor.id) {
                    parent.insert(
                        neighbor.id,
                        PathStep {
                            from: current,
                            to: neighbor.id,
                            kind: neighbor.kind.clone(),
                        },
                    );
                    queue.push_back(neighbor.id);
                }
            }
        }

        let path = found.then(|| Self::reconstruct_path(start, end, &parent));
        (path, stats)
    }

    fn per_path_bfs(
        graph: &RelationshipGraph,
        start: PersonId,
        end: PersonId,
    ) -> (Option<RelationshipPath>, SearchStats) {
        struct Frontier {
            id: PersonId,
            steps: Vec<PathStep>,
            visited: HashSet<PersonId>,
        }

        let mut stats = SearchStats::default();
        let mut queue: VecDeque<Frontier> = VecDeque::new();
        queue.push_back(Frontier {
            id: start,
            steps: Vec::new(),
            visited: HashSet::from([start]),
        });

        while let Some(current) = queue.pop_front() {
            stats.nodes_visited += 1;

            if current.id == end {
                return (Some(RelationshipPath::new(current.steps)), stats);
            }

            for neighbor in graph.neighbors(current.id) {
                stats.edges_examined += 1;

                if current.visited.contains(&neighbor.id) {
                    continue;
                }

                let mut visited = current.visited.clone();
                visited.insert(neighbor.id);

                let mut steps = current.steps.clone();
                steps.push(PathStep {
                    from: current.id,
                    to: neighbor.id,
                    kind: neighbor.kind.clone(),
                });

                queue.push_back(Frontier {
                    id: neighbor.id,
                    steps,
                    visited,
                });
            }
        }

        (None, stats)
    }

    /// Walk the predecessor map back from `end`
    fn reconstruct_path(
        start: PersonId,
        end: PersonId,
        parent: &HashMap<PersonId, PathStep>,
    ) -> RelationshipPath {
        let mut steps = Vec::new();
        let mut current = end;

        while current != start {
            match parent.get(&current) {
                Some(step) => {
                    current = step.from;
                    steps.push(step.clone());
                }
                None => break,
            }
        }

        steps.reverse();
        RelationshipPath::new(steps)
    }
}

/// Shortest path with the default resolver
pub fn find_path(
    graph: &RelationshipGraph,
    start: PersonId,
    end: PersonId,
) -> Option<RelationshipPath> {
    PathResolver::new().find_path(graph, start, end)
}

/// A path step with full person records attached
///
/// `from` or `to` is `None` when the id is missing from the member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedStep {
    pub from: Option<Person>,
    pub to: Option<Person>,
    pub relationship: String,
    #[serde(skip)]
    from_id: Option<PersonId>,
    #[serde(skip)]
    to_id: Option<PersonId>,
}

impl HydratedStep {
    fn label(person: Option<&Person>, id: Option<PersonId>) -> String {
        match (person, id) {
            (Some(p), _) => p.name.clone(),
            (None, Some(id)) => format!("unknown #{}", id),
            (None, None) => "unknown".to_string(),
        }
    }

    pub fn from_label(&self) -> String {
        Self::label(self.from.as_ref(), self.from_id)
    }

    pub fn to_label(&self) -> String {
        Self::label(self.to.as_ref(), self.to_id)
    }
}

/// A resolved path ready for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HydratedPath {
    pub steps: Vec<HydratedStep>,
}

impl HydratedPath {
    /// Attach person records to every step of `path`
    pub fn hydrate(path: &RelationshipPath, people: &[Person]) -> Self {
        let by_id: HashMap<PersonId, &Person> = people.iter().map(|p| (p.id, p)).collect();

        let steps = path
            .steps
            .iter()
            .map(|step| {
                let from = by_id.get(&step.from).map(|p| (*p).clone());
                let to = by_id.get(&step.to).map(|p| (*p).clone());
                if from.is_none() || to.is_none() {
                    tracing::warn!(
                        "Path step {} -> {} references a member that no longer exists",
                        step.from,
                        step.to
                    );
                }
                HydratedStep {
                    from,
                    to,
                    relationship: step.kind.to_string(),
                    from_id: Some(step.from),
                    to_id: Some(step.to),
                }
            })
            .collect();

        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Render the chain, e.g. `Ada -[parent]-> Ben -[parent]-> Cal`
    pub fn describe(&self) -> String {
        let Some(first) = self.steps.first() else {
            return String::new();
        };

        let mut out = first.from_label();
        for step in &self.steps {
            out.push_str(&format!(" -[{}]-> {}", step.relationship, step.to_label()));
        }
        out
    }
}

/// Resolve the relationship chain between two members of one tree.
///
/// Rejects identical ids, builds the graph from the two feeds, runs the
/// default resolver and hydrates the result. `Ok(None)` means no connection.
pub fn resolve_relationship_path(
    people: &[Person],
    edges: &[Relationship],
    person1: PersonId,
    person2: PersonId,
) -> Result<Option<HydratedPath>> {
    if person1 == person2 {
        return Err(Error::InvalidInput(
            "Please select two different people".to_string(),
        ));
    }

    let graph = RelationshipGraph::build(people, edges);
    let path = find_path(&graph, person1, person2);

    Ok(path.map(|p| HydratedPath::hydrate(&p, people)))
}

//! Bidirectional relationship graph built from stored edges

use crate::person::{Person, PersonId};
use crate::relation::{Relationship, RelationshipKind};
use std::collections::HashMap;

/// An adjacency entry: the neighbor and how the owning person relates to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub id: PersonId,
    pub kind: RelationshipKind,
}

/// Adjacency lists keyed by person id
///
/// Every stored edge `(a, b, kind)` appears twice: `a -> b` with `kind` and
/// `b -> a` with `kind.reverse()`. Lists keep edge-feed order, which makes
/// path search deterministic.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    adjacency: HashMap<PersonId, Vec<Neighbor>>,
    /// Keys in first-seen order
    order: Vec<PersonId>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for one tree from its people and relationship feeds
    pub fn build(people: &[Person], edges: &[Relationship]) -> Self {
        let mut graph = Self::new();

        for person in people {
            graph.ensure(person.id);
        }

        for edge in edges {
            for endpoint in [edge.person1_id, edge.person2_id] {
                if !graph.adjacency.contains_key(&endpoint) {
                    tracing::debug!(
                        "Relationship {} references person {} missing from member list",
                        edge.id,
                        endpoint
                    );
                }
            }
            graph.add_edge(edge.person1_id, edge.person2_id, edge.relationship_type.clone());
        }

        tracing::debug!(
            "Built relationship graph: {} people, {} directed entries",
            graph.person_count(),
            graph.edge_count()
        );

        graph
    }

    /// Build a graph from bare `(person1, person2, kind)` triples
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (PersonId, PersonId, RelationshipKind)>,
    {
        let mut graph = Self::new();
        for (from, to, kind) in edges {
            graph.add_edge(from, to, kind);
        }
        graph
    }

    /// Register a person without any edges
    pub fn add_person(&mut self, id: PersonId) {
        self.ensure(id);
    }

    /// Insert both directed entries for one stored edge
    pub fn add_edge(&mut self, from: PersonId, to: PersonId, kind: RelationshipKind) {
        let reverse = kind.reverse();
        self.ensure(from).push(Neighbor { id: to, kind });
        self.ensure(to).push(Neighbor {
            id: from,
            kind: reverse,
        });
    }

    fn ensure(&mut self, id: PersonId) -> &mut Vec<Neighbor> {
        let order = &mut self.order;
        self.adjacency.entry(id).or_insert_with(|| {
            order.push(id);
            Vec::new()
        })
    }

    /// Neighbors of a person, in insertion order; empty for unknown ids
    pub fn neighbors(&self, id: PersonId) -> &[Neighbor] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// All person ids, in first-seen order
    pub fn person_ids(&self) -> &[PersonId] {
        &self.order
    }

    pub fn person_count(&self) -> usize {
        self.order.len()
    }

    /// Number of directed adjacency entries (twice the stored edge count)
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// People recorded with `id` as their parent
    pub fn children_of(&self, id: PersonId) -> Vec<PersonId> {
        self.neighbors(id)
            .iter()
            .filter(|n| n.kind == RelationshipKind::Parent)
            .map(|n| n.id)
            .collect()
    }

    /// People with no recorded parent.
    ///
    /// When everybody has a parent (a cycle), the first person is used so an
    /// outline still has somewhere to start.
    pub fn roots(&self) -> Vec<PersonId> {
        let roots: Vec<PersonId> = self
            .order
            .iter()
            .copied()
            .filter(|id| {
                !self
                    .neighbors(*id)
                    .iter()
                    .any(|n| n.kind == RelationshipKind::Child)
            })
            .collect();

        if roots.is_empty() {
            self.order.first().copied().into_iter().collect()
        } else {
            roots
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::NewPerson;
    use crate::relation::RelationshipId;
    use crate::tree::TreeId;

    fn person(id: i64, name: &str) -> Person {
        Person::new(PersonId(id), TreeId(1), NewPerson::new(name))
    }

    fn edge(id: i64, a: i64, b: i64, kind: &str) -> Relationship {
        Relationship::new(RelationshipId(id), TreeId(1), PersonId(a), PersonId(b), kind)
    }

    #[test]
    fn test_every_edge_is_inserted_both_ways() {
        let people = vec![person(1, "Ada"), person(2, "Ben"), person(3, "Cal")];
        let edges = vec![
            edge(1, 1, 2, "parent"),
            edge(2, 2, 3, "sibling"),
            edge(3, 1, 3, "godparent"),
        ];
        let graph = RelationshipGraph::build(&people, &edges);

        for e in &edges {
            assert!(graph.neighbors(e.person1_id).contains(&Neighbor {
                id: e.person2_id,
                kind: e.relationship_type.clone(),
            }));
            assert!(graph.neighbors(e.person2_id).contains(&Neighbor {
                id: e.person1_id,
                kind: e.relationship_type.reverse(),
            }));
        }
        assert_eq!(graph.edge_count(), 6);
    }

    #[test]
    fn test_isolated_person_has_empty_entry() {
        let people = vec![person(1, "Ada"), person(2, "Ben")];
        let graph = RelationshipGraph::build(&people, &[]);

        assert!(graph.contains(PersonId(2)));
        assert!(graph.neighbors(PersonId(2)).is_empty());
        assert_eq!(graph.person_count(), 2);
    }

    #[test]
    fn test_edge_to_unknown_person_is_tolerated() {
        let people = vec![person(1, "Ada")];
        let edges = vec![edge(1, 1, 99, "spouse")];
        let graph = RelationshipGraph::build(&people, &edges);

        assert!(graph.contains(PersonId(99)));
        assert_eq!(
            graph.neighbors(PersonId(99)),
            &[Neighbor {
                id: PersonId(1),
                kind: RelationshipKind::Spouse
            }]
        );
    }

    #[test]
    fn test_adjacency_keeps_edge_order() {
        let graph = RelationshipGraph::from_edges(vec![
            (PersonId(1), PersonId(3), RelationshipKind::Sibling),
            (PersonId(1), PersonId(2), RelationshipKind::Spouse),
            (PersonId(4), PersonId(1), RelationshipKind::Parent),
        ]);

        let ids: Vec<PersonId> = graph.neighbors(PersonId(1)).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![PersonId(3), PersonId(2), PersonId(4)]);
        assert_eq!(graph.neighbors(PersonId(1))[2].kind, RelationshipKind::Child);
        assert_eq!(graph.person_ids(), &[PersonId(1), PersonId(3), PersonId(2), PersonId(4)]);
    }

    #[test]
    fn test_unknown_id_has_no_neighbors() {
        let graph = RelationshipGraph::new();
        assert!(graph.neighbors(PersonId(5)).is_empty());
        assert!(!graph.contains(PersonId(5)));
    }

    #[test]
    fn test_roots_and_children() {
        // Grandma -> Mum -> Kid, Mum married to Dad
        let people = vec![
            person(1, "Grandma"),
            person(2, "Mum"),
            person(3, "Dad"),
            person(4, "Kid"),
        ];
        let edges = vec![
            edge(1, 1, 2, "parent"),
            edge(2, 2, 3, "spouse"),
            edge(3, 2, 4, "parent"),
            edge(4, 4, 3, "child"),
        ];
        let graph = RelationshipGraph::build(&people, &edges);

        assert_eq!(graph.roots(), vec![PersonId(1), PersonId(3)]);
        assert_eq!(graph.children_of(PersonId(2)), vec![PersonId(4)]);
        assert_eq!(graph.children_of(PersonId(3)), vec![PersonId(4)]);
        assert!(graph.children_of(PersonId(4)).is_empty());
    }

    #[test]
    fn test_roots_fall_back_on_cycles() {
        let graph = RelationshipGraph::from_edges(vec![
            (PersonId(1), PersonId(2), RelationshipKind::Parent),
            (PersonId(2), PersonId(1), RelationshipKind::Parent),
        ]);
        assert_eq!(graph.roots(), vec![PersonId(1)]);
    }
}

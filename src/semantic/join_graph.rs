//! Per-request join graph.
//!
//! Nodes are the cubes a request touches; edges are declared joins between
//! them, weighted by the key dimension. Only direct declared joins count:
//! an untouched cube is never pulled in to bridge two touched ones.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use tracing::debug;

use crate::registry::SchemaRegistry;
use crate::semantic::error::{CompileError, CompileResult};

/// One INNER JOIN: `right` joins onto the already-joined `left` on `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinStep {
    pub left: String,
    pub right: String,
    /// Key dimension, declared on both cubes.
    pub key: String,
}

#[derive(Debug)]
pub struct JoinGraph {
    graph: UnGraph<String, String>,
    node_index: HashMap<String, NodeIndex>,
    /// Cubes in first-touch order.
    touched: Vec<String>,
}

impl JoinGraph {
    /// Build the graph over `touched` (first-touch order, no duplicates).
    pub fn build(registry: &SchemaRegistry, touched: &[String]) -> CompileResult<Self> {
        let mut graph = UnGraph::new_undirected();
        let mut node_index = HashMap::new();
        for name in touched {
            registry.lookup(name)?;
            let idx = graph.add_node(name.clone());
            node_index.insert(name.clone(), idx);
        }

        // Walk declarations in touch order so the winning key is stable when
        // both cubes declare the join.
        for name in touched {
            let cube = registry.lookup(name)?;
            for other in touched {
                let Some(join) = cube.joins.get(other) else {
                    continue;
                };
                if other == name {
                    continue;
                }
                let target = registry.lookup(other)?;
                if target.dimension(&join.key).is_none() {
                    return Err(CompileError::invalid_schema(
                        name,
                        format!("join key '{}' is not a dimension of '{}'", join.key, other),
                    ));
                }
                let (a, b) = (node_index[name], node_index[other]);
                if graph.find_edge(a, b).is_none() {
                    graph.add_edge(a, b, join.key.clone());
                }
            }
        }

        Ok(Self {
            graph,
            node_index,
            touched: touched.to_vec(),
        })
    }

    /// Order the joins: the first-touched cube is the root; each step joins
    /// the earliest-touched pending cube that has an edge to a joined cube,
    /// onto the earliest-joined such neighbour.
    pub fn join_order(&self) -> CompileResult<Vec<JoinStep>> {
        let Some(root) = self.touched.first() else {
            return Ok(Vec::new());
        };

        let mut joined: Vec<&String> = vec![root];
        let mut pending: Vec<&String> = self.touched.iter().skip(1).collect();
        let mut steps = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let next = pending.iter().enumerate().find_map(|(pos, candidate)| {
                joined.iter().find_map(|left| {
                    self.graph
                        .find_edge(self.node_index[*left], self.node_index[*candidate])
                        .map(|edge| (pos, (*left).clone(), self.graph[edge].clone()))
                })
            });

            let Some((pos, left, key)) = next else {
                return Err(CompileError::UnjoinableCubes {
                    from: root.clone(),
                    to: pending[0].clone(),
                });
            };

            let right = pending.remove(pos);
            debug!(left = %left, right = %right, key = %key, "join step");
            steps.push(JoinStep {
                left,
                right: right.clone(),
                key,
            });
            joined.push(right);
        }

        Ok(steps)
    }
}

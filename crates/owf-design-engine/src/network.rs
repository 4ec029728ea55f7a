//! ---
//! owf_section: "08-energy-models-optimization"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Collection and export design routines for offshore wind farms."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
//! Collection network: distance MST rooted at the CCP, per-edge flows and cable sizing.
//!
//! Nodes are addressed by arena index: `0` is the CCP and `1..=n` are the turbines in
//! input order. The tree is stored in a `petgraph` graph with edges pointing away from
//! the CCP, and flows are accumulated with an iterative post-order walk.

use nalgebra::distance;
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::DfsPostOrder,
    Direction,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cable::{select_cable_bundle, CableBundle},
    errors::Result,
    model::{CableType, Position, Turbine, TurbineId},
};

const CCP_NODE: usize = 0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum NodeRef {
    Ccp,
    Turbine(TurbineId),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionEdge {
    /// Endpoint on the far side from the CCP.
    pub from: NodeRef,
    /// CCP-ward endpoint; power flows `from -> to`.
    pub to: NodeRef,
    pub from_position: Position,
    pub to_position: Position,
    pub length: f64,
    pub flow: f64,
    pub bundle: CableBundle,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topology {
    pub ccp: Position,
    pub edges: Vec<ConnectionEdge>,
    pub total_cost: f64,
}

impl Topology {
    pub fn empty(ccp: Position) -> Self {
        Self {
            ccp,
            edges: Vec::new(),
            total_cost: 0.0,
        }
    }

    /// Edges with the CCP as their CCP-ward endpoint.
    pub fn ccp_edges(&self) -> impl Iterator<Item = &ConnectionEdge> {
        self.edges.iter().filter(|e| e.to == NodeRef::Ccp)
    }

    pub fn flow_into_ccp(&self) -> f64 {
        self.ccp_edges().map(|e| e.flow).sum()
    }

    pub fn total_length(&self) -> f64 {
        self.edges.iter().map(|e| e.length).sum()
    }
}

/// One Prim step: `child` joined the tree through `parent`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Attachment {
    child: usize,
    parent: usize,
    length: f64,
}

/// Frontier-based Prim's over the implicit complete graph, rooted at node 0.
///
/// Equal frontier distances resolve to the lowest node index, and a frontier entry is
/// only replaced by a strictly shorter link, so the earliest-attached neighbour is kept.
fn prim_attachments(nodes: &[Position]) -> Vec<Attachment> {
    let n = nodes.len();
    if n <= 1 {
        return Vec::new();
    }

    let mut in_tree = vec![false; n];
    let mut best_dist = vec![f64::INFINITY; n];
    let mut best_parent = vec![CCP_NODE; n];
    in_tree[CCP_NODE] = true;
    for j in 1..n {
        best_dist[j] = distance(&nodes[CCP_NODE], &nodes[j]);
    }

    let mut attachments = Vec::with_capacity(n - 1);
    for _ in 1..n {
        let mut next: Option<usize> = None;
        for j in 1..n {
            if in_tree[j] {
                continue;
            }
            match next {
                Some(k) if best_dist[j] >= best_dist[k] => {}
                _ => next = Some(j),
            }
        }
        let Some(k) = next else {
            break;
        };

        in_tree[k] = true;
        attachments.push(Attachment {
            child: k,
            parent: best_parent[k],
            length: best_dist[k],
        });

        for j in 1..n {
            if in_tree[j] {
                continue;
            }
            let d = distance(&nodes[k], &nodes[j]);
            if d < best_dist[j] {
                best_dist[j] = d;
                best_parent[j] = k;
            }
        }
    }
    attachments
}

/// Power carried out of every node's subtree, indexed by arena id.
fn subtree_power(node_power: &[f64], attachments: &[Attachment]) -> Vec<f64> {
    let mut tree: DiGraph<f64, ()> = DiGraph::with_capacity(node_power.len(), attachments.len());
    let indices: Vec<NodeIndex> = node_power.iter().map(|&p| tree.add_node(p)).collect();
    for attachment in attachments {
        tree.add_edge(indices[attachment.parent], indices[attachment.child], ());
    }

    let mut accumulated = vec![0.0; node_power.len()];
    let mut walk = DfsPostOrder::new(&tree, indices[CCP_NODE]);
    while let Some(node) = walk.next(&tree) {
        let children: f64 = tree
            .neighbors_directed(node, Direction::Outgoing)
            .map(|child| accumulated[child.index()])
            .sum();
        accumulated[node.index()] = tree[node] + children;
    }
    accumulated
}

/// Builds and prices the collection tree for a CCP at `ccp`.
///
/// Zero turbines yield an empty tree at zero cost.
pub fn build_connection_network(
    ccp: Position,
    turbines: &[Turbine],
    catalog: &[CableType],
) -> Result<Topology> {
    if turbines.is_empty() {
        return Ok(Topology::empty(ccp));
    }

    let nodes: Vec<Position> = std::iter::once(ccp)
        .chain(turbines.iter().map(|t| t.position))
        .collect();
    let node_power: Vec<f64> = std::iter::once(0.0)
        .chain(turbines.iter().map(|t| t.rated_power))
        .collect();
    let node_ref = |idx: usize| match idx {
        CCP_NODE => NodeRef::Ccp,
        other => NodeRef::Turbine(turbines[other - 1].id),
    };

    let attachments = prim_attachments(&nodes);
    let flows = subtree_power(&node_power, &attachments);

    let mut edges = Vec::with_capacity(attachments.len());
    let mut total_cost = 0.0;
    for attachment in &attachments {
        let flow = flows[attachment.child];
        let bundle = select_cable_bundle(flow, catalog)?;
        let cost = bundle.cost_for_length(attachment.length);
        total_cost += cost;
        edges.push(ConnectionEdge {
            from: node_ref(attachment.child),
            to: node_ref(attachment.parent),
            from_position: nodes[attachment.child],
            to_position: nodes[attachment.parent],
            length: attachment.length,
            flow,
            bundle,
            cost,
        });
    }

    debug!(
        edges = edges.len(),
        total_cost,
        ccp_x = ccp.x,
        ccp_y = ccp.y,
        "collection network priced"
    );

    Ok(Topology {
        ccp,
        edges,
        total_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CableFamily, WindFarm};

    fn catalog() -> Vec<CableType> {
        vec![CableType::new("mv1", CableFamily::Mv, 5.0, 10.0)]
    }

    #[test]
    fn single_turbine_yields_one_edge() {
        let farm = WindFarm::uniform([Position::new(300.0, 400.0)], 2.0);
        let topology =
            build_connection_network(Position::origin(), &farm.turbines, &catalog()).unwrap();

        assert_eq!(topology.edges.len(), 1);
        let edge = &topology.edges[0];
        assert_eq!(edge.from, NodeRef::Turbine(TurbineId(1)));
        assert_eq!(edge.to, NodeRef::Ccp);
        assert_eq!(edge.length, 500.0);
        assert_eq!(edge.flow, 2.0);
        assert_eq!(edge.bundle.count, 1);
        assert_eq!(topology.total_cost, 5000.0);
        assert_eq!(topology.total_cost, edge.cost);
    }

    #[test]
    fn zero_turbines_yield_empty_tree() {
        let topology = build_connection_network(Position::new(5.0, 5.0), &[], &catalog()).unwrap();
        assert!(topology.edges.is_empty());
        assert_eq!(topology.total_cost, 0.0);
        assert_eq!(topology.flow_into_ccp(), 0.0);
    }

    #[test]
    fn chain_accumulates_downstream_power() {
        let farm = WindFarm::uniform(
            [
                Position::new(1000.0, 0.0),
                Position::new(2000.0, 0.0),
                Position::new(3000.0, 0.0),
            ],
            2.0,
        );
        let topology =
            build_connection_network(Position::origin(), &farm.turbines, &catalog()).unwrap();

        let flows: Vec<f64> = topology.edges.iter().map(|e| e.flow).collect();
        assert_eq!(flows, vec![6.0, 4.0, 2.0]);
        let counts: Vec<u32> = topology.edges.iter().map(|e| e.bundle.count).collect();
        assert_eq!(counts, vec![2, 1, 1]);
        assert_eq!(topology.edges[1].to, NodeRef::Turbine(TurbineId(1)));
        // 1000 m at 20/m + 2 x 1000 m at 10/m
        assert_eq!(topology.total_cost, 40_000.0);
        assert_eq!(topology.total_length(), 3000.0);
    }

    #[test]
    fn flows_into_ccp_sum_to_total_power() {
        let farm = WindFarm::uniform(
            [
                Position::new(-800.0, 0.0),
                Position::new(-1600.0, 100.0),
                Position::new(900.0, 0.0),
                Position::new(0.0, 1200.0),
                Position::new(100.0, 2000.0),
            ],
            3.0,
        );
        let topology =
            build_connection_network(Position::origin(), &farm.turbines, &catalog()).unwrap();

        assert_eq!(topology.edges.len(), farm.len());
        assert_eq!(topology.flow_into_ccp(), farm.total_power());
        assert!(topology.ccp_edges().count() >= 3);
    }

    #[test]
    fn equal_distances_attach_lowest_index_first() {
        let farm = WindFarm::uniform(
            [Position::new(0.0, 1000.0), Position::new(1000.0, 0.0)],
            2.0,
        );
        let topology =
            build_connection_network(Position::origin(), &farm.turbines, &catalog()).unwrap();
        assert_eq!(topology.edges[0].from, NodeRef::Turbine(TurbineId(1)));
        assert_eq!(topology.edges[1].from, NodeRef::Turbine(TurbineId(2)));
        assert_eq!(topology.edges[1].to, NodeRef::Ccp);
    }
}

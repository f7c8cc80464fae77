use crate::program::{Program, ProgramId};
use petgraph::{self, Directed, Direction};
use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
};

type GraphIx = u32;
type Node = ProgramId;
type Edge = ();
/// The `Graph` is of *a -> b* where *b* imports *a*, so edges point forward in deployment order.
pub type Graph = petgraph::Graph<Node, Edge, Directed, GraphIx>;
pub type NodeIx = petgraph::graph::NodeIndex<GraphIx>;

/// Construct the dependency graph of the given programs, with one node per program and one edge
/// per resolved dependency.
///
/// Nodes are added in registration order regardless of the order of `programs`.
pub fn dependency_graph(programs: &[Program]) -> Graph {
    let mut by_id: Vec<&Program> = programs.iter().collect();
    by_id.sort_by_key(|p| p.id());

    let mut graph = Graph::with_capacity(by_id.len(), 0);
    let mut node_ixs = HashMap::with_capacity(by_id.len());
    for program in &by_id {
        node_ixs.insert(program.id(), graph.add_node(program.id()));
    }
    for program in &by_id {
        let dependent = node_ixs[&program.id()];
        for dep in program.dependencies().values() {
            if let Some(&dep_ix) = node_ixs.get(dep) {
                graph.add_edge(dep_ix, dependent, ());
            }
        }
    }
    graph
}

/// Sort the graph so that every node follows all nodes with edges into it.
///
/// Among the nodes that are ready at any point, the one with the lowest [ProgramId] is always
/// taken first, so the same graph always produces the same order and unrelated programs keep
/// their registration order.
///
/// Upon failure, returns every strongly connected component of the nodes left unsorted that is
/// an actual cycle. Each component is sorted by ID and components are ordered by their first ID.
pub fn deployment_order(graph: &Graph) -> Result<Vec<ProgramId>, Vec<Vec<ProgramId>>> {
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.edges_directed(n, Direction::Incoming).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<(ProgramId, NodeIx)>> = graph
        .node_indices()
        .filter(|n| in_degree[n.index()] == 0)
        .map(|n| Reverse((graph[n], n)))
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    let mut sorted = vec![false; graph.node_count()];
    while let Some(Reverse((id, node))) = ready.pop() {
        order.push(id);
        sorted[node.index()] = true;
        for next in graph.neighbors_directed(node, Direction::Outgoing) {
            in_degree[next.index()] -= 1;
            if in_degree[next.index()] == 0 {
                ready.push(Reverse((graph[next], next)));
            }
        }
    }

    if order.len() == graph.node_count() {
        return Ok(order);
    }

    tracing::debug!(
        "{} of {} programs could not be ordered",
        graph.node_count() - order.len(),
        graph.node_count()
    );
    Err(cycles(graph, &sorted))
}

/// Find the cycles among the nodes that are not yet `sorted`.
fn cycles(graph: &Graph, sorted: &[bool]) -> Vec<Vec<ProgramId>> {
    let residual: Graph = graph.filter_map(
        |n, id| (!sorted[n.index()]).then_some(*id),
        |_, edge| Some(*edge),
    );
    let mut cycles: Vec<Vec<ProgramId>> = petgraph::algo::tarjan_scc(&residual)
        .into_iter()
        .filter(|scc| scc.len() > 1 || residual.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut ids: Vec<ProgramId> = scc.into_iter().map(|n| residual[n]).collect();
            ids.sort();
            ids
        })
        .collect();
    cycles.sort();
    cycles
}

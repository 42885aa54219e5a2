//! Schema Dependency Cycles
//!
//! The dependency map (schema name -> names it references directly) is filled
//! by the schema pass while it walks component schemas. This pass runs last
//! and reports every distinct reference loop once.
//!
//! The map becomes a `DiGraphMap` whose node order is declaration order.
//! Strongly connected components narrow the search: a loop never leaves its
//! component, so the path-closing DFS only runs inside components with more
//! than one name (or a self edge).

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graphmap::DiGraphMap;

use crate::context::{AnalysisContext, DependencyMap};
use crate::diagnostics::{Issue, IssueCode};
use crate::document::{schema_pointer, OpenApiDocument};
use crate::rules::AnalysisPass;

/// A closed loop: first name repeated at the end (`[A, B, A]`)
pub type Cycle = Vec<String>;

/// Canonical key: the distinct names, sorted, comma-joined
pub fn cycle_key(cycle: &[String]) -> String {
    let names: BTreeSet<&str> = cycle.iter().map(String::as_str).collect();
    names.into_iter().collect::<Vec<_>>().join(",")
}

/// Reference graph over schema names
///
/// Declared schemas are added first so node order follows the document.
/// Dangling targets become nodes with no outgoing edges.
pub fn dependency_graph(deps: &DependencyMap) -> DiGraphMap<&str, ()> {
    let mut graph = DiGraphMap::new();
    for name in deps.keys() {
        graph.add_node(name.as_str());
    }
    for (from, targets) in deps {
        for to in targets {
            graph.add_edge(from.as_str(), to.as_str(), ());
        }
    }
    graph
}

/// Every elementary reference loop, each rotated to start at its
/// earliest-declared name
///
/// Within a component, each name in declaration order starts a DFS that only
/// steps onto later-declared names and closes a loop when it gets back to
/// the start. The set of loops found does not depend on declaration order.
pub fn find_cycles(deps: &DependencyMap) -> Vec<Cycle> {
    let graph = dependency_graph(deps);
    let rank: HashMap<&str, usize> = graph.nodes().enumerate().map(|(i, n)| (n, i)).collect();

    let mut components: Vec<Vec<&str>> = kosaraju_scc(&graph)
        .into_iter()
        .filter(|c| c.len() > 1 || graph.contains_edge(c[0], c[0]))
        .collect();
    for component in &mut components {
        component.sort_by_key(|n| rank[n]);
    }
    components.sort_by_key(|c| rank[c[0]]);

    let mut cycles = Vec::new();
    for component in &components {
        let members: HashSet<&str> = component.iter().copied().collect();
        for &start in component {
            let mut search = CycleSearch {
                graph: &graph,
                rank: &rank,
                members: &members,
                start,
                path: vec![start],
                on_path: HashSet::from([start]),
                cycles: &mut cycles,
            };
            search.extend(start);
        }
    }
    cycles
}

struct CycleSearch<'g, 'a> {
    graph: &'g DiGraphMap<&'a str, ()>,
    rank: &'g HashMap<&'a str, usize>,
    members: &'g HashSet<&'a str>,
    start: &'a str,
    path: Vec<&'a str>,
    on_path: HashSet<&'a str>,
    cycles: &'g mut Vec<Cycle>,
}

impl<'g, 'a> CycleSearch<'g, 'a> {
    fn extend(&mut self, node: &'a str) {
        let graph = self.graph;
        for next in graph.neighbors(node) {
            if next == self.start {
                let mut cycle: Cycle = self.path.iter().map(|n| n.to_string()).collect();
                cycle.push(next.to_string());
                self.cycles.push(cycle);
            } else if self.members.contains(next)
                && self.rank[next] > self.rank[self.start]
                && !self.on_path.contains(next)
            {
                self.path.push(next);
                self.on_path.insert(next);
                self.extend(next);
                self.on_path.remove(next);
                self.path.pop();
            }
        }
    }
}

/// Reports `CIRCULAR_DEPENDENCY` once per distinct cycle
///
/// Single-schema loops are left to `SELF_REFERENCING_SCHEMA`.
pub struct CyclePass;

impl AnalysisPass for CyclePass {
    fn name(&self) -> &'static str {
        "dependency-cycles"
    }

    fn run(&self, _doc: &OpenApiDocument, ctx: &mut AnalysisContext) {
        for cycle in find_cycles(ctx.dependencies()) {
            let key = cycle_key(&cycle);
            if !key.contains(',') || !ctx.claim_cycle(&key) {
                continue;
            }
            let head = &cycle[0];
            let pointer = schema_pointer(head);
            ctx.push(
                Issue::new(
                    IssueCode::CircularDependency,
                    format!("Circular dependency detected: {}", cycle.join(" -> ")),
                    pointer.clone(),
                )
                .with_component(head.as_str(), pointer, "schema"),
            );
        }
    }
}

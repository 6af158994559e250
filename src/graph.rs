//! Type dependency graph
//!
//! Each type definition depends on the types it references through its
//! options and fields. The graph gives the roots of a schema (types nobody
//! references), a locality-preserving topological order, and cycles.

use crate::core_type::is_builtin;
use crate::model::Schema;
use crate::options::{strip_derived, Options, TYPE_REF_OPTIONS};
use indexmap::IndexMap;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Type name to referenced type names, in declaration order
pub type Deps = IndexMap<String, Vec<String>>;

/// Build the dependency map of a schema
///
/// References keep their listed order and duplicates. Built-in core types
/// are skipped; derived prefixes (`#`, `>`) are stripped.
pub fn build_deps(schema: &Schema) -> Deps {
    schema
        .types()
        .iter()
        .map(|td| {
            let mut refs = option_refs(&td.options);
            if td.core_type.has_fields() {
                for field in &td.fields {
                    if !is_builtin(&field.type_ref) {
                        refs.push(field.type_ref.clone());
                    }
                    refs.extend(option_refs(&field.options));
                }
            }
            (td.name.clone(), refs)
        })
        .collect()
}

fn option_refs(options: &Options) -> Vec<String> {
    TYPE_REF_OPTIONS
        .iter()
        .filter_map(|name| options.get(*name).and_then(|v| v.as_str()))
        .map(strip_derived)
        .filter(|name| !is_builtin(name))
        .map(str::to_string)
        .collect()
}

/// Types not referenced by any other type, in declaration order
pub fn roots(deps: &Deps) -> Vec<String> {
    let referenced: HashSet<&str> = deps
        .iter()
        .flat_map(|(name, refs)| refs.iter().filter(move |r| *r != name))
        .map(String::as_str)
        .collect();
    deps.keys()
        .filter(|name| !referenced.contains(name.as_str()))
        .cloned()
        .collect()
}

/// Order types so every type is listed after the type that first references it
///
/// Walks depth first from each root in order. With no roots (every type is
/// part of a cycle) the declaration order is returned unchanged. Types not
/// reachable from any root are appended in declaration order.
pub fn topo_sort(deps: &Deps, roots: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out: Vec<String> = Vec::with_capacity(deps.len());

    for root in roots {
        walk(deps, root, &mut seen, &mut out);
    }
    if out.is_empty() {
        tracing::warn!("no root types, keeping declaration order");
        return deps.keys().cloned().collect();
    }
    for name in deps.keys() {
        if !seen.contains(name.as_str()) {
            tracing::debug!(%name, "appending type unreachable from roots");
            walk(deps, name, &mut seen, &mut out);
        }
    }
    out
}

fn walk<'a>(deps: &'a Deps, name: &'a str, seen: &mut HashSet<&'a str>, out: &mut Vec<String>) {
    // Iterative DFS, pushing children in reverse so they pop in listed order
    let mut stack = vec![name];
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        out.push(current.to_string());
        if let Some(refs) = deps.get(current) {
            stack.extend(refs.iter().rev().map(String::as_str));
        }
    }
}

/// Dependency cycles, each as the type names involved in declaration order
///
/// A cycle is a strongly connected component with more than one type, or a
/// type that references itself.
pub fn cycles(deps: &Deps) -> Vec<Vec<String>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let nodes: HashMap<&str, NodeIndex> = deps
        .keys()
        .map(|name| (name.as_str(), graph.add_node(name.as_str())))
        .collect();
    for (name, refs) in deps {
        for target in refs {
            if let Some(&to) = nodes.get(target.as_str()) {
                graph.update_edge(nodes[name.as_str()], to, ());
            }
        }
    }

    let position: HashMap<&str, usize> = deps.keys().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
    let mut found: Vec<Vec<String>> = kosaraju_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut names: Vec<&str> = scc.iter().map(|ix| graph[*ix]).collect();
            names.sort_by_key(|n| position[n]);
            names.into_iter().map(str::to_string).collect()
        })
        .collect();
    found.sort_by_key(|c: &Vec<String>| position[c[0].as_str()]);
    found
}

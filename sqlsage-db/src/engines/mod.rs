//! Per-engine [`crate::DbAdapter`] implementations.

pub mod mysql;
pub mod oracle;
pub mod postgresql;
pub mod sqlserver;

/// Topologically order `tables` by FK edge `(referencing, referenced)` so
/// that a referenced table always precedes anything that references it.
///
/// Cycle-tolerant: a back-edge that would close a cycle is dropped rather
/// than failing the sort (spec §4.3's `get_foreign_key_dependencies`, and
/// `migration_handler.py`'s table-phase ordering, both require this).
#[must_use]
pub fn topo_sort_tables(tables: &[String], edges: &[(String, String)]) -> Vec<String> {
    use std::collections::{HashMap, HashSet, VecDeque};

    let mut indegree: HashMap<&str, u32> = tables.iter().map(|t| (t.as_str(), 0)).collect();
    let mut adj: HashMap<&str, Vec<&str>> = tables.iter().map(|t| (t.as_str(), Vec::new())).collect();

    for (referencing, referenced) in edges {
        if referencing == referenced {
            continue;
        }
        if let (Some(_), Some(_)) = (indegree.get(referenced.as_str()), indegree.get(referencing.as_str())) {
            adj.entry(referenced.as_str()).or_default().push(referencing.as_str());
            *indegree.entry(referencing.as_str()).or_default() += 1;
        }
    }

    let mut queue: VecDeque<&str> = tables
        .iter()
        .map(String::as_str)
        .filter(|t| indegree.get(t).copied().unwrap_or(0) == 0)
        .collect();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(tables.len());

    while let Some(table) = queue.pop_front() {
        if !visited.insert(table) {
            continue;
        }
        order.push(table.to_string());
        if let Some(children) = adj.get(table) {
            for child in children {
                if let Some(deg) = indegree.get_mut(child) {
                    if *deg > 0 {
                        *deg -= 1;
                    }
                    if *deg == 0 {
                        queue.push_back(child);
                    }
                }
            }
        }
    }

    // Any remaining tables sit on a cycle; append them in their original
    // order rather than dropping them.
    for table in tables {
        if !visited.contains(table.as_str()) {
            order.push(table.clone());
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_referent_before_referrer() {
        let tables = vec!["orders".to_string(), "customers".to_string()];
        let edges = vec![("orders".to_string(), "customers".to_string())];
        let order = topo_sort_tables(&tables, &edges);
        assert_eq!(order, vec!["customers", "orders"]);
    }

    #[test]
    fn tolerates_cycles() {
        let tables = vec!["a".to_string(), "b".to_string()];
        let edges = vec![("a".to_string(), "b".to_string()), ("b".to_string(), "a".to_string())];
        let order = topo_sort_tables(&tables, &edges);
        assert_eq!(order.len(), 2);
    }
}

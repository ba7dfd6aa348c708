//! Table ordering for the migration planner (spec §4.9 phase 2, §9 "Cyclic
//! structure in FK graph").
//!
//! The cycle-tolerant topological sort itself lives in `sqlsage-db`
//! (`engines::topo_sort_tables`, shared with `get_foreign_key_dependencies`)
//! so the planner's phase-2 ordering and the adapter's own `table_order`
//! field are computed by the same algorithm. This module just re-exports it
//! under the planner's vocabulary.

/// Order `tables` by FK dependency: every referenced table precedes every
/// table that references it. Tables with no incoming or outgoing edges keep
/// their position in `tables`' own order relative to other zero-indegree
/// tables — they are not specially appended, matching spec §8's worked
/// example (`a, c, b` for `b -> a`, `c` unconnected).
///
/// Cycles are tolerated: a back-edge is dropped rather than causing a panic
/// (spec §9).
#[must_use]
pub fn order_tables_for_migration(tables: &[String], edges: &[(String, String)]) -> Vec<String> {
    sqlsage_db::engines::topo_sort_tables(tables, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_spec_worked_example_ordering() {
        // b references a; c has no FK at all.
        let tables = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let edges = vec![("b".to_string(), "a".to_string())];
        let order = order_tables_for_migration(&tables, &edges);
        assert_eq!(order, vec!["a".to_string(), "c".to_string(), "b".to_string()]);
    }

    #[test]
    fn tolerates_cycles() {
        let tables = vec!["a".to_string(), "b".to_string()];
        let edges = vec![
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "a".to_string()),
        ];
        let order = order_tables_for_migration(&tables, &edges);
        assert_eq!(order.len(), 2);
    }
}

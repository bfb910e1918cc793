use crate::core::errors::TopologyError;
use std::collections::BTreeSet;

/// Computes the dataflow execution order of sibling parts
pub struct ExecutionOrderBuilder;

impl ExecutionOrderBuilder {
    /// Topologically sort `count` siblings given wires between them as
    /// `(source, target)` positions in declaration order.
    ///
    /// Uses Kahn's algorithm. Among ready siblings the one declared first
    /// runs first, so the result is deterministic. Self-loops do not
    /// constrain the order since a part only sees its own outputs on the
    /// next step. Returns the positions of the siblings caught in a cycle
    /// when no order exists.
    pub fn build_execution_order(
        count: usize,
        edges: &[(usize, usize)],
    ) -> Result<Vec<usize>, Vec<usize>> {
        let mut adj_list: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut in_degree = vec![0usize; count];

        for &(source, target) in edges {
            if source == target || adj_list[source].contains(&target) {
                continue;
            }
            adj_list[source].push(target);
            in_degree[target] += 1;
        }

        let mut ready: BTreeSet<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(count);

        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &neighbor in &adj_list[next] {
                in_degree[neighbor] -= 1;
                if in_degree[neighbor] == 0 {
                    ready.insert(neighbor);
                }
            }
        }

        if order.len() < count {
            let stuck = (0..count).filter(|&i| in_degree[i] > 0).collect();
            return Err(stuck);
        }
        Ok(order)
    }

    /// Same as [`build_execution_order`](Self::build_execution_order) with
    /// names, reporting a cycle as a topology error against `parent`
    pub fn order_children(
        parent: &str,
        names: &[&str],
        edges: &[(usize, usize)],
    ) -> Result<Vec<usize>, TopologyError> {
        Self::build_execution_order(names.len(), edges).map_err(|stuck| {
            let members: Vec<&str> = stuck.iter().map(|&i| names[i]).collect();
            TopologyError::CombinationalCycle {
                path: format!("{} [{}]", parent, members.join(", ")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_execution_order_simple() {
        // A -> B -> C declared in reverse
        let order = ExecutionOrderBuilder::build_execution_order(3, &[(2, 1), (1, 0)])
            .expect("Should build execution order");
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn test_build_execution_order_diamond() {
        // A -> B, A -> C, B -> D, C -> D
        let order =
            ExecutionOrderBuilder::build_execution_order(4, &[(0, 1), (0, 2), (1, 3), (2, 3)])
                .expect("Should build execution order");
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_ties_follow_declaration_order() {
        let order = ExecutionOrderBuilder::build_execution_order(4, &[(3, 0)])
            .expect("Should build execution order");
        assert_eq!(order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_self_loop_is_ignored() {
        let order = ExecutionOrderBuilder::build_execution_order(2, &[(1, 1), (1, 0)])
            .expect("Should build execution order");
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_cycle_detection() {
        // A -> B -> A, C free
        let stuck = ExecutionOrderBuilder::build_execution_order(3, &[(0, 1), (1, 0)])
            .unwrap_err();
        assert_eq!(stuck, vec![0, 1]);

        let err = ExecutionOrderBuilder::order_children("top", &["a", "b", "c"], &[(0, 1), (1, 0)])
            .unwrap_err();
        assert_eq!(
            err,
            TopologyError::CombinationalCycle {
                path: "top [a, b]".to_string()
            }
        );
    }
}

use std::collections::{HashMap, HashSet};

use crate::error::GraphError;

use super::TaskId;

/// Static cycle check for a bulk-import batch of tasks and proposed
/// parent → child relations.
///
/// Runs a depth-first traversal from every task and fails the moment a task
/// reappears on the current path. Relations referencing tasks outside the
/// batch are ignored, so partial imports are allowed. Diamond shapes (two
/// paths converging on the same task) pass.
pub fn find_cyclic_dependency(
    tasks: &[TaskId],
    relations: &[(TaskId, TaskId)],
) -> Result<(), GraphError> {
    let known: HashSet<&str> = tasks.iter().map(String::as_str).collect();

    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for (parent, child) in relations {
        if known.contains(parent.as_str()) && known.contains(child.as_str()) {
            children
                .entry(parent.as_str())
                .or_default()
                .push(child.as_str());
        }
    }

    let mut done: HashSet<&str> = HashSet::new();
    for task in tasks {
        let mut path: Vec<&str> = Vec::new();
        visit(task.as_str(), &children, &mut done, &mut path)?;
    }
    Ok(())
}

fn visit<'a>(
    node: &'a str,
    children: &HashMap<&'a str, Vec<&'a str>>,
    done: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Result<(), GraphError> {
    if path.contains(&node) {
        let mut cycle: Vec<TaskId> = path.iter().map(|n| n.to_string()).collect();
        cycle.push(node.to_string());
        return Err(GraphError::CyclicDependency { path: cycle });
    }
    if done.contains(node) {
        return Ok(());
    }
    path.push(node);
    if let Some(next) = children.get(node) {
        for child in next {
            visit(child, children, done, path)?;
        }
    }
    path.pop();
    done.insert(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ids: &[&str]) -> Vec<TaskId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn rels(pairs: &[(&str, &str)]) -> Vec<(TaskId, TaskId)> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn chain_is_acyclic() {
        let tasks = batch(&["task1", "task2", "task3"]);
        let relations = rels(&[("task1", "task2"), ("task2", "task3")]);
        assert!(find_cyclic_dependency(&tasks, &relations).is_ok());
    }

    #[test]
    fn diamond_is_acyclic() {
        // task4 reachable from task2 via two disjoint paths.
        let tasks = batch(&["task1", "task2", "task3", "task4", "task5"]);
        let relations = rels(&[
            ("task1", "task2"),
            ("task2", "task3"),
            ("task2", "task5"),
            ("task3", "task4"),
            ("task5", "task4"),
        ]);
        assert!(find_cyclic_dependency(&tasks, &relations).is_ok());
    }

    #[test]
    fn two_task_cycle_is_reported() {
        let tasks = batch(&["task1", "task2"]);
        let relations = rels(&[("task1", "task2"), ("task2", "task1")]);
        let err = find_cyclic_dependency(&tasks, &relations).unwrap_err();
        assert!(matches!(err, GraphError::CyclicDependency { .. }));
    }

    #[test]
    fn longer_cycle_is_reported_with_its_path() {
        let tasks = batch(&["task1", "task2", "task3"]);
        let relations = rels(&[("task1", "task2"), ("task2", "task3"), ("task3", "task1")]);
        match find_cyclic_dependency(&tasks, &relations) {
            Err(GraphError::CyclicDependency { path }) => {
                assert_eq!(path.first(), path.last());
                assert!(path.len() >= 4);
            }
            other => panic!("expected cycle, got {:?}", other.err()),
        }
    }

    #[test]
    fn relations_outside_the_batch_are_ignored() {
        let tasks = batch(&["task1", "task2"]);
        // task9 is not part of the batch; both relations must be skipped.
        let relations = rels(&[("task1", "task9"), ("task9", "task1"), ("task1", "task2")]);
        assert!(find_cyclic_dependency(&tasks, &relations).is_ok());
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let tasks = batch(&["task1"]);
        let relations = rels(&[("task1", "task1")]);
        assert!(find_cyclic_dependency(&tasks, &relations).is_err());
    }
}

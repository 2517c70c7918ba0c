//! Priority-ordered buffer of tasks awaiting a worker.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::task::Task;

/// Heap entry: ordered by priority, then by insertion sequence so equal
/// priorities pop first-in first-out.
#[derive(Debug)]
struct Entry {
    priority: i32,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on priority; among equals the lower sequence wins.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending tasks, highest priority first.
///
/// Not synchronized; the orchestrator guards it with its queue lock.
#[derive(Debug, Default)]
pub struct DispatchQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            priority: task.priority,
            seq,
            task,
        });
    }

    /// Remove the highest-priority task. `None` means no work is available.
    pub fn pop(&mut self) -> Option<Task> {
        self.heap.pop().map(|entry| entry.task)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.heap.iter().any(|entry| entry.task.id == task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Operator;

    fn task(id: &str, operation: Operator) -> Task {
        Task {
            id: id.to_string(),
            arg1: 1.0,
            arg2: 2.0,
            operation,
            operation_time: 0,
            priority: operation.priority(),
        }
    }

    #[test]
    fn empty_queue_pops_none() {
        let mut queue = DispatchQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn higher_priority_pops_first() {
        let mut queue = DispatchQueue::new();
        queue.push(task("a", Operator::Add));
        queue.push(task("m", Operator::Multiply));
        queue.push(task("s", Operator::Subtract));
        queue.push(task("d", Operator::Divide));

        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|t| t.id).collect();
        assert_eq!(order, ["m", "d", "a", "s"]);
    }

    #[test]
    fn equal_priorities_are_fifo() {
        let mut queue = DispatchQueue::new();
        for i in 0..50 {
            queue.push(task(&format!("t{i}"), Operator::Add));
        }
        assert_eq!(queue.len(), 50);

        for i in 0..50 {
            assert_eq!(queue.pop().unwrap().id, format!("t{i}"));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn contains_reports_pending_ids() {
        let mut queue = DispatchQueue::new();
        queue.push(task("x", Operator::Add));
        assert!(queue.contains("x"));
        queue.pop();
        assert!(!queue.contains("x"));
    }
}

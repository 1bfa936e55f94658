//! Automatic depth: how much of each directory to print.
//!
//! Every directory child costs two slots (its line plus a possible summary
//! line), every file child one. The root gets an initial budget from its own
//! cost; each level below spends the budget its parent handed down, and a
//! directory that does not fit is collapsed into a single summary line.

use super::node::Node;

/// Remaining print budget carried down the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// No automatic limit.
    Unlimited,
    /// Automatic mode, not yet computed (the root).
    Pending,
    /// Slots left for the current branch.
    Remaining(u64),
}

/// Slot cost of a directory's direct children.
pub fn slot_cost(node: &Node) -> u64 {
    node.children()
        .iter()
        .map(|child| if child.is_dir() { 2 } else { 1 })
        .sum()
}

/// Budget for the level below the first directory, from its own cost.
pub fn initial_budget(slots: u64) -> u64 {
    match slots {
        // Half a terminal: show roughly a screenful in total.
        n if n < 12 => 24 - n,
        n if n < 24 => 12,
        n if n < 50 => 18,
        n if n < 100 => 24,
        n if n < 200 => 48,
        n if n < 300 => 72,
        n if n < 400 => 96,
        n => (n / 400) * 96,
    }
}

/// Largest per-directory cost that keeps the next level within `budget`.
///
/// Child directories are bucketed by their own slot cost; buckets are
/// accumulated cheapest first and the last bucket that still fits wins.
/// When `join` is set, single-child chains are followed to the directory
/// that will actually be printed.
pub fn next_level_cutoff(node: &Node, budget: u64, join: bool) -> u64 {
    let Ok(len) = usize::try_from(budget.saturating_add(1)) else {
        return budget;
    };
    let mut used = vec![0u64; len];

    for child in node.children() {
        let Some(shown) = printed_dir(child, join) else {
            continue;
        };
        let cost = slot_cost(shown);
        if let Some(bucket) = usize::try_from(cost).ok().and_then(|i| used.get_mut(i)) {
            *bucket += cost;
        }
    }

    let mut total = 0u64;
    for (index, spent) in used.iter().enumerate() {
        total += spent;
        if total > budget {
            return (index as u64).saturating_sub(1).max(1);
        }
    }
    budget.max(1)
}

/// The directory whose children decide the cost of `child`, if any.
fn printed_dir(child: &Node, join: bool) -> Option<&Node> {
    let mut current = child;
    if join {
        while current.children().len() <= 1 {
            current = current.children().first()?;
        }
    } else if current.children().len() <= 1 {
        return None;
    }
    current.is_dir().then_some(current)
}

/// The budget for the children of `node`, or `None` when `node` should be
/// collapsed into a summary line.
pub fn descend(node: &Node, budget: Budget, join: bool) -> Option<Budget> {
    match budget {
        Budget::Unlimited => Some(Budget::Unlimited),
        Budget::Pending => {
            let first = initial_budget(slot_cost(node));
            Some(Budget::Remaining(next_level_cutoff(node, first, join)))
        }
        Budget::Remaining(left) => {
            let cost = slot_cost(node);
            if cost > left {
                None
            } else if cost == left {
                Some(Budget::Remaining(1))
            } else {
                Some(Budget::Remaining(left - cost))
            }
        }
    }
}

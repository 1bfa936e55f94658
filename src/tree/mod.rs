//! Directory tree building
//!
//! This module builds the in-memory tree that every output format renders:
//!
//! - `node` - the `Node` model
//! - `visitor` - bounded-parallel traversal, filtering and counts (`Tree::build`)
//! - `filter` - hidden/backup names and include/exclude patterns
//! - `pool` - worker pool and weighted admission
//! - `sort` - lazy per-directory ordering
//! - `size` - memoized aggregate sizes and recursive entry counts
//! - `plan` - automatic depth budgets

mod filter;
mod node;
mod plan;
mod pool;
mod size;
mod sort;
mod visitor;

pub use filter::NameFilter;
pub use node::Node;
pub use plan::{Budget, descend, initial_budget, next_level_cutoff, slot_cost};
pub use pool::{Admission, CAPACITY, Permit, TASK_WEIGHT, WORKER_STACK_SIZE, WorkerPool};
pub use size::{SizeTotal, descendant_count};
pub use sort::{Comparator, SortKind, version_cmp};
pub use visitor::{Counts, Followed, Tree, VisitedPaths, Visitor};

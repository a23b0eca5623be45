// Modules hold the concrete system implementations; the contracts they
// fulfil live in `traits`.

pub mod traits;    // Global contracts
pub mod matcher;   // Archive discovery (read-only walk)
pub mod retention; // Pure keep-N selection policy
pub mod remover;   // Bottom-up subtree deletion
pub mod pruner;    // Empty-ancestor ascent
pub mod rsync;     // External sync invocation
pub mod lastrun;   // Last-run timestamp bookkeeping

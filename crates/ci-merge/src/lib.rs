//! Idempotent YAML merge engine for Lando project files
//!
//! Loads a `.lando.yml`, appends lifecycle hooks without duplicating
//! entries already present in any surface form, overwrites packaged tooling
//! commands, and writes the result back behind a backup/restore guard.
//!
//! ```no_run
//! use ci_merge::{CommandDefinition, Entry, MergePlan, SafeWrite, TransactionConfig};
//!
//! let plan = MergePlan::new()
//!     .post_start([Entry::service("appserver", "drush cr")])
//!     .tooling("rebuild", CommandDefinition::single("appserver", "Rebuild caches", "drush cr"));
//!
//! let mut tx = SafeWrite::new(".lando.yml", TransactionConfig::default());
//! let report = tx.run(&plan)?;
//! println!("{} hooks added", report.stats.hooks_added());
//! # Ok::<(), ci_merge::Error>(())
//! ```

pub mod document;
pub mod error;
pub mod normalize;
pub mod plan;
pub mod policy;
pub mod signature;
pub mod transaction;

pub use document::ConfigDocument;
pub use error::{Error, Result};
pub use plan::{CommandBody, CommandDefinition, Entry, MergePlan};
pub use policy::{ListMerge, MergeStats, merge_list, merge_map};
pub use signature::{Signature, signature};
pub use transaction::{
    AtomicWriter, DocumentWriter, MergeReport, Preview, SafeWrite, TransactionConfig,
    TransactionState,
};

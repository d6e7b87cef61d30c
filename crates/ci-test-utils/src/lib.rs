//! Shared test utilities for the ci-tools workspace.
//!
//! Dev-dependency only, never published.
//!
//! - [`project`]: [`TestProject`](project::TestProject) builder for a
//!   throwaway Drupal project plus a copy of the packaged `files/` tree

pub mod project;

//! Warren Cloud resource reconciliation
//!
//! This crate provides the provider abstraction used to reconcile declared
//! resources against the Warren platform. It has no I/O of its own: the
//! orchestrator owns the dependency graph and state persistence, providers
//! implement the per-resource CRUD mapping.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              Orchestrator (host)                 │
//! │         plan / apply / state storage             │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 warren-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │   trait ResourceProvider / Reconciler     │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  Drift plan  │  │ Error kinds  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼─────────┐
//! │ warren-provider │  transport, classifier, reconcilers
//! └─────────────────┘
//! ```

pub mod error;
pub mod plan;
pub mod provider;
pub mod state;

// Re-exports
pub use error::{CloudError, ErrorKind, Result};
pub use plan::{ActionType, AttributeChange, Plan, PlanSummary, Schema};
pub use provider::{AuthStatus, ReadOutcome, Reconciler, ResourceKind, ResourceProvider};
pub use state::ResourceState;

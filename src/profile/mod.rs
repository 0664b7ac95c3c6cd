//! Core profile engine.
//!
//! Turns a raw V8 CPU profile into a [`Profile`]: a tree of [`Node`]s with
//! native frames folded away, per-sample timestamps, bottom-up totals and
//! a classification of every frame into a [`Category`].

pub mod category;
pub mod node;
pub mod options;
#[allow(clippy::module_inception)]
pub mod profile;
mod samples;
mod tree;

pub use category::Category;
pub use node::{CallSiteUid, Location, Node, NodeIndex};
pub use options::ProfileOptions;
pub use profile::{Descendants, Profile};

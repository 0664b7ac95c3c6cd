//! Call tree nodes and their identity keys.

use super::category::Category;
use crate::parser::schema::{CallFrame, PositionTickInfo};
use serde::Serialize;
use std::fmt;

/// Position of a node in the profile's node arena
pub type NodeIndex = usize;

/// Identity of a call site: the same function at the same source position.
///
/// Recursive or repeated invocations of one function share a uid, which is
/// what function views group by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CallSiteUid {
    pub function_name: String,
    pub script_id: String,
    pub line: i64,
    pub column: i64,
}

impl CallSiteUid {
    pub fn from_call_frame(frame: &CallFrame) -> Self {
        Self {
            function_name: frame.function_name.clone(),
            script_id: frame.script_id.clone(),
            line: frame.line_number,
            column: frame.column_number,
        }
    }
}

impl fmt::Display for CallSiteUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.function_name.is_empty() {
            "(anonymous)"
        } else {
            &self.function_name
        };
        write!(f, "{}:{}:{}:{}", name, self.script_id, self.line, self.column)
    }
}

/// Source location of a node (0-based line and column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub url: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    /// Set when the frame carries no url, line or column at all
    pub inlined: bool,
}

impl Location {
    pub fn from_call_frame(frame: &CallFrame) -> Self {
        let line = u32::try_from(frame.line_number).ok();
        let column = u32::try_from(frame.column_number).ok();
        Self {
            inlined: frame.url.is_empty() && line.is_none() && column.is_none(),
            url: frame.url.clone(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inlined {
            return f.write_str("(inlined)");
        }
        f.write_str(&self.url)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line + 1)?;
            if let Some(column) = self.column {
                write!(f, ":{}", column + 1)?;
            }
        }
        Ok(())
    }
}

/// One frame of the reconstructed call tree.
///
/// Nodes live in the owning [`Profile`](super::Profile)'s arena; `parent`
/// and `children` are arena indices. Counts and timestamps are final once
/// the profile is built.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: u64,
    pub(crate) index: NodeIndex,
    pub(crate) call_uid: CallSiteUid,
    pub(crate) location: Location,
    pub(crate) bailout_reason: Option<String>,
    pub(crate) category: Category,
    pub(crate) self_count: u64,
    pub(crate) total_count: u64,
    pub(crate) timestamps: Vec<f64>,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) children: Vec<NodeIndex>,
    pub(crate) line_ticks: Vec<PositionTickInfo>,
    /// Pre-order interval: descendants have `enter` inside `(enter, exit]`
    pub(crate) enter: usize,
    pub(crate) exit: usize,
}

impl Node {
    /// Id from the raw profile
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn call_uid(&self) -> &CallSiteUid {
        &self.call_uid
    }

    pub fn function_name(&self) -> &str {
        &self.call_uid.function_name
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn url(&self) -> &str {
        &self.location.url
    }

    /// Why V8 could not optimize this frame, if it said
    pub fn bailout_reason(&self) -> Option<&str> {
        self.bailout_reason.as_deref()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Samples with this node on top of the stack
    pub fn self_count(&self) -> u64 {
        self.self_count
    }

    /// Self count plus the total count of every child
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Sample times for this node, ascending
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn line_ticks(&self) -> &[PositionTickInfo] {
        &self.line_ticks
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// True if `other` is a strict descendant of this node
    pub fn is_ancestor_of(&self, other: &Node) -> bool {
        self.enter < other.enter && other.enter <= self.exit
    }
}

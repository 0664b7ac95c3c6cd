//! Code categories and the rules that classify profile nodes into them.
//!
//! Categories form a small fixed tree:
//!
//! ```text
//! system ── gc, program, idle, native, node
//! profiler
//! compiler ── parser, binder, checker, emitter
//! user
//! ```

use crate::utils::config::{
    COMPILER_URL_PATTERN, GC_FUNCTION_NAME, IDLE_FUNCTION_NAME, NATIVE_URL_PATTERN,
    PROFILER_URL_PATTERN, PROGRAM_FUNCTION_NAME, RUNTIME_URL_PATTERN,
};
use crate::utils::error::ProfileError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// A classification tag for a profile node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "&'static str")]
pub enum Category {
    System,
    GarbageCollector,
    Program,
    Idle,
    Native,
    Runtime,
    Profiler,
    Compiler,
    Parser,
    Binder,
    Checker,
    Emitter,
    User,
}

/// Parent of each category, indexed by discriminant
const PARENTS: [Option<Category>; Category::COUNT] = [
    None,                     // System
    Some(Category::System),   // GarbageCollector
    Some(Category::System),   // Program
    Some(Category::System),   // Idle
    Some(Category::System),   // Native
    Some(Category::System),   // Runtime
    None,                     // Profiler
    None,                     // Compiler
    Some(Category::Compiler), // Parser
    Some(Category::Compiler), // Binder
    Some(Category::Compiler), // Checker
    Some(Category::Compiler), // Emitter
    None,                     // User
];

const NAMES: [&str; Category::COUNT] = [
    "system", "gc", "program", "idle", "native", "node", "profiler", "compiler", "parser",
    "binder", "checker", "emitter", "user",
];

impl Category {
    pub const COUNT: usize = 13;

    /// Every category, parents before their children
    pub const ALL: [Category; Category::COUNT] = [
        Category::System,
        Category::GarbageCollector,
        Category::Program,
        Category::Idle,
        Category::Native,
        Category::Runtime,
        Category::Profiler,
        Category::Compiler,
        Category::Parser,
        Category::Binder,
        Category::Checker,
        Category::Emitter,
        Category::User,
    ];

    pub fn name(self) -> &'static str {
        NAMES[self as usize]
    }

    pub fn parent(self) -> Option<Category> {
        PARENTS[self as usize]
    }

    /// Direct children in the category tree
    pub fn children(self) -> impl Iterator<Item = Category> {
        Self::ALL
            .into_iter()
            .filter(move |c| c.parent() == Some(self))
    }

    /// Strict ancestors, nearest first
    pub fn ancestors(self) -> impl Iterator<Item = Category> {
        std::iter::successors(self.parent(), |c| c.parent())
    }

    /// Returns true if `self` is `other` or one of `other`'s descendants.
    ///
    /// `Category::Parser.is_category(Category::Compiler)` is true; the
    /// reverse is not.
    pub fn is_category(self, other: Category) -> bool {
        self == other || self.ancestors().any(|a| a == other)
    }

    /// Look up a category by its display name (`"gc"`, `"parser"`, ...)
    pub fn from_name(name: &str) -> Option<Category> {
        let name = name.trim().to_ascii_lowercase();
        if name == "runtime" {
            return Some(Category::Runtime);
        }
        NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| Self::ALL[i])
    }

    /// Collapse a set of categories to its most specific members.
    ///
    /// Ancestors of other members are dropped, duplicates are dropped, and
    /// first-seen order is otherwise kept. No two results satisfy
    /// `a.is_category(b)`.
    pub fn reduce<I>(categories: I) -> Vec<Category>
    where
        I: IntoIterator<Item = Category>,
    {
        let mut reduced: Vec<Category> = Vec::new();
        for candidate in categories {
            if reduced.iter().any(|kept| kept.is_category(candidate)) {
                continue;
            }
            reduced.retain(|kept| !candidate.is_category(*kept));
            reduced.push(candidate);
        }
        reduced
    }

    /// Classify a frame by its script URL and function name
    pub fn classify(url: &str, function_name: &str) -> Category {
        CLASSIFIER.classify(url, function_name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Category> for &'static str {
    fn from(category: Category) -> Self {
        category.name()
    }
}

impl FromStr for Category {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_name(s).ok_or_else(|| ProfileError::UnknownCategory(s.to_string()))
    }
}

static CLASSIFIER: LazyLock<Classifier> = LazyLock::new(Classifier::new);

/// Compiled URL rules, applied in a fixed order
struct Classifier {
    native: Regex,
    profiler: Regex,
    runtime: Regex,
    compiler: Regex,
}

impl Classifier {
    fn new() -> Self {
        Self {
            native: Regex::new(NATIVE_URL_PATTERN).expect("native url pattern is valid"),
            profiler: Regex::new(PROFILER_URL_PATTERN).expect("profiler url pattern is valid"),
            runtime: Regex::new(RUNTIME_URL_PATTERN).expect("runtime url pattern is valid"),
            compiler: Regex::new(COMPILER_URL_PATTERN).expect("compiler url pattern is valid"),
        }
    }

    fn classify(&self, url: &str, function_name: &str) -> Category {
        if url.is_empty() {
            return match function_name {
                GC_FUNCTION_NAME => Category::GarbageCollector,
                PROGRAM_FUNCTION_NAME => Category::Program,
                IDLE_FUNCTION_NAME => Category::Idle,
                _ => Category::System,
            };
        }

        if self.native.is_match(url) {
            return Category::Native;
        }
        if self.profiler.is_match(url) {
            return Category::Profiler;
        }
        if self.runtime.is_match(url) {
            return Category::Runtime;
        }
        if let Some(caps) = self.compiler.captures(url) {
            let rest = caps.name("rest").map_or("", |m| m.as_str());
            return compiler_phase(rest);
        }

        Category::User
    }
}

/// Pick the compiler phase from the path below the compiler source root
fn compiler_phase(rest: &str) -> Category {
    let segment = rest.split(['/', '\\']).next().unwrap_or("");
    let stem = segment.split('.').next().unwrap_or(segment);

    match stem {
        "parser" | "scanner" => Category::Parser,
        "binder" => Category::Binder,
        "checker" => Category::Checker,
        "emitter" | "transformer" | "transformers" => Category::Emitter,
        _ => Category::Compiler,
    }
}

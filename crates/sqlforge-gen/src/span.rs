//! Byte spans of AST nodes in the query text.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

/// A byte span in the original input. Negative offsets mark an unknown span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: i32,
    /// End byte offset (exclusive).
    pub end: i32,
}

impl Span {
    /// The unknown span.
    pub const INVALID: Self = Self { start: -1, end: -1 };

    /// Creates a new span.
    #[must_use]
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Returns true when both offsets are known.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.start >= 0 && self.end >= 0
    }

    /// Returns the span as a byte range, if it is valid.
    #[must_use]
    pub fn range(self) -> Option<Range<usize>> {
        let start = usize::try_from(self.start).ok()?;
        let end = usize::try_from(self.end).ok()?;
        (start <= end).then_some(start..end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

static EMPTY: NodeInfo = NodeInfo {
    start: -1,
    end: -1,
    children: BTreeMap::new(),
};

/// The span of an AST node together with the spans of its named children.
///
/// Children are keyed by the grammar's field name (`TargetList`,
/// `WhereClause`, ...), by the node variant for wrapped nodes (`SelectStmt`,
/// `ColumnRef`, ...) and by decimal index for list elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Start byte offset, or -1.
    pub start: i32,
    /// End byte offset, or -1.
    pub end: i32,
    /// Named children.
    pub children: BTreeMap<String, NodeInfo>,
}

impl Default for NodeInfo {
    fn default() -> Self {
        Self::invalid()
    }
}

impl NodeInfo {
    /// A node with no known span.
    #[must_use]
    pub const fn invalid() -> Self {
        Self {
            start: -1,
            end: -1,
            children: BTreeMap::new(),
        }
    }

    /// A leaf node covering `start..end`.
    #[must_use]
    pub const fn leaf(start: i32, end: i32) -> Self {
        Self {
            start,
            end,
            children: BTreeMap::new(),
        }
    }

    /// Returns true when the span is known.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.start >= 0 && self.end >= 0
    }

    /// The node's span.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Adds a child and widens this span to cover it. Invalid children are
    /// ignored.
    #[must_use]
    pub fn add_child(mut self, name: impl Into<String>, child: Self) -> Self {
        if !child.is_valid() {
            return self;
        }
        if self.start == -1 || child.start < self.start {
            self.start = child.start;
        }
        if self.end == -1 || child.end > self.end {
            self.end = child.end;
        }
        self.children.insert(name.into(), child);
        self
    }

    /// Returns the named child, or an invalid node.
    #[must_use]
    pub fn child(&self, name: &str) -> &Self {
        self.children.get(name).unwrap_or(&EMPTY)
    }

    /// Returns the list element at `index`, or an invalid node.
    #[must_use]
    pub fn item(&self, index: usize) -> &Self {
        self.child(&index.to_string())
    }

    /// Returns true when the named child exists.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} -> ({})", self.start, self.end, self.children.len())
    }
}

//! Byte-range edits over a query string.
//!
//! Rules address the *original* input with half-open byte ranges. [`apply`]
//! sorts them by start (stable, ties broken by kind: insert, replace, delete),
//! copies the untouched bytes in between and reports where marked rules ended
//! up in the rewritten text.

use std::ops::Range;

use crate::error::{GenError, Result};

/// A deferred replacement, produced when the rule is applied.
pub type Deferred<'a> = Box<dyn FnOnce() -> String + 'a>;

enum Op<'a> {
    Insert(String),
    Replace(Deferred<'a>),
    Delete,
}

impl Op<'_> {
    const fn rank(&self) -> u8 {
        match self {
            Self::Insert(_) => 1,
            Self::Replace(_) => 2,
            Self::Delete => 3,
        }
    }
}

enum Hook<T> {
    None,
    Callback(T),
    Record(T),
}

/// One edit against the original input.
pub struct EditRule<'a, T> {
    range: Range<usize>,
    op: Op<'a>,
    hook: Hook<T>,
}

impl<'a, T> EditRule<'a, T> {
    /// Removes the bytes in `range`.
    #[must_use]
    pub const fn delete(range: Range<usize>) -> Self {
        Self {
            range,
            op: Op::Delete,
            hook: Hook::None,
        }
    }

    /// Inserts `text` before the byte at `pos`.
    #[must_use]
    pub fn insert(pos: usize, text: impl Into<String>) -> Self {
        Self {
            range: pos..pos,
            op: Op::Insert(text.into()),
            hook: Hook::None,
        }
    }

    /// Replaces the bytes in `range` with `text`.
    #[must_use]
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self::replace_by(range, move || text)
    }

    /// Replaces the bytes in `range` with the output of `content`, called
    /// when the rule is reached.
    #[must_use]
    pub fn replace_by(range: Range<usize>, content: impl FnOnce() -> String + 'a) -> Self {
        Self {
            range,
            op: Op::Replace(Box::new(content)),
            hook: Hook::None,
        }
    }

    /// Reports where `range` lands in the output without changing anything.
    #[must_use]
    pub const fn record_points(range: Range<usize>, mark: T) -> Self {
        Self {
            range,
            op: Op::Delete,
            hook: Hook::Record(mark),
        }
    }

    /// Reports the output span written by this rule.
    #[must_use]
    pub fn with_callback(mut self, mark: T) -> Self {
        self.hook = Hook::Callback(mark);
        self
    }

    /// The original byte range this rule touches.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }
}

/// A mark and the span it maps to in the rewritten text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marked<T> {
    /// The mark attached to the rule.
    pub mark: T,
    /// Start offset in the output.
    pub start: usize,
    /// End offset (exclusive) in the output.
    pub end: usize,
}

/// The rewritten text and the marks reached while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edited<T> {
    /// The rewritten text.
    pub text: String,
    /// Marks in the order they fired.
    pub marks: Vec<Marked<T>>,
}

enum Signal {
    None,
    Callback(usize),
    RecordStart(usize),
    RecordEnd(usize),
}

struct Step<'a> {
    start: usize,
    end: usize,
    op: Op<'a>,
    signal: Signal,
}

/// Applies `rules` to `input`.
///
/// Zero-width rules that land inside an already consumed range are moved to
/// the cursor; any other rule starting before the cursor is rejected.
///
/// # Errors
///
/// Returns [`GenError::OverlappingEditRules`] for overlapping rules and
/// [`GenError::OutOfBounds`] for ranges outside of `input`.
pub fn apply<T>(input: &str, rules: Vec<EditRule<'_, T>>) -> Result<Edited<T>> {
    let mut marks: Vec<Option<T>> = Vec::new();
    let mut steps = Vec::with_capacity(rules.len());

    for rule in rules {
        let Range { start, end } = rule.range;
        if end < start {
            return Err(GenError::OutOfBounds(start));
        }
        match rule.hook {
            Hook::None => steps.push(Step {
                start,
                end,
                op: rule.op,
                signal: Signal::None,
            }),
            Hook::Callback(mark) => {
                marks.push(Some(mark));
                steps.push(Step {
                    start,
                    end,
                    op: rule.op,
                    signal: Signal::Callback(marks.len() - 1),
                });
            }
            Hook::Record(mark) => {
                marks.push(Some(mark));
                let id = marks.len() - 1;
                steps.push(Step {
                    start,
                    end: start,
                    op: Op::Insert(String::new()),
                    signal: Signal::RecordStart(id),
                });
                steps.push(Step {
                    start: end,
                    end,
                    op: Op::Insert(String::new()),
                    signal: Signal::RecordEnd(id),
                });
            }
        }
    }

    steps.sort_by_key(|s| (s.start, s.op.rank()));

    let mut starts = vec![0; marks.len()];
    let mut fired = Vec::with_capacity(marks.len());
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;

    for step in steps {
        if step.start > input.len() {
            return Err(GenError::OutOfBounds(step.start));
        }
        let end = step.end.min(input.len());
        let mut start = step.start;
        if start < cursor {
            if step.start != step.end {
                return Err(GenError::OverlappingEditRules {
                    start: step.start,
                    end: step.end,
                    cursor,
                });
            }
            start = cursor;
        }

        let gap = input
            .get(cursor..start)
            .ok_or(GenError::OutOfBounds(start))?;
        out.push_str(gap);
        cursor = start;

        let out_start = out.len();
        match step.op {
            Op::Insert(text) => out.push_str(&text),
            Op::Replace(content) => out.push_str(&content()),
            Op::Delete => {}
        }
        let out_end = out.len();

        match step.signal {
            Signal::None => {}
            Signal::RecordStart(id) => starts[id] = out_start,
            Signal::Callback(id) => {
                if let Some(mark) = marks[id].take() {
                    fired.push(Marked {
                        mark,
                        start: out_start,
                        end: out_end,
                    });
                }
            }
            Signal::RecordEnd(id) => {
                if let Some(mark) = marks[id].take() {
                    fired.push(Marked {
                        mark,
                        start: starts[id],
                        end: out_end,
                    });
                }
            }
        }

        cursor = cursor.max(end);
    }

    let rest = input.get(cursor..).ok_or(GenError::OutOfBounds(cursor))?;
    out.push_str(rest);

    Ok(Edited {
        text: out,
        marks: fired,
    })
}

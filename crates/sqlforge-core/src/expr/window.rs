//! Window definitions and frames.

use super::{Expr, OrderDef};
use crate::error::{RenderError, Result};
use crate::render::{Expression, Writer};

/// Frame unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// `RANGE`.
    Range,
    /// `ROWS`.
    Rows,
    /// `GROUPS`.
    Groups,
}

impl FrameMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Range => "RANGE",
            Self::Rows => "ROWS",
            Self::Groups => "GROUPS",
        }
    }
}

/// A frame start or end.
#[derive(Debug, Clone)]
pub enum FrameBound {
    /// `UNBOUNDED PRECEDING`.
    UnboundedPreceding,
    /// `offset PRECEDING`.
    Preceding(Expr),
    /// `CURRENT ROW`.
    CurrentRow,
    /// `offset FOLLOWING`.
    Following(Expr),
    /// `UNBOUNDED FOLLOWING`.
    UnboundedFollowing,
}

impl Expression for FrameBound {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        match self {
            Self::UnboundedPreceding => w.write_str("UNBOUNDED PRECEDING"),
            Self::CurrentRow => w.write_str("CURRENT ROW"),
            Self::UnboundedFollowing => w.write_str("UNBOUNDED FOLLOWING"),
            Self::Preceding(e) => {
                w.express(e)?;
                w.write_str(" PRECEDING");
            }
            Self::Following(e) => {
                w.express(e)?;
                w.write_str(" FOLLOWING");
            }
        }
        Ok(())
    }
}

/// Frame exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameExclusion {
    /// `EXCLUDE CURRENT ROW`.
    CurrentRow,
    /// `EXCLUDE GROUP`.
    Group,
    /// `EXCLUDE TIES`.
    Ties,
    /// `EXCLUDE NO OTHERS`.
    NoOthers,
}

impl FrameExclusion {
    const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentRow => "CURRENT ROW",
            Self::Group => "GROUP",
            Self::Ties => "TIES",
            Self::NoOthers => "NO OTHERS",
        }
    }
}

/// A window frame: `mode start` or `mode BETWEEN start AND end`.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Frame unit; required.
    pub mode: Option<FrameMode>,
    /// Frame start; required.
    pub start: Option<FrameBound>,
    /// Optional frame end.
    pub end: Option<FrameBound>,
    /// Optional exclusion.
    pub exclusion: Option<FrameExclusion>,
}

impl Expression for Frame {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        let mode = self.mode.ok_or(RenderError::MissingFrameMode)?;
        let start = self.start.as_ref().ok_or(RenderError::MissingFrameStart)?;

        w.write_str(mode.as_str());
        w.write_char(' ');
        if self.end.is_some() {
            w.write_str("BETWEEN ");
        }
        w.express(start)?;
        w.express_opt(self.end.as_ref(), " AND ", "")?;
        if let Some(exclusion) = self.exclusion {
            w.write_str(" EXCLUDE ");
            w.write_str(exclusion.as_str());
        }
        Ok(())
    }
}

/// The body of `OVER (...)` or `WINDOW name AS (...)`.
#[derive(Debug, Clone, Default)]
pub struct WindowDef {
    /// An existing window this one extends.
    pub from: Option<String>,
    /// `PARTITION BY` expressions.
    pub partition_by: Vec<Expr>,
    /// `ORDER BY` items.
    pub order_by: Vec<OrderDef>,
    /// Optional frame.
    pub frame: Option<Frame>,
}

impl WindowDef {
    /// Creates an empty window definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends an existing named window.
    #[must_use]
    pub fn extends(mut self, name: impl Into<String>) -> Self {
        self.from = Some(name.into());
        self
    }

    /// Adds `PARTITION BY` expressions.
    #[must_use]
    pub fn partition_by<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.partition_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Adds an `ORDER BY` item.
    #[must_use]
    pub fn order_by(mut self, order: impl Into<OrderDef>) -> Self {
        self.order_by.push(order.into());
        self
    }

    fn frame_mut(&mut self) -> &mut Frame {
        self.frame.get_or_insert_with(Frame::default)
    }

    /// Sets the frame unit.
    #[must_use]
    pub fn mode(mut self, mode: FrameMode) -> Self {
        self.frame_mut().mode = Some(mode);
        self
    }

    /// Sets the frame start.
    #[must_use]
    pub fn frame_start(mut self, bound: FrameBound) -> Self {
        self.frame_mut().start = Some(bound);
        self
    }

    /// Sets the frame end.
    #[must_use]
    pub fn frame_end(mut self, bound: FrameBound) -> Self {
        self.frame_mut().end = Some(bound);
        self
    }

    /// Sets the frame exclusion.
    #[must_use]
    pub fn exclude(mut self, exclusion: FrameExclusion) -> Self {
        self.frame_mut().exclusion = Some(exclusion);
        self
    }
}

impl Expression for WindowDef {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        let mut needs_space = false;
        if let Some(from) = &self.from {
            w.write_str(from);
            needs_space = true;
        }
        if !self.partition_by.is_empty() {
            if needs_space {
                w.write_char(' ');
            }
            w.express_slice(&self.partition_by, "PARTITION BY ", ", ", "")?;
            needs_space = true;
        }
        if !self.order_by.is_empty() {
            if needs_space {
                w.write_char(' ');
            }
            w.express_slice(&self.order_by, "ORDER BY ", ", ", "")?;
            needs_space = true;
        }
        if let Some(frame) = &self.frame {
            if needs_space {
                w.write_char(' ');
            }
            w.express(frame)?;
        }
        Ok(())
    }
}

/// `name AS (definition)` inside a `WINDOW` clause.
#[derive(Debug, Clone)]
pub struct NamedWindow {
    /// Window name.
    pub name: String,
    /// Window body.
    pub definition: WindowDef,
}

impl NamedWindow {
    /// Creates a named window.
    #[must_use]
    pub fn new(name: impl Into<String>, definition: WindowDef) -> Self {
        Self {
            name: name.into(),
            definition,
        }
    }
}

impl Expression for NamedWindow {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_str(&self.name);
        w.write_str(" AS (");
        w.express(&self.definition)?;
        w.write_char(')');
        Ok(())
    }
}

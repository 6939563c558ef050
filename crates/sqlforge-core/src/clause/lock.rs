//! Row-level locking clauses.

use crate::dialect::require;
use crate::error::Result;
use crate::render::{Expression, Writer};

/// Lock strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStrength {
    /// `FOR UPDATE`.
    Update,
    /// `FOR NO KEY UPDATE`.
    NoKeyUpdate,
    /// `FOR SHARE`.
    Share,
    /// `FOR KEY SHARE`.
    KeyShare,
}

impl LockStrength {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Update => "UPDATE",
            Self::NoKeyUpdate => "NO KEY UPDATE",
            Self::Share => "SHARE",
            Self::KeyShare => "KEY SHARE",
        }
    }
}

/// Behaviour when a row is already locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockWait {
    /// `NOWAIT`.
    NoWait,
    /// `SKIP LOCKED`.
    SkipLocked,
}

/// `FOR strength [OF t1, t2] [NOWAIT | SKIP LOCKED]`.
#[derive(Debug, Clone)]
pub struct Lock {
    /// Lock strength.
    pub strength: LockStrength,
    /// Tables to lock; all when empty.
    pub tables: Vec<String>,
    /// Wait policy.
    pub wait: Option<LockWait>,
}

impl Lock {
    /// Creates a lock of the given strength.
    #[must_use]
    pub const fn new(strength: LockStrength) -> Self {
        Self {
            strength,
            tables: Vec::new(),
            wait: None,
        }
    }

    /// Restricts the lock to `tables`.
    #[must_use]
    pub fn of<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables.extend(tables.into_iter().map(Into::into));
        self
    }

    /// Fails instead of waiting.
    #[must_use]
    pub const fn no_wait(mut self) -> Self {
        self.wait = Some(LockWait::NoWait);
        self
    }

    /// Skips locked rows.
    #[must_use]
    pub const fn skip_locked(mut self) -> Self {
        self.wait = Some(LockWait::SkipLocked);
        self
    }
}

impl Expression for Lock {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        let d = w.dialect();
        require(d, d.supports_locking(), "FOR UPDATE")?;

        w.write_str("FOR ");
        w.write_str(self.strength.as_str());
        if !self.tables.is_empty() {
            w.write_str(" OF ");
            w.write_str(&self.tables.join(", "));
        }
        match self.wait {
            Some(LockWait::NoWait) => w.write_str(" NOWAIT"),
            Some(LockWait::SkipLocked) => w.write_str(" SKIP LOCKED"),
            None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{GenericDialect, Postgres};
    use crate::error::RenderError;
    use crate::render::{render, Context};

    #[test]
    fn test_lock_of_tables_skip_locked() {
        let lock = Lock::new(LockStrength::NoKeyUpdate)
            .of(["a", "b"])
            .skip_locked();
        let (text, _) = render(&lock, &Context::new(), &Postgres, 0).unwrap();
        assert_eq!(text, "FOR NO KEY UPDATE OF a, b SKIP LOCKED");
    }

    #[test]
    fn test_lock_requires_dialect_support() {
        let lock = Lock::new(LockStrength::Share);
        let err = render(&lock, &Context::new(), &GenericDialect, 0).unwrap_err();
        assert!(matches!(err, RenderError::DialectMismatch { .. }));
    }
}

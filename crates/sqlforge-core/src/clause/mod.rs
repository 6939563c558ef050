//! Clause model.
//!
//! Each clause is a plain struct that renders itself; the query kinds in
//! [`crate::query`] compose them in SQL order.

mod combine;
mod conditions;
mod conflict;
mod cte;
mod from;
mod group_by;
mod limit;
mod lock;
mod merge;
mod order_by;
mod returning;
mod set;
mod values;
mod windows;

pub use combine::{Combine, CombineStrategy};
pub use conditions::{Having, Where};
pub use conflict::{Conflict, ConflictAction, ConflictTarget};
pub use cte::{Cte, CteCycle, CteSearch, SearchOrder, With};
pub use from::{Join, JoinKind, Table, TableRef};
pub use group_by::{GroupBy, GroupingSet, GroupingSetKind};
pub use limit::{Fetch, Limit, Offset};
pub use lock::{Lock, LockStrength, LockWait};
pub use merge::{MergeAction, MergeMatch, MergeSource, MergeUsing, MergeWhen, Overriding};
pub use order_by::OrderBy;
pub use returning::Returning;
pub use set::Set;
pub use values::{Row, Values};
pub use windows::Windows;

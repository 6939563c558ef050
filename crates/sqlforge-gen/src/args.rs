//! Turns placeholder occurrences and value groups into query arguments.
//!
//! An argument that sits inside a group becomes a child of the smallest group
//! containing it; groups nest the same way. A group with a single child that
//! cannot take several values collapses to that child.

use std::collections::HashSet;

use crate::query::{QueryArg, QueryCol};
use crate::walker::{ArgPos, Formatted, Walker};

impl Walker<'_> {
    /// Builds the argument list of the rewritten query. `types` holds the
    /// target type of every placeholder, in placeholder order.
    #[must_use]
    pub fn query_args(&self, formatted: &Formatted, types: &[String]) -> Vec<QueryArg> {
        let args: Vec<QueryArg> = formatted
            .args
            .iter()
            .enumerate()
            .map(|(i, positions)| self.bind_arg(i, positions, &formatted.multiple, types))
            .collect();

        let mut groups = formatted.groups.clone();
        groups.sort_by_key(|g| g.edited.1.saturating_sub(g.edited.0));

        let mut arg_grouped = vec![false; args.len()];
        let mut group_grouped = vec![false; groups.len()];
        let mut group_args: Vec<Option<QueryArg>> = vec![None; groups.len()];

        for (gi, group) in groups.iter().enumerate() {
            let contains = |pos: (usize, usize)| group.edited.0 <= pos.0 && pos.1 <= group.edited.1;

            let mut children = Vec::new();
            for (ai, arg) in args.iter().enumerate() {
                if arg_grouped[ai] || arg.positions.len() != 1 || !contains(arg.first_position()) {
                    continue;
                }
                arg_grouped[ai] = true;
                children.push(arg.clone());
            }
            for si in 0..gi {
                if group_grouped[si] {
                    continue;
                }
                let Some(smaller) = &group_args[si] else { continue };
                if contains(groups[si].edited) {
                    group_grouped[si] = true;
                    children.push(smaller.clone());
                }
            }

            if children.is_empty() {
                continue;
            }
            sort_by_position(&mut children);
            fix_duplicate_names(&mut children);

            let name = match self.name(group.original) {
                "" => format!("group{}", group.edited.0),
                name => name.to_string(),
            };
            let col = QueryCol {
                name,
                nullable: Some(false),
                ..QueryCol::default()
            }
            .merge([self.arg_config(group)]);

            group_args[gi] = Some(QueryArg {
                col,
                children,
                positions: vec![group.edited],
                can_be_multiple: formatted.multiple.contains(&group.edited),
            });
        }

        let mut all: Vec<QueryArg> = args
            .into_iter()
            .zip(arg_grouped)
            .filter(|(arg, grouped)| !grouped && !arg.positions.is_empty())
            .map(|(arg, _)| arg)
            .collect();

        for (group, grouped) in group_args.into_iter().zip(group_grouped) {
            let Some(mut group) = group else { continue };
            if grouped {
                continue;
            }
            if group.children.len() == 1 && !group.can_be_multiple {
                all.push(group.children.remove(0));
            } else {
                all.push(group);
            }
        }

        sort_by_position(&mut all);
        fix_duplicate_names(&mut all);
        all
    }

    fn bind_arg(
        &self,
        index: usize,
        positions: &[ArgPos],
        multiple: &HashSet<(usize, usize)>,
        types: &[String],
    ) -> QueryArg {
        let mut name = format!("arg{}", index + 1);
        let mut nullable = false;
        let mut can_be_multiple = false;
        let mut configs = Vec::with_capacity(positions.len());

        for pos in positions {
            match self.name(pos.original) {
                "" => {}
                found => found.clone_into(&mut name),
            }
            if let Some(n) = self.nullability.get(&pos.original) {
                nullable = nullable || n.is_null(&self.names, &[]);
            }
            can_be_multiple = can_be_multiple || multiple.contains(&pos.edited);
            configs.push(self.arg_config(pos));
        }

        let col = QueryCol {
            name,
            db_name: String::new(),
            nullable: Some(nullable),
            type_name: types.get(index).cloned().unwrap_or_default(),
        }
        .merge(configs);

        QueryArg {
            col,
            children: Vec::new(),
            positions: positions.iter().map(|p| p.edited).collect(),
            can_be_multiple,
        }
    }

    fn arg_config(&self, pos: &ArgPos) -> QueryCol {
        QueryCol::parse_config(&self.tokens.block_comment_after(pos.original.end))
    }
}

fn sort_by_position(args: &mut [QueryArg]) {
    args.sort_by_key(QueryArg::first_position);
}

/// Suffixes repeated names with `_2`, `_3`, ... in order.
fn fix_duplicate_names(args: &mut [QueryArg]) {
    let mut seen = std::collections::HashMap::<String, usize>::new();
    for arg in args.iter_mut() {
        if arg.col.name.is_empty() {
            continue;
        }
        let count = seen.entry(arg.col.name.clone()).or_default();
        *count += 1;
        if *count > 1 {
            arg.col.name = format!("{}_{count}", arg.col.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn arg(name: &str, start: usize) -> QueryArg {
        QueryArg {
            col: QueryCol {
                name: name.into(),
                ..QueryCol::default()
            },
            positions: vec![(start, start + 2)],
            ..QueryArg::default()
        }
    }

    fn pos(edited: (usize, usize)) -> ArgPos {
        ArgPos {
            original: Span::new(i32::try_from(edited.0).unwrap(), i32::try_from(edited.1).unwrap()),
            edited,
        }
    }

    #[test]
    fn test_fix_duplicate_names() {
        let mut args = vec![arg("id", 0), arg("id", 5), arg("", 9), arg("id", 12)];
        fix_duplicate_names(&mut args);
        let names: Vec<_> = args.iter().map(|a| a.col.name.as_str()).collect();
        assert_eq!(names, ["id", "id_2", "", "id_3"]);
    }

    #[test]
    fn test_ungrouped_args_are_sorted_by_position() {
        let w = Walker::new("SELECT $2, $1", &[], "public").unwrap();
        let formatted = Formatted {
            args: vec![vec![pos((11, 13))], vec![pos((7, 9))]],
            ..Formatted::default()
        };
        let args = w.query_args(&formatted, &["i32".into(), "String".into()]);
        assert_eq!(args[0].col.name, "arg2");
        assert_eq!(args[0].col.type_name, "String");
        assert_eq!(args[1].col.name, "arg1");
        assert_eq!(args[1].col.nullable, Some(false));
    }

    #[test]
    fn test_group_collects_args_and_nested_groups() {
        let w = Walker::new("SELECT 1", &[], "public").unwrap();
        // ($1, ($2, $3))
        let formatted = Formatted {
            args: vec![vec![pos((1, 3))], vec![pos((6, 8))], vec![pos((10, 12))]],
            groups: vec![pos((0, 14)), pos((5, 13))],
            ..Formatted::default()
        };
        let args = w.query_args(&formatted, &[]);
        assert_eq!(args.len(), 1);
        let outer = &args[0];
        assert_eq!(outer.col.name, "group0");
        assert_eq!(outer.children.len(), 2);
        assert_eq!(outer.children[0].col.name, "arg1");
        assert_eq!(outer.children[1].col.name, "group5");
        assert_eq!(outer.children[1].children.len(), 2);
    }

    #[test]
    fn test_single_child_group_collapses_unless_multiple() {
        let w = Walker::new("SELECT 1", &[], "public").unwrap();
        let mut formatted = Formatted {
            args: vec![vec![pos((1, 3))]],
            groups: vec![pos((0, 4))],
            ..Formatted::default()
        };
        let args = w.query_args(&formatted, &[]);
        assert_eq!(args[0].col.name, "arg1");
        assert!(args[0].children.is_empty());

        formatted.multiple.insert((0, 4));
        let args = w.query_args(&formatted, &[]);
        assert_eq!(args[0].col.name, "group0");
        assert!(args[0].can_be_multiple);
    }

    #[test]
    fn test_repeated_arg_stays_outside_groups() {
        let w = Walker::new("SELECT 1", &[], "public").unwrap();
        let formatted = Formatted {
            args: vec![vec![pos((1, 3)), pos((20, 22))]],
            groups: vec![pos((0, 4))],
            ..Formatted::default()
        };
        let args = w.query_args(&formatted, &[]);
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].positions, vec![(1, 3), (20, 22)]);
    }
}

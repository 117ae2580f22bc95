//! Assembles flat category rows into a sorted forest.

use std::{cmp::Ordering, collections::HashMap};

use icu_collator::{Collator, CollatorBorrowed, options::CollatorOptions};

use crate::category::{Category, CategoryId, CategoryNode};

/// Order names with the root Unicode collation: accents and case only break ties, and
/// lowercase sorts before uppercase. Names the collator considers equal fall back to a code
/// point comparison so that the order is deterministic.
///
/// Without a collator, names are compared case-insensitively.
fn compare_names(collator: Option<&CollatorBorrowed>, left: &str, right: &str) -> Ordering {
    let ordering = match collator {
        Some(collator) => collator.compare(left, right),
        None => left.to_lowercase().cmp(&right.to_lowercase()),
    };

    ordering.then_with(|| left.cmp(right))
}

/// Build a forest from `categories`, nesting each category under its parent.
///
/// The roots are the categories without a parent. Siblings are sorted by name at every level.
/// Categories whose parent is not in `categories` cannot be reached from a root and are left
/// out.
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let mut children_by_parent: HashMap<Option<CategoryId>, Vec<usize>> = HashMap::new();

    for (index, category) in categories.iter().enumerate() {
        children_by_parent
            .entry(category.parent_id)
            .or_default()
            .push(index);
    }

    let collator = Collator::try_new(Default::default(), CollatorOptions::default())
        .inspect_err(|error| tracing::error!("could not load the name collator: {error}"))
        .ok();

    for siblings in children_by_parent.values_mut() {
        siblings.sort_by(|&left, &right| {
            compare_names(
                collator.as_ref(),
                &categories[left].name,
                &categories[right].name,
            )
        });
    }

    let mut arena: Vec<Option<Category>> = categories.into_iter().map(Some).collect();

    assemble(None, &children_by_parent, &mut arena)
}

fn assemble(
    parent_id: Option<CategoryId>,
    children_by_parent: &HashMap<Option<CategoryId>, Vec<usize>>,
    arena: &mut [Option<Category>],
) -> Vec<CategoryNode> {
    let Some(children) = children_by_parent.get(&parent_id) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(children.len());

    for &index in children {
        // Each record is taken once, so a cycle in the parent links cannot recurse forever.
        let Some(category) = arena[index].take() else {
            continue;
        };

        let subcategories = assemble(Some(category.id), children_by_parent, arena);
        nodes.push(CategoryNode {
            category,
            subcategories,
        });
    }

    nodes
}

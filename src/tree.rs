//! Bounded-depth ancestor tree assembly.
//!
//! Recursion stops at `max_generations`, never on repeated individuals, so an
//! ancestor reachable through several lines appears once per line.

use crate::config::{MAX_GENERATIONS, MIN_GENERATIONS};
use crate::i18n::Translator;
use crate::ir::{AncestorNode, PersonRecord};
use crate::projector::project;
use crate::repository::Repository;
use crate::theme::ColorResolver;

/// Decides whether an ancestor above the root is included in the tree.
pub trait AncestorFilter {
    fn admits(&self, person: &PersonRecord, generation: u32) -> bool;
}

/// Includes every resolvable ancestor; visibility is only checked for the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowAll;

impl AncestorFilter for ShowAll {
    fn admits(&self, _person: &PersonRecord, _generation: u32) -> bool {
        true
    }
}

/// Prunes ancestors the repository refuses to show.
pub struct VisibleOnly<'a, R: Repository + ?Sized> {
    pub repository: &'a R,
}

impl<R: Repository + ?Sized> AncestorFilter for VisibleOnly<'_, R> {
    fn admits(&self, person: &PersonRecord, _generation: u32) -> bool {
        self.repository.can_show(person)
    }
}

/// Everything the builder needs besides the person graph.
#[derive(Clone, Copy)]
pub struct ChartContext<'a> {
    pub max_generations: u32,
    pub colors: &'a dyn ColorResolver,
    pub translator: &'a dyn Translator,
    pub filter: &'a dyn AncestorFilter,
}

impl<'a> ChartContext<'a> {
    /// `max_generations` is clamped into the supported range.
    pub fn new(
        max_generations: u32,
        colors: &'a dyn ColorResolver,
        translator: &'a dyn Translator,
        filter: &'a dyn AncestorFilter,
    ) -> Self {
        Self {
            max_generations: max_generations.clamp(MIN_GENERATIONS, MAX_GENERATIONS),
            colors,
            translator,
            filter,
        }
    }
}

impl std::fmt::Debug for ChartContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartContext")
            .field("max_generations", &self.max_generations)
            .finish_non_exhaustive()
    }
}

/// Builds the tree rooted at `root` (generation 1).
pub fn build_ancestor_tree<R: Repository + ?Sized>(
    repo: &R,
    root: &PersonRecord,
    ctx: &ChartContext<'_>,
) -> AncestorNode {
    let tree = build_node(repo, Some(root), 1, ctx).unwrap_or_else(|| project(Some(root), 1, ctx));
    log::debug!(
        "built ancestor tree for {}: {} nodes, depth {} of {}",
        root.xref,
        tree.node_count(),
        tree.depth(),
        ctx.max_generations
    );
    tree
}

fn build_node<R: Repository + ?Sized>(
    repo: &R,
    person: Option<&PersonRecord>,
    generation: u32,
    ctx: &ChartContext<'_>,
) -> Option<AncestorNode> {
    let person = person?;
    if generation > ctx.max_generations {
        return None;
    }
    if generation > 1 && !ctx.filter.admits(person, generation) {
        log::trace!("pruned {} at generation {generation}", person.xref);
        return None;
    }

    let mut node = project(Some(person), generation, ctx);
    if generation == ctx.max_generations {
        return Some(node);
    }
    let Some(family) = repo.child_family(person) else {
        return Some(node);
    };

    let children: Vec<AncestorNode> = [family.husband.as_deref(), family.wife.as_deref()]
        .into_iter()
        .filter_map(|xref| {
            let parent = xref.and_then(|xref| repo.person(xref));
            build_node(repo, parent.as_ref(), generation + 1, ctx)
        })
        .collect();
    if !children.is_empty() {
        node.children = Some(children);
    }
    Some(node)
}

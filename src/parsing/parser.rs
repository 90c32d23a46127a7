//! Language parser trait
//!
//! This module defines the common interface that all language walkers must
//! implement to populate an [`Ast`], plus the recursion guard shared by
//! their tree traversals.

use crate::ast::Ast;
use crate::error::AstResult;
use crate::parsing::Language;
use tree_sitter::Node;

/// Hard ceiling on tree depth during the walk. Deeper nodes are skipped; a
/// legitimate source file never comes close.
pub const MAX_PARSE_DEPTH: usize = 200;

pub(crate) fn check_recursion_depth(depth: usize, node: Node) -> bool {
    if depth >= MAX_PARSE_DEPTH {
        tracing::warn!(
            kind = node.kind(),
            line = node.start_position().row + 1,
            "max tree depth {MAX_PARSE_DEPTH} reached, skipping subtree"
        );
        return false;
    }
    true
}

/// Common interface for all language walkers.
pub trait LanguageParser: Send {
    /// Parse `code` and walk the resulting tree, appending every extracted
    /// entity into `ast`'s collections in pre-order encounter order.
    ///
    /// The walk fires handlers at node entry only; entities are fully built
    /// at entry since all needed sub-nodes are already parsed children of
    /// the entered node.
    fn extract(&mut self, code: &str, ast: &mut Ast) -> AstResult<()>;

    /// Get the language this walker handles.
    fn language(&self) -> Language;
}

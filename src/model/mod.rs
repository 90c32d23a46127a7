//! Declaration and call entities extracted from a parse tree.
//!
//! Every entity embeds a [`Target`]: the full span of the construct plus an
//! optional identifier sub-span used for precise highlighting. Methods and
//! constructors carry a nullable back-reference to their owning class that
//! is populated either at construction (class-local instances) or by the
//! post-walk linking pass (standalone instances).

use crate::document::Document;
use crate::types::{Position, Span};
use serde::{Deserialize, Serialize};

/// A named-or-unnamed span of source text.
///
/// Equality compares the full span and the identifier sub-span. The linking
/// pass relies on this: two independently built records of the same
/// declaration compare equal, while declarations at different document
/// extents never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// The name-token sub-span; absent for anonymous spans such as
    /// `this(...)`/`super(...)` invocations.
    pub identifier: Option<Span>,
    pub start: Position,
    pub end: Position,
}

impl Target {
    pub fn new(identifier: Option<Span>, span: Span) -> Self {
        Self {
            identifier,
            start: span.start,
            end: span.end,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Source text covered by the full span, if it resolves in `document`.
    pub fn text<'a>(&self, document: &'a Document) -> Option<&'a str> {
        document.span_text(&self.span())
    }

    /// Source text of the identifier, falling back to the full span when no
    /// identifier sub-span is present.
    pub fn identifier_text<'a>(&self, document: &'a Document) -> Option<&'a str> {
        match &self.identifier {
            Some(span) => document.span_text(span),
            None => self.text(document),
        }
    }
}

/// Index-based identity of a class within one parse generation of an `Ast`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassId(u32);

impl ClassId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A declared name with its type expression and optional initializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub target: Target,
    /// Span of the type expression; absent for untyped Python parameters.
    pub ty: Option<Target>,
    /// Span of the initializer or default-value expression.
    pub value: Option<Target>,
}

impl Variable {
    pub fn new(target: Target, ty: Option<Target>, value: Option<Target>) -> Self {
        Self { target, ty, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub target: Target,
    /// Owning class; `None` until the linking pass runs, and permanently
    /// `None` for module-level functions.
    pub class_declaration: Option<ClassId>,
    /// Always present for Java (`void` included); the optional `->`
    /// annotation for Python.
    pub return_type: Option<Target>,
    pub params: Vec<Variable>,
    /// The method body, or the bare `;` of an abstract method.
    pub body: Target,
}

impl MethodDeclaration {
    pub fn new(
        target: Target,
        return_type: Option<Target>,
        params: Vec<Variable>,
        body: Target,
    ) -> Self {
        Self {
            target,
            class_declaration: None,
            return_type,
            params,
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDeclaration {
    pub target: Target,
    pub class_declaration: Option<ClassId>,
    pub params: Vec<Variable>,
    pub body: Target,
}

impl ConstructorDeclaration {
    pub fn new(target: Target, params: Vec<Variable>, body: Target) -> Self {
        Self {
            target,
            class_declaration: None,
            params,
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub target: Target,
    pub type_parameters: Vec<Target>,
    /// Zero-or-one element for Java (`extends`); Python base classes all
    /// land here.
    pub super_class: Vec<Target>,
    /// Java `implements` list; always empty for Python.
    pub interfaces: Vec<Target>,
    /// Span of the `{...}` / indented block.
    pub class_body: Target,
    pub constructor_declarations: Vec<ConstructorDeclaration>,
    /// Flattened: one entry per declared name, sharing equal `ty` targets
    /// when one statement declares several names.
    pub fields: Vec<Variable>,
    pub method_declarations: Vec<MethodDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
    pub target: Target,
    /// One span-only target per argument expression.
    pub args: Vec<Target>,
}

impl MethodCall {
    pub fn new(target: Target, args: Vec<Target>) -> Self {
        Self { target, args }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(l1: u32, c1: u32, l2: u32, c2: u32) -> Span {
        Span::new(Position::new(l1, c1), Position::new(l2, c2))
    }

    #[test]
    fn target_equality_requires_matching_identifier() {
        let a = Target::new(Some(span(0, 6, 0, 9)), span(0, 0, 2, 1));
        let b = Target::new(Some(span(0, 6, 0, 9)), span(0, 0, 2, 1));
        let anonymous = Target::new(None, span(0, 0, 2, 1));

        assert_eq!(a, b);
        assert_ne!(a, anonymous);
    }

    #[test]
    fn target_equality_distinguishes_spans() {
        let a = Target::new(Some(span(0, 6, 0, 9)), span(0, 0, 2, 1));
        let shifted = Target::new(Some(span(0, 6, 0, 9)), span(0, 0, 3, 1));
        assert_ne!(a, shifted);
    }

    #[test]
    fn class_id_round_trips_index() {
        assert_eq!(ClassId::new(3).index(), 3);
        assert_eq!(ClassId::new(0), ClassId::new(0));
    }
}

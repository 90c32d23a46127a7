//! Per-document AST aggregate.
//!
//! An [`Ast`] owns one document snapshot and the three collections the
//! walkers populate. `parse` runs reset → walk → link; the caller reads the
//! populated collections directly afterwards. Collections are in pre-order
//! tree-walk encounter order.

use crate::config::Settings;
use crate::document::Document;
use crate::error::{AstError, AstResult};
use crate::model::{ClassDeclaration, ClassId, MethodCall, MethodDeclaration};
use crate::parsing::ParserFactory;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug)]
pub struct Ast {
    pub document: Document,
    pub class_declarations: Vec<ClassDeclaration>,
    pub method_declarations: Vec<MethodDeclaration>,
    pub method_calls: Vec<MethodCall>,
    settings: Arc<Settings>,
}

impl Ast {
    pub fn new(document: Document) -> Self {
        Self::with_settings(document, Arc::new(Settings::default()))
    }

    pub fn with_settings(document: Document, settings: Arc<Settings>) -> Self {
        Self {
            document,
            class_declarations: Vec::new(),
            method_declarations: Vec::new(),
            method_calls: Vec::new(),
            settings,
        }
    }

    /// Resolve a class back-reference within the current parse generation.
    pub fn class(&self, id: ClassId) -> Option<&ClassDeclaration> {
        self.class_declarations.get(id.index())
    }

    /// Parse the current document, replacing all previously extracted
    /// entities.
    pub async fn parse(&mut self) -> AstResult<()> {
        self.parse_cancellable(&CancellationToken::new()).await
    }

    /// Parse with cooperative cancellation.
    ///
    /// The caller keeps a clone of `cancel` and may cancel it while the
    /// returned future is pending. The token is observed before the walk
    /// starts, not mid-walk: tree-walking is synchronous and runs to
    /// completion once entered. A cancelled parse rejects with
    /// [`AstError::Aborted`] and leaves the collections empty.
    pub async fn parse_cancellable(&mut self, cancel: &CancellationToken) -> AstResult<()> {
        self.reset();
        if cancel.is_cancelled() {
            return Err(AstError::Aborted);
        }

        let factory = ParserFactory::new(Arc::clone(&self.settings));
        let mut parser = factory.create_parser(self.document.language())?;

        // The one suspension point: an abort racing this parse lands here,
        // before the walk starts.
        tokio::task::yield_now().await;
        if cancel.is_cancelled() {
            return Err(AstError::Aborted);
        }

        let code = self.document.text_arc();
        parser.extract(&code, self)?;
        debug!(
            language = %self.document.language(),
            classes = self.class_declarations.len(),
            methods = self.method_declarations.len(),
            calls = self.method_calls.len(),
            "walk complete"
        );

        self.link_members();
        Ok(())
    }

    fn reset(&mut self) {
        self.class_declarations.clear();
        self.method_declarations.clear();
        self.method_calls.clear();
    }

    /// Link every standalone method declaration to its owning class.
    ///
    /// A standalone entry matches a class when its target equals one of the
    /// class-local members — full span plus identifier sub-span, never name
    /// alone, so same-named methods with different bodies are not
    /// conflated. Idempotent: re-running over an unmutated `Ast` reassigns
    /// the same references.
    pub fn link_members(&mut self) {
        for (index, class) in self.class_declarations.iter().enumerate() {
            for method in self.method_declarations.iter_mut() {
                if class
                    .method_declarations
                    .iter()
                    .any(|member| member.target == method.target)
                {
                    method.class_declaration = Some(ClassId::new(index));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassDeclaration, MethodDeclaration, Target, Variable};
    use crate::parsing::Language;
    use crate::types::{Position, Span};

    fn span(l1: u32, c1: u32, l2: u32, c2: u32) -> Span {
        Span::new(Position::new(l1, c1), Position::new(l2, c2))
    }

    fn method(body_line: u32) -> MethodDeclaration {
        let target = Target::new(
            Some(span(body_line, 5, body_line, 8)),
            span(body_line, 0, body_line + 2, 1),
        );
        MethodDeclaration::new(
            target,
            Some(Target::new(
                Some(span(body_line, 0, body_line, 4)),
                span(body_line, 0, body_line, 4),
            )),
            Vec::<Variable>::new(),
            Target::new(None, span(body_line + 1, 0, body_line + 2, 1)),
        )
    }

    fn class_with(methods: Vec<MethodDeclaration>) -> ClassDeclaration {
        ClassDeclaration {
            target: Target::new(Some(span(0, 6, 0, 9)), span(0, 0, 20, 1)),
            type_parameters: Vec::new(),
            super_class: Vec::new(),
            interfaces: Vec::new(),
            class_body: Target::new(Some(span(0, 10, 20, 1)), span(0, 10, 20, 1)),
            constructor_declarations: Vec::new(),
            fields: Vec::new(),
            method_declarations: methods,
        }
    }

    #[test]
    fn linking_matches_by_span_and_is_idempotent() {
        let mut ast = Ast::new(Document::new(Language::Java, ""));

        let mut local = method(2);
        local.class_declaration = Some(ClassId::new(0));
        ast.class_declarations.push(class_with(vec![local]));

        // same span as the class-local copy, plus an unrelated method
        ast.method_declarations.push(method(2));
        ast.method_declarations.push(method(10));

        ast.link_members();
        assert_eq!(
            ast.method_declarations[0].class_declaration,
            Some(ClassId::new(0))
        );
        assert_eq!(ast.method_declarations[1].class_declaration, None);

        let first_pass: Vec<_> = ast
            .method_declarations
            .iter()
            .map(|m| m.class_declaration)
            .collect();
        ast.link_members();
        let second_pass: Vec<_> = ast
            .method_declarations
            .iter()
            .map(|m| m.class_declaration)
            .collect();
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn class_resolves_back_reference() {
        let mut ast = Ast::new(Document::new(Language::Java, ""));
        ast.class_declarations.push(class_with(Vec::new()));

        assert!(ast.class(ClassId::new(0)).is_some());
        assert!(ast.class(ClassId::new(1)).is_none());
    }
}

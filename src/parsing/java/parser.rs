//! Java walker: builds decoration targets from the tree-sitter CST.
//!
//! One handler per node kind of interest, fired at node entry during a
//! single pre-order traversal. Class handling classifies direct body
//! members into fields/methods/constructors and sets their owning-class
//! back-reference at construction time; methods reached independently by
//! the walk are appended standalone and linked afterwards by the `Ast`
//! linking pass.

use crate::ast::Ast;
use crate::error::{AstError, AstResult};
use crate::model::{
    ClassDeclaration, ClassId, ConstructorDeclaration, MethodCall, MethodDeclaration, Target,
    Variable,
};
use crate::parsing::Language;
use crate::parsing::parser::{LanguageParser, check_recursion_depth};
use crate::types::Span;
use tree_sitter::{Node, Parser};

// Node kinds from the tree-sitter-java grammar
const NODE_CLASS_DECLARATION: &str = "class_declaration";
const NODE_METHOD_DECLARATION: &str = "method_declaration";
const NODE_CONSTRUCTOR_DECLARATION: &str = "constructor_declaration";
const NODE_FIELD_DECLARATION: &str = "field_declaration";
const NODE_METHOD_INVOCATION: &str = "method_invocation";
const NODE_EXPLICIT_CTOR_INVOCATION: &str = "explicit_constructor_invocation";
const NODE_VARIABLE_DECLARATOR: &str = "variable_declarator";
const NODE_FORMAL_PARAMETER: &str = "formal_parameter";
const NODE_SPREAD_PARAMETER: &str = "spread_parameter";
const NODE_TYPE_LIST: &str = "type_list";
const NODE_TYPE_PARAMETER: &str = "type_parameter";
const NODE_LINE_COMMENT: &str = "line_comment";
const NODE_BLOCK_COMMENT: &str = "block_comment";

/// Walker for Java source files.
pub struct JavaParser {
    parser: Parser,
}

impl std::fmt::Debug for JavaParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaParser")
            .field("language", &"Java")
            .finish()
    }
}

impl JavaParser {
    pub fn new() -> AstResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| AstError::ParserInit {
                language: Language::Java,
                reason: e.to_string(),
            })?;
        Ok(Self { parser })
    }

    fn walk(&self, node: Node, code: &str, ast: &mut Ast, depth: usize) -> AstResult<()> {
        if !check_recursion_depth(depth, node) {
            return Ok(());
        }

        match node.kind() {
            NODE_CLASS_DECLARATION => self.enter_class_declaration(node, code, ast)?,
            NODE_METHOD_DECLARATION => {
                let method = self.build_method_declaration(node, code)?;
                ast.method_declarations.push(method);
            }
            NODE_METHOD_INVOCATION | NODE_EXPLICIT_CTOR_INVOCATION => {
                let call = self.build_method_call(node, code);
                ast.method_calls.push(call);
            }
            _ => {}
        }

        // Unconditional descent keeps the traversal pre-order and walks
        // through ERROR nodes, so recovered structure is still extracted.
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, code, ast, depth + 1)?;
        }
        Ok(())
    }

    fn enter_class_declaration(&self, node: Node, code: &str, ast: &mut Ast) -> AstResult<()> {
        let class_id = ClassId::new(ast.class_declarations.len());
        let class = self.build_class_declaration(node, code, class_id)?;
        ast.class_declarations.push(class);
        Ok(())
    }

    fn build_class_declaration(
        &self,
        node: Node,
        code: &str,
        class_id: ClassId,
    ) -> AstResult<ClassDeclaration> {
        let name = require_field(node, "name", "class identifier")?;
        let identifier = Span::of_token(&name, code);

        let mut type_parameters = Vec::new();
        if let Some(params) = node.child_by_field_name("type_parameters") {
            let mut cursor = params.walk();
            for param in params.named_children(&mut cursor) {
                if param.kind() != NODE_TYPE_PARAMETER {
                    continue;
                }
                let param_identifier = param
                    .named_children(&mut param.walk())
                    .find(|child| matches!(child.kind(), "type_identifier" | "identifier"))
                    .map(|child| Span::of_token(&child, code));
                type_parameters.push(Target::new(param_identifier, Span::of_node(&param)));
            }
        }

        // superclass wraps `extends <type>`; the type is its only named child
        let mut super_class = Vec::new();
        if let Some(superclass) = node.child_by_field_name("superclass") {
            if let Some(ty) = superclass.named_child(0) {
                super_class.push(span_target(&ty));
            }
        }

        // super_interfaces wraps `implements <type_list>`
        let mut interfaces = Vec::new();
        if let Some(super_interfaces) = node.child_by_field_name("interfaces") {
            let mut cursor = super_interfaces.walk();
            for child in super_interfaces.named_children(&mut cursor) {
                if child.kind() != NODE_TYPE_LIST {
                    continue;
                }
                let mut types = child.walk();
                for ty in child.named_children(&mut types) {
                    if is_comment(&ty) {
                        continue;
                    }
                    interfaces.push(span_target(&ty));
                }
            }
        }

        let body = require_field(node, "body", "class body")?;
        let class_body = span_target(&body);

        let mut fields = Vec::new();
        let mut method_declarations = Vec::new();
        let mut constructor_declarations = Vec::new();
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                NODE_FIELD_DECLARATION => {
                    fields.extend(self.build_field_declaration(member, code)?);
                }
                NODE_METHOD_DECLARATION => {
                    let mut method = self.build_method_declaration(member, code)?;
                    method.class_declaration = Some(class_id);
                    method_declarations.push(method);
                }
                NODE_CONSTRUCTOR_DECLARATION => {
                    let mut constructor = self.build_constructor_declaration(member, code)?;
                    constructor.class_declaration = Some(class_id);
                    constructor_declarations.push(constructor);
                }
                // static initializers, nested types: not members of this model
                _ => {}
            }
        }

        Ok(ClassDeclaration {
            target: Target::new(Some(identifier), Span::of_node(&node)),
            type_parameters,
            super_class,
            interfaces,
            class_body,
            constructor_declarations,
            fields,
            method_declarations,
        })
    }

    fn build_method_declaration(&self, node: Node, code: &str) -> AstResult<MethodDeclaration> {
        let name = require_field(node, "name", "method identifier")?;
        let identifier = Span::of_token(&name, code);

        // the type field covers `void` as well
        let ty = require_field(node, "type", "method return type")?;
        let return_type = Some(span_target(&ty));

        let params = self.build_formal_params(node, code)?;

        let body = match node.child_by_field_name("body") {
            Some(body) => span_target(&body),
            // abstract methods carry no block; the `;` terminator is the body
            None => semicolon_target(node),
        };

        Ok(MethodDeclaration::new(
            Target::new(Some(identifier), Span::of_node(&node)),
            return_type,
            params,
            body,
        ))
    }

    fn build_constructor_declaration(
        &self,
        node: Node,
        code: &str,
    ) -> AstResult<ConstructorDeclaration> {
        let name = require_field(node, "name", "constructor identifier")?;
        let identifier = Span::of_token(&name, code);
        let params = self.build_formal_params(node, code)?;
        let body = require_field(node, "body", "constructor body")?;

        Ok(ConstructorDeclaration::new(
            Target::new(Some(identifier), Span::of_node(&node)),
            params,
            span_target(&body),
        ))
    }

    fn build_formal_params(&self, node: Node, code: &str) -> AstResult<Vec<Variable>> {
        let list = require_field(node, "parameters", "parameter list")?;

        let mut params = Vec::new();
        let mut cursor = list.walk();
        for param in list.named_children(&mut cursor) {
            match param.kind() {
                NODE_FORMAL_PARAMETER => {
                    let name = require_field(param, "name", "parameter identifier")?;
                    let ty = require_field(param, "type", "parameter type")?;
                    params.push(Variable::new(
                        Target::new(Some(Span::of_token(&name, code)), Span::of_node(&param)),
                        Some(span_target(&ty)),
                        None,
                    ));
                }
                NODE_SPREAD_PARAMETER => {
                    // varargs: `Type... name`, with the name inside a declarator
                    let declarator = param
                        .named_children(&mut param.walk())
                        .find(|child| child.kind() == NODE_VARIABLE_DECLARATOR);
                    let identifier = declarator
                        .and_then(|d| d.child_by_field_name("name"))
                        .map(|name| Span::of_token(&name, code));
                    let ty = param
                        .named_children(&mut param.walk())
                        .find(|child| child.kind() != NODE_VARIABLE_DECLARATOR && !is_comment(child))
                        .map(|ty| span_target(&ty));
                    params.push(Variable::new(
                        Target::new(identifier, Span::of_node(&param)),
                        ty,
                        None,
                    ));
                }
                _ => {}
            }
        }
        Ok(params)
    }

    /// One shared type target, one `Variable` per declarator.
    fn build_field_declaration(&self, node: Node, code: &str) -> AstResult<Vec<Variable>> {
        let ty = require_field(node, "type", "field type")?;
        let type_target = span_target(&ty);

        let mut variables = Vec::new();
        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if declarator.kind() != NODE_VARIABLE_DECLARATOR {
                continue;
            }
            let name = require_field(declarator, "name", "field identifier")?;
            let value = declarator
                .child_by_field_name("value")
                .map(|value| span_target(&value));
            variables.push(Variable::new(
                Target::new(Some(Span::of_token(&name, code)), Span::of_node(&declarator)),
                Some(type_target.clone()),
                value,
            ));
        }
        Ok(variables)
    }

    fn build_method_call(&self, node: Node, code: &str) -> MethodCall {
        // `this(...)`/`super(...)` has no name token and stays anonymous
        let identifier = node
            .child_by_field_name("name")
            .map(|name| Span::of_token(&name, code));

        let mut args = Vec::new();
        if let Some(list) = node.child_by_field_name("arguments") {
            let mut cursor = list.walk();
            for arg in list.named_children(&mut cursor) {
                if is_comment(&arg) {
                    continue;
                }
                args.push(span_target(&arg));
            }
        }

        MethodCall::new(Target::new(identifier, Span::of_node(&node)), args)
    }
}

impl LanguageParser for JavaParser {
    fn extract(&mut self, code: &str, ast: &mut Ast) -> AstResult<()> {
        let tree = self.parser.parse(code, None).ok_or(AstError::Parse {
            language: Language::Java,
        })?;
        self.walk(tree.root_node(), code, ast, 0)
    }

    fn language(&self) -> Language {
        Language::Java
    }
}

/// Span-only target: identifier covers the full extent, like any other
/// lightweight expression target.
fn span_target(node: &Node) -> Target {
    let span = Span::of_node(node);
    Target::new(Some(span), span)
}

fn is_comment(node: &Node) -> bool {
    matches!(node.kind(), NODE_LINE_COMMENT | NODE_BLOCK_COMMENT)
}

fn require_field<'tree>(
    node: Node<'tree>,
    field: &str,
    kind: &'static str,
) -> AstResult<Node<'tree>> {
    node.child_by_field_name(field).ok_or(AstError::MissingNode {
        kind,
        line: node.start_position().row as u32 + 1,
    })
}

/// Body target for an abstract method: the terminating `;`, or a zero-width
/// span at the declaration end if even that is missing from a broken tree.
fn semicolon_target(node: Node) -> Target {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == ";" {
            return span_target(&child);
        }
    }
    let end = Span::of_node(&node).end;
    Target::new(None, Span::empty_at(end))
}

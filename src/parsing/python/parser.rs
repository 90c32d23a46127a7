//! Python walker: builds decoration targets from the tree-sitter CST.
//!
//! Same traversal shape as the Java walker. Functions are appended
//! standalone wherever they appear; classes additionally build their direct
//! body functions as class-local methods with the back-reference set at
//! construction, and the linking pass reconciles the two afterwards.
//! Python has no constructor grammar rule, so `__init__` stays an ordinary
//! method and `constructor_declarations` is always empty here.

use crate::ast::Ast;
use crate::error::{AstError, AstResult};
use crate::model::{ClassDeclaration, ClassId, MethodCall, MethodDeclaration, Target, Variable};
use crate::parsing::Language;
use crate::parsing::parser::{LanguageParser, check_recursion_depth};
use crate::types::Span;
use tree_sitter::{Node, Parser};

// Node kinds from the tree-sitter-python grammar
const NODE_FUNCTION_DEFINITION: &str = "function_definition";
const NODE_CLASS_DEFINITION: &str = "class_definition";
const NODE_DECORATED_DEFINITION: &str = "decorated_definition";
const NODE_CALL: &str = "call";
const NODE_ARGUMENT_LIST: &str = "argument_list";
const NODE_ASSIGNMENT: &str = "assignment";
const NODE_EXPRESSION_STATEMENT: &str = "expression_statement";
const NODE_IDENTIFIER: &str = "identifier";
const NODE_ATTRIBUTE: &str = "attribute";
const NODE_KEYWORD_ARGUMENT: &str = "keyword_argument";
const NODE_COMMENT: &str = "comment";

/// Walker for Python source files.
pub struct PythonParser {
    parser: Parser,
}

impl std::fmt::Debug for PythonParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonParser")
            .field("language", &"Python")
            .finish()
    }
}

impl PythonParser {
    pub fn new() -> AstResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| AstError::ParserInit {
                language: Language::Python,
                reason: e.to_string(),
            })?;
        Ok(Self { parser })
    }

    fn walk(&self, node: Node, code: &str, ast: &mut Ast, depth: usize) -> AstResult<()> {
        if !check_recursion_depth(depth, node) {
            return Ok(());
        }

        match node.kind() {
            NODE_FUNCTION_DEFINITION => {
                let method = self.build_method_declaration(node, code)?;
                ast.method_declarations.push(method);
            }
            NODE_CLASS_DEFINITION => self.enter_class_definition(node, code, ast)?,
            NODE_CALL => {
                let call = self.build_method_call(node, code);
                ast.method_calls.push(call);
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, code, ast, depth + 1)?;
        }
        Ok(())
    }

    fn enter_class_definition(&self, node: Node, code: &str, ast: &mut Ast) -> AstResult<()> {
        let class_id = ClassId::new(ast.class_declarations.len());
        let class = self.build_class_definition(node, code, class_id)?;
        ast.class_declarations.push(class);
        Ok(())
    }

    fn build_class_definition(
        &self,
        node: Node,
        code: &str,
        class_id: ClassId,
    ) -> AstResult<ClassDeclaration> {
        let name = require_field(node, "name", "class identifier")?;
        let identifier = Span::of_token(&name, code);

        // PEP 695 type parameters, when the grammar exposes them
        let mut type_parameters = Vec::new();
        if let Some(params) = node.child_by_field_name("type_parameters") {
            let mut cursor = params.walk();
            for param in params.named_children(&mut cursor) {
                if param.kind() == NODE_COMMENT {
                    continue;
                }
                type_parameters.push(span_target(&param));
            }
        }

        // all base classes land in super_class; keyword arguments such as
        // `metaclass=...` are not bases
        let mut super_class = Vec::new();
        if let Some(bases) = node.child_by_field_name("superclasses") {
            let mut cursor = bases.walk();
            for base in bases.named_children(&mut cursor) {
                if matches!(base.kind(), NODE_KEYWORD_ARGUMENT | NODE_COMMENT) {
                    continue;
                }
                super_class.push(span_target(&base));
            }
        }

        let body = require_field(node, "body", "class body")?;
        let class_body = span_target(&body);

        let mut fields = Vec::new();
        let mut method_declarations = Vec::new();
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                NODE_FUNCTION_DEFINITION => {
                    let mut method = self.build_method_declaration(member, code)?;
                    method.class_declaration = Some(class_id);
                    method_declarations.push(method);
                }
                NODE_DECORATED_DEFINITION => {
                    if let Some(definition) = member.child_by_field_name("definition") {
                        if definition.kind() == NODE_FUNCTION_DEFINITION {
                            let mut method = self.build_method_declaration(definition, code)?;
                            method.class_declaration = Some(class_id);
                            method_declarations.push(method);
                        }
                    }
                }
                NODE_EXPRESSION_STATEMENT => {
                    if let Some(variable) = self.build_class_field(member, code) {
                        fields.push(variable);
                    }
                }
                _ => {}
            }
        }

        Ok(ClassDeclaration {
            target: Target::new(Some(identifier), Span::of_node(&node)),
            type_parameters,
            super_class,
            interfaces: Vec::new(),
            class_body,
            constructor_declarations: Vec::new(),
            fields,
            method_declarations,
        })
    }

    fn build_method_declaration(&self, node: Node, code: &str) -> AstResult<MethodDeclaration> {
        let name = require_field(node, "name", "function identifier")?;
        let identifier = Span::of_token(&name, code);

        let return_type = node
            .child_by_field_name("return_type")
            .map(|annotation| span_target(&annotation));

        let params = self.build_params(node, code)?;

        let body = require_field(node, "body", "function body")?;

        Ok(MethodDeclaration::new(
            Target::new(Some(identifier), Span::of_node(&node)),
            return_type,
            params,
            span_target(&body),
        ))
    }

    fn build_params(&self, node: Node, code: &str) -> AstResult<Vec<Variable>> {
        let list = require_field(node, "parameters", "parameter list")?;

        let mut params = Vec::new();
        let mut cursor = list.walk();
        for param in list.named_children(&mut cursor) {
            let span = Span::of_node(&param);
            match param.kind() {
                NODE_IDENTIFIER => {
                    params.push(Variable::new(
                        Target::new(Some(Span::of_token(&param, code)), span),
                        None,
                        None,
                    ));
                }
                "typed_parameter" => {
                    let identifier = param
                        .named_child(0)
                        .map(|name| Span::of_token(&name, code));
                    let ty = param
                        .child_by_field_name("type")
                        .map(|ty| span_target(&ty));
                    params.push(Variable::new(Target::new(identifier, span), ty, None));
                }
                "default_parameter" => {
                    let identifier = param
                        .child_by_field_name("name")
                        .map(|name| Span::of_token(&name, code));
                    let value = param
                        .child_by_field_name("value")
                        .map(|value| span_target(&value));
                    params.push(Variable::new(Target::new(identifier, span), None, value));
                }
                "typed_default_parameter" => {
                    let identifier = param
                        .child_by_field_name("name")
                        .map(|name| Span::of_token(&name, code));
                    let ty = param
                        .child_by_field_name("type")
                        .map(|ty| span_target(&ty));
                    let value = param
                        .child_by_field_name("value")
                        .map(|value| span_target(&value));
                    params.push(Variable::new(Target::new(identifier, span), ty, value));
                }
                "list_splat_pattern" | "dictionary_splat_pattern" => {
                    // *args / **kwargs
                    let identifier = param
                        .named_child(0)
                        .filter(|name| name.kind() == NODE_IDENTIFIER)
                        .map(|name| Span::of_token(&name, code));
                    params.push(Variable::new(Target::new(identifier, span), None, None));
                }
                // `/` and `*` separators, comments
                _ => {}
            }
        }
        Ok(params)
    }

    /// A class-level `name = value` / `name: type = value` statement.
    fn build_class_field(&self, statement: Node, code: &str) -> Option<Variable> {
        let assignment = statement.named_child(0)?;
        if assignment.kind() != NODE_ASSIGNMENT {
            return None;
        }
        let left = assignment.child_by_field_name("left")?;
        if left.kind() != NODE_IDENTIFIER {
            // tuple unpacking and attribute targets stay out of the model
            return None;
        }

        let ty = assignment
            .child_by_field_name("type")
            .map(|ty| span_target(&ty));
        let value = assignment
            .child_by_field_name("right")
            .map(|value| span_target(&value));

        Some(Variable::new(
            Target::new(
                Some(Span::of_token(&left, code)),
                Span::of_node(&assignment),
            ),
            ty,
            value,
        ))
    }

    fn build_method_call(&self, node: Node, code: &str) -> MethodCall {
        let identifier = node.child_by_field_name("function").and_then(|function| {
            match function.kind() {
                NODE_IDENTIFIER => Some(Span::of_token(&function, code)),
                NODE_ATTRIBUTE => function
                    .child_by_field_name("attribute")
                    .map(|attribute| Span::of_token(&attribute, code)),
                // subscripts, lambdas, nested calls: no name token to point at
                _ => None,
            }
        });

        let mut args = Vec::new();
        if let Some(list) = node.child_by_field_name("arguments") {
            if list.kind() == NODE_ARGUMENT_LIST {
                let mut cursor = list.walk();
                for arg in list.named_children(&mut cursor) {
                    if arg.kind() == NODE_COMMENT {
                        continue;
                    }
                    args.push(span_target(&arg));
                }
            } else {
                // `f(x for x in xs)`: the generator is the single argument
                args.push(span_target(&list));
            }
        }

        MethodCall::new(Target::new(identifier, Span::of_node(&node)), args)
    }
}

impl LanguageParser for PythonParser {
    fn extract(&mut self, code: &str, ast: &mut Ast) -> AstResult<()> {
        let tree = self.parser.parse(code, None).ok_or(AstError::Parse {
            language: Language::Python,
        })?;
        self.walk(tree.root_node(), code, ast, 0)
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

fn span_target(node: &Node) -> Target {
    let span = Span::of_node(node);
    Target::new(Some(span), span)
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

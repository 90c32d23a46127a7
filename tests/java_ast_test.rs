//! End-to-end extraction tests over Java sources.

use codetarget::{Ast, AstError, ClassId, Document, Language, Settings, Target};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

async fn parse_java(source: &str) -> Ast {
    let mut ast = Ast::new(Document::new(Language::Java, source));
    ast.parse().await.unwrap();
    ast
}

#[tokio::test]
async fn class_with_method_links_back_reference() {
    let ast = parse_java("class Foo { void bar() {} }").await;

    assert_eq!(ast.class_declarations.len(), 1);
    let class = &ast.class_declarations[0];
    assert_eq!(class.target.identifier_text(&ast.document), Some("Foo"));
    assert_eq!(class.method_declarations.len(), 1);
    assert_eq!(
        class.method_declarations[0].class_declaration,
        Some(ClassId::new(0))
    );

    // the same declaration also lands standalone and is linked by span
    assert_eq!(ast.method_declarations.len(), 1);
    assert_eq!(
        ast.method_declarations[0].class_declaration,
        Some(ClassId::new(0))
    );
    assert_eq!(
        ast.method_declarations[0].target,
        class.method_declarations[0].target
    );
}

#[tokio::test]
async fn positions_are_zero_based_and_end_exclusive() {
    let ast = parse_java("class Foo { void bar() {} }").await;

    let class = &ast.class_declarations[0];
    assert_eq!(class.target.start.line, 0);
    assert_eq!(class.target.start.column, 0);
    assert_eq!(class.target.end.column, 27);

    let identifier = class.target.identifier.unwrap();
    assert_eq!(identifier.start.column, 6);
    assert_eq!(identifier.end.column, 9);

    let method = &class.method_declarations[0];
    assert_eq!(method.target.identifier.unwrap().start.column, 17);
    assert_eq!(method.target.identifier.unwrap().end.column, 20);
    assert_eq!(
        method.return_type.as_ref().unwrap().text(&ast.document),
        Some("void")
    );
    assert_eq!(method.body.text(&ast.document), Some("{}"));
}

#[tokio::test]
async fn constructor_with_typed_parameter() {
    let ast = parse_java("class Foo { Foo(int x) {} }").await;

    let class = &ast.class_declarations[0];
    assert_eq!(class.constructor_declarations.len(), 1);
    let constructor = &class.constructor_declarations[0];
    assert_eq!(constructor.class_declaration, Some(ClassId::new(0)));
    assert_eq!(constructor.params.len(), 1);

    let param = &constructor.params[0];
    assert_eq!(param.target.identifier_text(&ast.document), Some("x"));
    assert_eq!(
        param.ty.as_ref().unwrap().text(&ast.document),
        Some("int")
    );
}

#[tokio::test]
async fn method_call_collects_argument_targets() {
    let source = "class T {\n    void f() {\n        g(1, 2);\n    }\n}\n";
    let ast = parse_java(source).await;

    assert_eq!(ast.method_calls.len(), 1);
    let call = &ast.method_calls[0];
    assert_eq!(call.target.identifier_text(&ast.document), Some("g"));
    assert_eq!(call.args.len(), 2);
    assert_eq!(call.args[0].text(&ast.document), Some("1"));
    assert_eq!(call.args[1].text(&ast.document), Some("2"));
}

#[tokio::test]
async fn nested_calls_are_extracted_in_pre_order() {
    let source = "class T {\n    void f() {\n        g(h(1), 2);\n    }\n}\n";
    let ast = parse_java(source).await;

    assert_eq!(ast.method_calls.len(), 2);
    assert_eq!(
        ast.method_calls[0].target.identifier_text(&ast.document),
        Some("g")
    );
    assert_eq!(ast.method_calls[0].args.len(), 2);
    assert_eq!(
        ast.method_calls[1].target.identifier_text(&ast.document),
        Some("h")
    );
    assert_eq!(ast.method_calls[1].args.len(), 1);
}

#[tokio::test]
async fn explicit_constructor_invocations_stay_anonymous() {
    let source = "class A {\n    A() { this(1); }\n    A(int x) { super(); }\n}\n";
    let ast = parse_java(source).await;

    assert_eq!(ast.method_calls.len(), 2);
    assert!(ast.method_calls[0].target.identifier.is_none());
    assert_eq!(ast.method_calls[0].args.len(), 1);
    assert!(ast.method_calls[1].target.identifier.is_none());
    assert_eq!(ast.method_calls[1].args.len(), 0);
}

#[tokio::test]
async fn field_initializer_value_span() {
    let ast = parse_java("class A { int x = 5; }").await;

    let class = &ast.class_declarations[0];
    assert_eq!(class.fields.len(), 1);
    let field = &class.fields[0];
    assert_eq!(field.target.identifier_text(&ast.document), Some("x"));
    assert_eq!(field.ty.as_ref().unwrap().text(&ast.document), Some("int"));
    assert_eq!(
        field.value.as_ref().unwrap().text(&ast.document),
        Some("5")
    );
}

#[tokio::test]
async fn multi_declarator_field_is_flattened() {
    let ast = parse_java("class A { int a, b; }").await;

    let class = &ast.class_declarations[0];
    assert_eq!(class.fields.len(), 2);
    assert_eq!(class.fields[0].ty, class.fields[1].ty);
    assert_ne!(
        class.fields[0].target.identifier,
        class.fields[1].target.identifier
    );
    assert_eq!(
        class.fields[0].target.identifier_text(&ast.document),
        Some("a")
    );
    assert_eq!(
        class.fields[1].target.identifier_text(&ast.document),
        Some("b")
    );
    assert!(class.fields[0].value.is_none());
}

#[tokio::test]
async fn class_header_clauses() {
    let source =
        "class Foo<T, U> extends Bar implements Baz, Qux {\n    Foo() {}\n    void m(String s) {}\n    int x = 1;\n}\n";
    let ast = parse_java(source).await;

    let class = &ast.class_declarations[0];
    assert_eq!(class.type_parameters.len(), 2);
    assert_eq!(class.super_class.len(), 1);
    assert_eq!(class.super_class[0].text(&ast.document), Some("Bar"));
    assert_eq!(class.interfaces.len(), 2);
    assert_eq!(class.interfaces[0].text(&ast.document), Some("Baz"));
    assert_eq!(class.interfaces[1].text(&ast.document), Some("Qux"));
    assert_eq!(class.constructor_declarations.len(), 1);
    assert_eq!(class.method_declarations.len(), 1);
    assert_eq!(class.fields.len(), 1);
    assert!(class
        .class_body
        .text(&ast.document)
        .unwrap()
        .starts_with('{'));
}

#[tokio::test]
async fn plain_class_has_no_header_clauses() {
    let ast = parse_java("class A {}").await;

    let class = &ast.class_declarations[0];
    assert!(class.type_parameters.is_empty());
    assert!(class.super_class.is_empty());
    assert!(class.interfaces.is_empty());
}

#[tokio::test]
async fn abstract_method_body_is_the_semicolon() {
    let ast = parse_java("abstract class A { abstract void f(); }").await;

    let class = &ast.class_declarations[0];
    assert_eq!(class.method_declarations.len(), 1);
    assert_eq!(
        class.method_declarations[0].body.text(&ast.document),
        Some(";")
    );
}

#[tokio::test]
async fn nested_class_members_link_to_inner_class() {
    let source = "class Outer {\n    void a() {}\n    class Inner {\n        void b() {}\n    }\n}\n";
    let ast = parse_java(source).await;

    assert_eq!(ast.class_declarations.len(), 2);
    let outer = &ast.class_declarations[0];
    let inner = &ast.class_declarations[1];
    assert_eq!(outer.target.identifier_text(&ast.document), Some("Outer"));
    assert_eq!(inner.target.identifier_text(&ast.document), Some("Inner"));

    // body classification stops at nested types
    assert_eq!(outer.method_declarations.len(), 1);
    assert_eq!(inner.method_declarations.len(), 1);

    assert_eq!(ast.method_declarations.len(), 2);
    assert_eq!(
        ast.method_declarations[0].class_declaration,
        Some(ClassId::new(0))
    );
    assert_eq!(
        ast.method_declarations[1].class_declaration,
        Some(ClassId::new(1))
    );
}

#[tokio::test]
async fn reparse_replaces_all_entities() {
    let mut ast = Ast::new(Document::new(Language::Java, "class A { void old() {} }"));
    ast.parse().await.unwrap();
    assert_eq!(ast.class_declarations.len(), 1);
    assert_eq!(ast.method_declarations.len(), 1);

    ast.document = Document::new(Language::Java, "class B {}");
    ast.parse().await.unwrap();

    assert_eq!(ast.class_declarations.len(), 1);
    assert_eq!(
        ast.class_declarations[0]
            .target
            .identifier_text(&ast.document),
        Some("B")
    );
    assert!(ast.method_declarations.is_empty());
    assert!(ast.method_calls.is_empty());
}

#[tokio::test]
async fn abort_rejects_before_walking() {
    let mut ast = Ast::new(Document::new(Language::Java, "class A { void f() {} }"));

    let cancel = CancellationToken::new();
    let parse = ast.parse_cancellable(&cancel);
    cancel.cancel();

    let err = parse.await.unwrap_err();
    assert!(matches!(err, AstError::Aborted));
    assert!(ast.class_declarations.is_empty());
}

#[tokio::test]
async fn disabled_language_rejects_parse() {
    let mut settings = Settings::default();
    settings.languages.get_mut("java").unwrap().enabled = false;

    let mut ast = Ast::with_settings(
        Document::new(Language::Java, "class A {}"),
        Arc::new(settings),
    );
    let err = ast.parse().await.unwrap_err();
    assert!(matches!(err, AstError::LanguageDisabled(Language::Java)));
}

#[tokio::test]
async fn linking_is_idempotent_after_parse() {
    let mut ast = parse_java("class A { void f() {} void g() {} }").await;

    let first: Vec<_> = ast
        .method_declarations
        .iter()
        .map(|m| m.class_declaration)
        .collect();
    ast.link_members();
    let second: Vec<_> = ast
        .method_declarations
        .iter()
        .map(|m| m.class_declaration)
        .collect();
    assert_eq!(first, second);
    assert!(first.iter().all(|link| *link == Some(ClassId::new(0))));
}

/// Every target produced from a realistic source keeps its span ordered and
/// its identifier inside the span.
#[tokio::test]
async fn all_targets_are_well_formed() {
    let source = r#"
class Test {
    Printer printer = new Printer();

    public static void main(String[] args) {
        printHello();
        Printer p = new Printer();
        p.print("What's up?");
        p.printMultiple("text1", "text2");
    }

    private static void printHello() {
        System.out.println("Hello");
    }

    static class Printer {
        public Printer() {}

        public void print(String text) {
            System.out.println(text);
        }

        public void printMultiple(String text1, String text2) {
            System.out.println(text1 + text2);
        }
    }
}
"#;
    let ast = parse_java(source).await;
    assert_eq!(ast.class_declarations.len(), 2);
    assert!(ast.method_calls.len() >= 5);

    for target in collect_targets(&ast) {
        assert!(
            target.start <= target.end,
            "span out of order: {target:?}"
        );
        if let Some(identifier) = &target.identifier {
            assert!(
                target.span().contains(identifier),
                "identifier outside span: {target:?}"
            );
        }
    }
}

fn collect_targets(ast: &Ast) -> Vec<&Target> {
    let mut targets = Vec::new();

    for class in &ast.class_declarations {
        targets.push(&class.target);
        targets.extend(class.type_parameters.iter());
        targets.extend(class.super_class.iter());
        targets.extend(class.interfaces.iter());
        targets.push(&class.class_body);
        for field in &class.fields {
            targets.push(&field.target);
            targets.extend(field.ty.iter());
            targets.extend(field.value.iter());
        }
        for constructor in &class.constructor_declarations {
            targets.push(&constructor.target);
            targets.push(&constructor.body);
            for param in &constructor.params {
                targets.push(&param.target);
                targets.extend(param.ty.iter());
            }
        }
        for method in &class.method_declarations {
            targets.push(&method.target);
            targets.extend(method.return_type.iter());
            targets.push(&method.body);
            for param in &method.params {
                targets.push(&param.target);
                targets.extend(param.ty.iter());
            }
        }
    }
    for method in &ast.method_declarations {
        targets.push(&method.target);
        targets.extend(method.return_type.iter());
        targets.push(&method.body);
        for param in &method.params {
            targets.push(&param.target);
            targets.extend(param.ty.iter());
        }
    }
    for call in &ast.method_calls {
        targets.push(&call.target);
        targets.extend(call.args.iter());
    }
    targets
}

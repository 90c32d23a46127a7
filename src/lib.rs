pub mod ast;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod model;
pub mod parsing;
pub mod types;

pub use ast::Ast;
pub use config::Settings;
pub use document::Document;
pub use error::{AstError, AstResult};
pub use model::{
    ClassDeclaration, ClassId, ConstructorDeclaration, MethodCall, MethodDeclaration, Target,
    Variable,
};
pub use parsing::{JavaParser, Language, LanguageParser, ParserFactory, PythonParser};
pub use types::{Position, Span};

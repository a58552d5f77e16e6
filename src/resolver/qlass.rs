use std::rc::Rc;

use tracing::debug;

use crate::cursor::Cursor;
use crate::error::{ParseError, SqrError};
use crate::resolver::declaration::Declaration;
use crate::resolver::structure;
use crate::runtime::funqtion::{Body, Funqtion};
use crate::runtime::qlass::{FieldDecl, Qlass};
use crate::runtime::qontext::QontextRef;
use crate::runtime::value::Value;
use crate::runtime::variable::Variable;
use crate::runtime::Runtime;
use crate::symbols::{KeywordKind, OperatorKind, StructureKind};
use crate::token::{Token, TokenKind, TokenValue};

impl Runtime {
    /// `qlass Name { fields and methods }` with the `qlass` keyword already
    /// digested. The qlass joins the type registry and binds its handle in
    /// the qontext, so `Name` works both as a type and as a value.
    pub(crate) fn resolve_qlass(
        &self,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
    ) -> Result<Declaration, SqrError> {
        let name_token = tokens.digest()?;
        if name_token.kind != TokenKind::Identifier {
            return Err(ParseError::ExpectedIdentifier {
                raw: name_token.raw.clone(),
                row: name_token.row,
                col: name_token.col,
            }
            .into());
        }
        let name = name_token.raw.clone();

        let inner = structure::extract(tokens, StructureKind::Body)?;
        let mut members = Cursor::new(inner);
        let mut fields = Vec::new();
        let mut methods = Vec::new();

        while !members.done() {
            let token = members.digest()?;
            if token.kind == TokenKind::End {
                continue;
            }
            match member_kind(&token) {
                Some(MemberKind::Field { type_name, readonly }) => {
                    fields.push(self.resolve_field(type_name, readonly, &mut members)?);
                }
                Some(MemberKind::Method) => {
                    let method_name = members.digest()?;
                    if method_name.kind != TokenKind::Identifier {
                        return Err(ParseError::ExpectedIdentifier {
                            raw: method_name.raw.clone(),
                            row: method_name.row,
                            col: method_name.col,
                        }
                        .into());
                    }
                    let funqtion: Funqtion = self.resolve_funqtion(
                        Some(method_name.raw.clone()),
                        &mut members,
                        qontext,
                        None,
                    )?;
                    methods.push((method_name.raw.clone(), funqtion));
                }
                None => {
                    return Err(ParseError::UnexpectedToken {
                        raw: token.raw.clone(),
                        row: token.row,
                        col: token.col,
                    }
                    .into())
                }
            }
        }

        debug!(
            "qlass {} with {} fields, {} methods",
            name,
            fields.len(),
            methods.len()
        );
        let qlass = Rc::new(Qlass {
            name: name.clone(),
            native: false,
            fields,
            methods,
            statics: Vec::new(),
        });
        self.types.register(Rc::clone(&qlass))?;

        let variable = Variable::typed(Value::Void, None, true);
        variable.set(Value::Qlass(qlass))?;
        qontext.borrow_mut().register(&name, variable.clone())?;
        Ok(Declaration { name, variable })
    }

    /// `[var|const|@Type] name [= init tokens];` with the leading keyword
    /// already digested. The initializer stays unresolved so every spawn
    /// evaluates it fresh.
    fn resolve_field(
        &self,
        type_name: Option<String>,
        readonly: bool,
        members: &mut Cursor<Token>,
    ) -> Result<FieldDecl, SqrError> {
        let name_token = members.digest()?;
        if name_token.kind != TokenKind::Identifier {
            return Err(ParseError::ExpectedIdentifier {
                raw: name_token.raw.clone(),
                row: name_token.row,
                col: name_token.col,
            }
            .into());
        }

        let mut init = None;
        let assigns = members
            .peek()
            .and_then(Token::operator)
            .is_some_and(|op| op.kind == OperatorKind::Assign);
        if assigns {
            members.digest()?;
            let tokens = members.digest_while(|t| t.kind != TokenKind::End);
            init = Some(Body::new(tokens));
        }
        Ok(FieldDecl {
            name: name_token.raw.clone(),
            type_name,
            readonly,
            init,
        })
    }
}

enum MemberKind {
    Field {
        type_name: Option<String>,
        readonly: bool,
    },
    Method,
}

fn member_kind(token: &Token) -> Option<MemberKind> {
    match &token.value {
        TokenValue::Type(type_name) => Some(MemberKind::Field {
            type_name: Some(type_name.clone()),
            readonly: false,
        }),
        TokenValue::Keyword(keyword) => match keyword.kind {
            KeywordKind::DeclareDyn => Some(MemberKind::Field {
                type_name: None,
                readonly: false,
            }),
            KeywordKind::DeclareConst => Some(MemberKind::Field {
                type_name: None,
                readonly: true,
            }),
            KeywordKind::DeclareFunqtion => Some(MemberKind::Method),
            _ => None,
        },
        _ => None,
    }
}

use std::rc::Rc;

use tracing::trace;

use crate::cursor::Cursor;
use crate::error::{NameError, ParseError, SqrError};
use crate::runtime::funqtion::Qallable;
use crate::runtime::qontext::QontextRef;
use crate::runtime::value::Value;
use crate::runtime::variable::Variable;
use crate::runtime::Runtime;
use crate::symbols::{KeywordKind, OperatorKind};
use crate::token::{Token, TokenKind, TokenValue};

/// The outcome of a declaration statement: the binding is already
/// registered in the qontext by the time this is returned.
pub(crate) struct Declaration {
    pub name: String,
    pub variable: Variable,
}

impl Runtime {
    /// `keyword` is the already digested declaration keyword (or `@Type`)
    /// token. Registration happens here, at resolve time, which is what
    /// makes re-resolving a body with declarations in a loop work: each
    /// iteration runs in a fresh child qontext.
    pub(crate) fn resolve_declaration(
        &self,
        keyword: &Token,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
    ) -> Result<Declaration, SqrError> {
        let (kind, declared_type) = match &keyword.value {
            TokenValue::Type(type_name) => {
                (KeywordKind::DeclareTyped, Some(self.types.resolve(type_name)?))
            }
            TokenValue::Keyword(k) if k.kind.is_declaration() => (k.kind, None),
            _ => {
                return Err(ParseError::UnexpectedKeyword {
                    raw: keyword.raw.clone(),
                    row: keyword.row,
                    col: keyword.col,
                }
                .into())
            }
        };

        let is_reference = tokens
            .peek()
            .and_then(Token::operator)
            .is_some_and(|op| op.kind == OperatorKind::Reference);
        if is_reference {
            tokens.digest()?;
        }

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
        trace!("declaring {} ({:?})", name, kind);

        let variable = if kind == KeywordKind::DeclareFunqtion {
            let funqtion = self.resolve_funqtion(Some(name.clone()), tokens, qontext, None)?;
            Variable::new(Value::Qallable(Rc::new(Qallable::Funqtion(funqtion))))
        } else if is_reference {
            // `var& b = a` aliases a's cell instead of copying its value.
            self.resolve_reference_target(&name, tokens, qontext)?
        } else {
            Variable::typed(
                Value::Void,
                declared_type,
                kind == KeywordKind::DeclareConst,
            )
        };

        qontext.borrow_mut().register(&name, variable.clone())?;
        Ok(Declaration { name, variable })
    }

    fn resolve_reference_target(
        &self,
        name: &str,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
    ) -> Result<Variable, SqrError> {
        let missing = || {
            SqrError::from(ParseError::ReferenceWithoutTarget {
                name: name.to_string(),
            })
        };
        let assign = tokens.digest().map_err(|_| missing())?;
        if assign.operator().map(|op| op.kind) != Some(OperatorKind::Assign) {
            return Err(missing());
        }
        let target = tokens.digest().map_err(|_| missing())?;
        if target.kind != TokenKind::Identifier {
            return Err(missing());
        }
        let source = qontext
            .borrow()
            .lookup(&target.raw)
            .ok_or(NameError::Unresolved {
                name: target.raw.clone(),
                row: target.row,
                col: target.col,
            })?;
        Ok(source.alias())
    }
}

//! Literal collection resolvers. Elements and entry values are evaluated
//! eagerly, at resolve time, in source order.

use crate::cursor::Cursor;
use crate::error::{ParseError, SqrError};
use crate::resolver::structure;
use crate::runtime::qontext::QontextRef;
use crate::runtime::value::{Objeqt, Qollection, Value};
use crate::runtime::variable::Variable;
use crate::runtime::Runtime;
use crate::symbols::{OperatorKind, StructureKind};
use crate::token::{Token, TokenKind};

impl Runtime {
    /// `[a, b, c]` with the cursor on the opening bracket.
    pub(crate) fn resolve_qollection_literal(
        &self,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
    ) -> Result<Value, SqrError> {
        let inner = structure::extract(tokens, StructureKind::Qollection)?;
        let mut qollection = Qollection::new();
        for segment in structure::split_separated(inner) {
            qollection.push(self.evaluate_tokens(segment, qontext)?);
        }
        Ok(Value::qollection(qollection))
    }

    /// `{ key: value, .. }` with the cursor on the opening brace. Keys are
    /// identifiers or string literals.
    pub(crate) fn resolve_objeqt_literal(
        &self,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
    ) -> Result<Value, SqrError> {
        let inner = structure::extract(tokens, StructureKind::Body)?;
        let mut objeqt = Objeqt::new();
        for segment in structure::split_separated(inner) {
            let mut entry = Cursor::new(segment);
            let key_token = entry.digest()?;
            let key = match key_token.kind {
                TokenKind::Identifier | TokenKind::String => key_token.raw.clone(),
                _ => return Err(malformed(&key_token)),
            };
            let accessor = entry.digest().map_err(|_| malformed(&key_token))?;
            if accessor.operator().map(|op| op.kind) != Some(OperatorKind::Accessor) {
                return Err(malformed(&accessor));
            }
            let rest = entry.digest_while(|_| true);
            let value = self.evaluate_tokens(rest, qontext)?;
            objeqt.insert(key, Variable::new(value));
        }
        Ok(Value::objeqt(objeqt))
    }

    /// A trailing `(a, b, ..)` call-argument list, evaluated left to right.
    pub(crate) fn resolve_arguments(
        &self,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
    ) -> Result<Vec<Value>, SqrError> {
        let inner = structure::extract(tokens, StructureKind::Group)?;
        structure::split_separated(inner)
            .into_iter()
            .map(|segment| self.evaluate_tokens(segment, qontext))
            .collect()
    }
}

fn malformed(token: &Token) -> SqrError {
    ParseError::MalformedEntry {
        row: token.row,
        col: token.col,
    }
    .into()
}

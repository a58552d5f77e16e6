/// A resolved keyword token value. The canonical symbol is kept for
/// diagnostics; alias lookup happens in [`Keywords`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyword {
    pub kind: KeywordKind,
    pub symbol: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    DeclareDyn,
    DeclareTyped,
    DeclareConst,
    DeclareFunqtion,
    DeclareQlass,
    FunqtionInline,
    FunqtionReturn,
    InstanceCreate,
    Export,
    Import,
    QonditionIf,
    QonditionElse,
    LoopFor,
    LoopWhile,
    LoopDo,
    LoopBreak,
    LoopContinue,
}

impl KeywordKind {
    /// Any keyword that starts a declaration statement.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            KeywordKind::DeclareDyn
                | KeywordKind::DeclareTyped
                | KeywordKind::DeclareConst
                | KeywordKind::DeclareFunqtion
                | KeywordKind::DeclareQlass
        )
    }

    /// Any keyword that starts a qondition: a branch or a loop.
    pub fn is_qondition(self) -> bool {
        matches!(
            self,
            KeywordKind::QonditionIf
                | KeywordKind::LoopFor
                | KeywordKind::LoopWhile
                | KeywordKind::LoopDo
        )
    }
}

#[derive(Debug)]
pub struct Keywords {
    entries: Vec<(Keyword, Vec<&'static str>)>,
}

impl Keywords {
    pub fn new() -> Self {
        let mut keywords = Self {
            entries: Vec::new(),
        };
        keywords.register(KeywordKind::DeclareDyn, "var", &[]);
        keywords.register(KeywordKind::DeclareTyped, "@", &[]);
        keywords.register(KeywordKind::DeclareConst, "const", &[]);
        keywords.register(KeywordKind::DeclareFunqtion, "funqtion", &["funq", "fn"]);
        keywords.register(KeywordKind::DeclareQlass, "qlass", &[]);
        keywords.register(KeywordKind::FunqtionInline, "inline", &[]);
        keywords.register(KeywordKind::FunqtionReturn, "return", &[]);
        keywords.register(KeywordKind::InstanceCreate, "new", &["spawn"]);
        keywords.register(KeywordKind::Export, "export", &[]);
        keywords.register(KeywordKind::Import, "import", &[]);
        keywords.register(KeywordKind::QonditionIf, "if", &[]);
        keywords.register(KeywordKind::QonditionElse, "else", &[]);
        keywords.register(KeywordKind::LoopFor, "for", &[]);
        keywords.register(KeywordKind::LoopWhile, "while", &[]);
        keywords.register(KeywordKind::LoopDo, "do", &[]);
        keywords.register(KeywordKind::LoopBreak, "break", &[]);
        keywords.register(KeywordKind::LoopContinue, "continue", &[]);
        keywords
    }

    fn register(&mut self, kind: KeywordKind, symbol: &'static str, aliases: &[&'static str]) {
        let mut all = vec![symbol];
        all.extend_from_slice(aliases);
        self.entries.push((Keyword { kind, symbol }, all));
    }

    /// Alias-aware lookup. A symbol beginning with `@` unconditionally
    /// denotes the typed-declaration keyword.
    pub fn get(&self, symbol: &str) -> Option<Keyword> {
        if symbol.starts_with('@') {
            return self.get_kind(KeywordKind::DeclareTyped);
        }
        self.entries
            .iter()
            .find(|(_, aliases)| aliases.contains(&symbol))
            .map(|(keyword, _)| *keyword)
    }

    pub fn get_kind(&self, kind: KeywordKind) -> Option<Keyword> {
        self.entries
            .iter()
            .find(|(keyword, _)| keyword.kind == kind)
            .map(|(keyword, _)| *keyword)
    }
}

impl Default for Keywords {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_alias_lookup() {
        let keywords = Keywords::new();
        assert_eq!(
            keywords.get("fn").map(|k| k.kind),
            Some(KeywordKind::DeclareFunqtion)
        );
        assert_eq!(
            keywords.get("funqtion").map(|k| k.kind),
            Some(KeywordKind::DeclareFunqtion)
        );
        assert_eq!(keywords.get("nope"), None);
    }

    #[test]
    fn test_at_sigil_is_typed_declaration() {
        let keywords = Keywords::new();
        assert_eq!(
            keywords.get("@Number").map(|k| k.kind),
            Some(KeywordKind::DeclareTyped)
        );
    }

    #[test]
    fn test_category_predicates() {
        assert!(KeywordKind::DeclareQlass.is_declaration());
        assert!(!KeywordKind::FunqtionReturn.is_declaration());
        assert!(KeywordKind::LoopWhile.is_qondition());
        assert!(!KeywordKind::QonditionElse.is_qondition());
    }
}

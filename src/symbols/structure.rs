/// A paired delimiter with a semantic kind. The separator is the odd one
/// out: it opens and closes with the same symbol and never nests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Structure {
    pub kind: StructureKind,
    pub open: char,
    pub close: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    /// `( )` — grouping, or a trailing call-argument list after a value.
    Group,
    /// `[ ]` — qollection literal.
    Qollection,
    /// `{ }` — funqtion/control body, or an objeqt literal in value position.
    Body,
    /// `,` — element separator inside the other three.
    Separator,
}

#[derive(Debug)]
pub struct Structures {
    entries: [Structure; 4],
}

impl Structures {
    pub fn new() -> Self {
        Self {
            entries: [
                Structure {
                    kind: StructureKind::Group,
                    open: '(',
                    close: ')',
                },
                Structure {
                    kind: StructureKind::Qollection,
                    open: '[',
                    close: ']',
                },
                Structure {
                    kind: StructureKind::Body,
                    open: '{',
                    close: '}',
                },
                Structure {
                    kind: StructureKind::Separator,
                    open: ',',
                    close: ',',
                },
            ],
        }
    }

    pub fn get(&self, raw: &str) -> Option<Structure> {
        let mut chars = raw.chars();
        let (first, rest) = (chars.next()?, chars.next());
        if rest.is_some() {
            return None;
        }
        self.entries
            .iter()
            .find(|s| s.open == first || s.close == first)
            .copied()
    }
}

impl Default for Structures {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lookup_by_open_and_close() {
        let structures = Structures::new();
        assert_eq!(structures.get("(").unwrap().kind, StructureKind::Group);
        assert_eq!(structures.get(")").unwrap().kind, StructureKind::Group);
        assert_eq!(structures.get("]").unwrap().kind, StructureKind::Qollection);
        assert_eq!(structures.get(",").unwrap().kind, StructureKind::Separator);
        assert_eq!(structures.get("(("), None);
        assert_eq!(structures.get("."), None);
    }
}

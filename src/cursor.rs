use std::rc::Rc;

use crate::error::SqrError;

/// Index-based forward scanner over a fixed buffer. The lexer drives a
/// `Cursor<char>`, the resolver a `Cursor<Token>`; neither ever backtracks.
#[derive(Debug, Clone)]
pub struct Cursor<T> {
    items: Rc<[T]>,
    index: usize,
}

impl<T: Clone> Cursor<T> {
    pub fn new(items: impl Into<Rc<[T]>>) -> Self {
        Self {
            items: items.into(),
            index: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn done(&self) -> bool {
        self.index >= self.items.len()
    }

    /// Bounds-safe lookahead. Out-of-range offsets yield `None` rather than
    /// trapping.
    pub fn peek(&self) -> Option<&T> {
        self.peek_at(0)
    }

    pub fn peek_at(&self, delta: usize) -> Option<&T> {
        self.items.get(self.index + delta)
    }

    /// Consumes and returns the current item, or `EndOfInput` when the
    /// buffer is exhausted.
    pub fn digest(&mut self) -> Result<T, SqrError> {
        let item = self.items.get(self.index).ok_or(SqrError::EndOfInput)?;
        self.index += 1;
        Ok(item.clone())
    }

    /// Consumes items while `predicate` holds. Stops quietly at end of
    /// input; exhaustion is expected here, not an error.
    pub fn digest_while(&mut self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let mut buffer = Vec::new();
        while let Some(item) = self.peek() {
            if !predicate(item) {
                break;
            }
            buffer.push(item.clone());
            self.index += 1;
        }
        buffer
    }
}

impl<T: Clone + PartialEq> Cursor<T> {
    /// Consumes up to (not including) the first item equal to `stop`.
    pub fn digest_until(&mut self, stop: &T) -> Vec<T> {
        self.digest_while(|item| item != stop)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_peek_does_not_advance() {
        let cursor = Cursor::new(vec![1, 2, 3]);
        assert_eq!(cursor.peek(), Some(&1));
        assert_eq!(cursor.peek(), Some(&1));
        assert_eq!(cursor.peek_at(2), Some(&3));
        assert_eq!(cursor.peek_at(3), None);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_digest_advances_and_fails_at_end() {
        let mut cursor = Cursor::new(vec!['a', 'b']);
        assert_eq!(cursor.digest().unwrap(), 'a');
        assert_eq!(cursor.digest().unwrap(), 'b');
        assert!(cursor.done());
        assert!(matches!(cursor.digest(), Err(SqrError::EndOfInput)));
    }

    #[test]
    fn test_digest_until_stops_before_match() {
        let mut cursor = Cursor::new(vec![1, 2, 3, 4]);
        assert_eq!(cursor.digest_until(&3), vec![1, 2]);
        assert_eq!(cursor.peek(), Some(&3));
    }

    #[test]
    fn test_digest_while_survives_exhaustion() {
        let mut cursor = Cursor::new(vec![2, 4, 6]);
        assert_eq!(cursor.digest_while(|n| n % 2 == 0), vec![2, 4, 6]);
        assert!(cursor.done());
    }
}

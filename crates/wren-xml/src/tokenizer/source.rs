use std::vec;

use crate::error::TokenizeError;

use super::token::Token;

/// A pull-based reader producing one structural event per call.
///
/// `Ok(None)` signals end of input. After an error or `Ok(None)` callers stop
/// pulling.
pub trait TokenSource {
    /// Advance to the next token.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying markup cannot be recovered.
    fn next_token(&mut self) -> Result<Option<Token>, TokenizeError>;
}

/// A pre-scripted token stream, used to drive the builder directly.
impl TokenSource for vec::IntoIter<Token> {
    fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        Ok(self.next())
    }
}

//! Token model and the lookahead buffer the parser reads through.

pub mod token;
pub mod token_stream;

pub use token::{Keyword, RelationalOperator, SpannedToken, Token};
pub use token_stream::TokenStream;

//! Query parsing and canonical rendering for solrq.
//!
//! This crate turns a human-authored search expression into the fully parenthesized canonical
//! form consumed by the index query layer:
//!
//! - **Terms**: `web01` - bare words, with `\` escaping reserved characters
//! - **Phrases**: `"two words"` - quoted strings
//! - **Binary chains**: `a AND b OR c` - right-associative, `&&`/`||` accepted
//! - **Prefixes**: `+req`, `-prohibited`, `NOT x`, `!x`
//! - **Fields**: `role:web`, `tags:(a b)`
//! - **Ranges**: `ohai_time:[100 TO *]`, `n:{1 TO 5}`
//! - **Proximity and boosting**: `"a b"~10`, `word~`, `word^2.5`
//! - **Grouping**: `(a b) OR c`
//!
//! # Example
//!
//! ```
//! use solrq_query::transform;
//!
//! let canonical = transform("t1 AND t2").unwrap();
//! assert_eq!(canonical, "((OP:AND T:t1 (T:t2)))");
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod limits;
mod parser;
mod render;
mod transform;

pub use ast::{
    BinaryOp, Bound, Chain, ChainLinks, Clause, ClauseList, Number, Operand, PrefixKind,
};
pub use error::{ErrorKind, LexError, ParseError, QueryError};
pub use lexer::{Token, TokenKind, tokenize};
pub use limits::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_QUERY_LEN, Limits};
pub use parser::{parse, parse_with_limits};
pub use render::{render, render_clause, render_list};
pub use transform::{parse_query, parse_query_with_limits, transform, transform_with_limits};

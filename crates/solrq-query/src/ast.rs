//! Query abstract syntax tree.
//!
//! Each node owns its children outright; the tree is built once by the parser and only read
//! afterwards.

use std::fmt;

use serde::{Serialize, Serializer, ser::SerializeStruct};

/// A binary operator joining a clause to the rest of its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    /// `AND` or `&&`.
    And,
    /// `OR` or `||`.
    Or,
}

impl BinaryOp {
    /// Returns the canonical operator name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A unary modifier bound to exactly one clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrefixKind {
    /// Required (`+`).
    Plus,
    /// Prohibited (`-`).
    Minus,
    /// Negated (`NOT` or `!`).
    Not,
}

impl PrefixKind {
    /// Returns the canonical operator name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Not => "NOT",
        }
    }
}

/// An unsigned decimal argument, kept in its source spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Number(String);

impl Number {
    /// Parses an unsigned decimal (`10`, `0.5`). Returns `None` for anything else.
    pub fn parse(text: &str) -> Option<Self> {
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (text, None),
        };
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if digits(whole) && fraction.is_none_or(digits) {
            Some(Self(text.to_string()))
        } else {
            None
        }
    }

    /// Returns the number as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One end of a range clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Bound {
    /// A literal bound value.
    Value(String),
    /// The open-ended wildcard `*`.
    Wildcard,
}

impl Bound {
    /// Returns the bound as it appears in the canonical form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Value(v) => v,
            Self::Wildcard => "*",
        }
    }
}

/// The clause a proximity or boost operator applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Operand {
    /// A bare term.
    Term(String),
    /// A quoted phrase, quotes included.
    Phrase(String),
}

impl From<Operand> for Clause {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Term(text) => Self::Term(text),
            Operand::Phrase(text) => Self::Phrase(text),
        }
    }
}

/// A single node of a parsed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Clause {
    /// A bare word; escapes are kept verbatim.
    Term(String),

    /// A quoted string, quotes and escapes kept verbatim.
    Phrase(String),

    /// A named filter wrapping any clause.
    Field {
        /// Field name.
        name: String,
        /// Clause matched within the field.
        inner: Box<Self>,
    },

    /// A range filter on a field.
    FieldRange {
        /// Field name.
        name: String,
        /// True for `[..]`, false for `{..}`.
        inclusive: bool,
        /// Lower bound.
        lower: Bound,
        /// Upper bound.
        upper: Bound,
    },

    /// A parenthesized sub-expression.
    Group(ClauseList),

    /// A unary modifier applied to one clause.
    Prefixed {
        /// The modifier.
        kind: PrefixKind,
        /// The modified clause.
        inner: Box<Self>,
    },

    /// Proximity or fuzziness: `word~` or `"a b"~10`.
    Proximity {
        /// Term or phrase the operator applies to.
        base: Operand,
        /// Optional distance.
        distance: Option<Number>,
    },

    /// Boosting: `word^2`.
    Boosted {
        /// Term or phrase the operator applies to.
        base: Operand,
        /// Boost factor.
        factor: Number,
    },
}

/// The right-hand side of a binary operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Left operand.
    pub left: Box<Clause>,
    /// Operator joining `left` to `rest`.
    pub op: BinaryOp,
    /// Everything after the operator up to the end of the enclosing list.
    pub rest: Box<ClauseList>,
}

/// A sequence of juxtaposed clauses, optionally ending in a right-folded binary chain.
///
/// `a b c` has three leading clauses and no chain. `a AND b` has no leading clauses and a
/// chain. `a b AND c` keeps `a` as a leading clause and chains `b AND c`.
///
/// Traversals of a list walk its chain in a loop, never by recursion.
pub struct ClauseList {
    /// Clauses before the chain, rendered space-separated.
    pub leading: Vec<Clause>,
    /// A trailing binary chain.
    pub chain: Option<Chain>,
}

impl ClauseList {
    /// Creates a flat list of juxtaposed clauses.
    pub fn flat(clauses: Vec<Clause>) -> Self {
        Self {
            leading: clauses,
            chain: None,
        }
    }

    /// Creates a list whose single member is `left op rest`.
    pub fn chain(left: Clause, op: BinaryOp, rest: Self) -> Self {
        Self::with_chain(Vec::new(), left, op, rest)
    }

    /// Creates a list of `leading` clauses followed by `left op rest`.
    pub fn with_chain(leading: Vec<Clause>, left: Clause, op: BinaryOp, rest: Self) -> Self {
        Self {
            leading,
            chain: Some(Chain {
                left: Box::new(left),
                op,
                rest: Box::new(rest),
            }),
        }
    }

    /// Returns true if the list has no binary chain.
    pub fn is_flat(&self) -> bool {
        self.chain.is_none()
    }

    /// Returns true if the list has no members at all.
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.chain.is_none()
    }

    /// Returns the links of the chain, outermost first.
    pub fn links(&self) -> ChainLinks<'_> {
        ChainLinks {
            next: self.chain.as_ref(),
        }
    }

    /// Returns the number of binary operators along the chain.
    pub fn chain_len(&self) -> usize {
        self.links().count()
    }

    /// Formats the list as a tree structure with the given indentation level.
    ///
    /// Chain members are printed in source order one level below the header, each operator on
    /// its own line.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        if self.is_flat() {
            writeln!(f, "{prefix}List")?;
        } else {
            writeln!(f, "{prefix}Chain")?;
        }
        for clause in &self.leading {
            clause.fmt_tree(f, indent + 1)?;
        }
        for link in self.links() {
            link.left.fmt_tree(f, indent + 1)?;
            writeln!(f, "{prefix}  {}", link.op.as_str())?;
            for clause in &link.rest.leading {
                clause.fmt_tree(f, indent + 1)?;
            }
        }
        Ok(())
    }
}

/// Iterator over the links of a chain. See [`ClauseList::links`].
pub struct ChainLinks<'a> {
    /// The link to yield next.
    next: Option<&'a Chain>,
}

impl<'a> Iterator for ChainLinks<'a> {
    type Item = &'a Chain;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.next?;
        self.next = link.rest.chain.as_ref();
        Some(link)
    }
}

impl Clause {
    /// Formats the clause as a tree structure with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Term(s) => writeln!(f, "{prefix}Term({s:?})"),
            Self::Phrase(s) => writeln!(f, "{prefix}Phrase({s:?})"),
            Self::Field { name, inner } => {
                writeln!(f, "{prefix}Field({name:?})")?;
                inner.fmt_tree(f, indent + 1)
            }
            Self::FieldRange {
                name,
                inclusive,
                lower,
                upper,
            } => {
                let (open, close) = if *inclusive { ('[', ']') } else { ('{', '}') };
                writeln!(
                    f,
                    "{prefix}FieldRange({name:?}, {open}{} TO {}{close})",
                    lower.as_str(),
                    upper.as_str()
                )
            }
            Self::Group(list) => {
                writeln!(f, "{prefix}Group")?;
                list.fmt_tree(f, indent + 1)
            }
            Self::Prefixed { kind, inner } => {
                writeln!(f, "{prefix}Prefixed({})", kind.as_str())?;
                inner.fmt_tree(f, indent + 1)
            }
            Self::Proximity { base, distance } => match distance {
                Some(d) => writeln!(f, "{prefix}Proximity({base:?}, {d})"),
                None => writeln!(f, "{prefix}Proximity({base:?})"),
            },
            Self::Boosted { base, factor } => {
                writeln!(f, "{prefix}Boosted({base:?}, {factor})")
            }
        }
    }
}

/// One chain link in flattened form: `left op rest...`.
#[derive(Debug, Serialize)]
struct Step<'a> {
    /// Left operand.
    left: &'a Clause,
    /// Operator after `left`.
    op: BinaryOp,
    /// Clauses juxtaposed after the operator, before the next link's left operand.
    rest: &'a [Clause],
}

impl<'a> From<&'a Chain> for Step<'a> {
    fn from(link: &'a Chain) -> Self {
        Self {
            left: &link.left,
            op: link.op,
            rest: &link.rest.leading,
        }
    }
}

/// The chain of a list as a flat sequence of steps.
struct Steps<'a> {
    /// List whose chain is walked.
    list: &'a ClauseList,
}

impl Serialize for Steps<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.list.links().map(Step::from))
    }
}

impl fmt::Debug for Steps<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.list.links().map(Step::from))
            .finish()
    }
}

// `{"leading": [..], "chain": null | [{"left", "op", "rest"}, ..]}`
impl Serialize for ClauseList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ClauseList", 2)?;
        state.serialize_field("leading", &self.leading)?;
        state.serialize_field("chain", &self.chain.as_ref().map(|_| Steps { list: self }))?;
        state.end()
    }
}

impl fmt::Debug for ClauseList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClauseList")
            .field("leading", &self.leading)
            .field("chain", &self.chain.as_ref().map(|_| Steps { list: self }))
            .finish()
    }
}

impl Clone for ClauseList {
    fn clone(&self) -> Self {
        let mut links = Vec::new();
        let mut current = self;
        while let Some(link) = &current.chain {
            links.push((current.leading.clone(), (*link.left).clone(), link.op));
            current = &link.rest;
        }
        let mut list = Self::flat(current.leading.clone());
        while let Some((leading, left, op)) = links.pop() {
            list = Self::with_chain(leading, left, op, list);
        }
        list
    }
}

impl PartialEq for ClauseList {
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (self, other);
        loop {
            if a.leading != b.leading {
                return false;
            }
            match (&a.chain, &b.chain) {
                (None, None) => return true,
                (Some(x), Some(y)) if x.op == y.op && x.left == y.left => {
                    a = &x.rest;
                    b = &y.rest;
                }
                _ => return false,
            }
        }
    }
}

impl Eq for ClauseList {}

impl Drop for ClauseList {
    // Unlink the chain in a loop; the default drop recurses once per operator.
    fn drop(&mut self) {
        let mut next = self.chain.take().map(|chain| chain.rest);
        while let Some(mut list) = next {
            next = list.chain.take().map(|chain| chain.rest);
        }
    }
}

impl fmt::Display for ClauseList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

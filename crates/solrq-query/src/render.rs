//! Canonical renderer.
//!
//! Produces the fully parenthesized form consumed by the index query layer. The left operand of
//! a binary operator is rendered as a single clause, while the right operand is rendered as if
//! it were a whole query of its own, wrapped once more in parentheses. That asymmetry is what
//! records right-associative grouping in the output:
//!
//! ```text
//! t1 AND t2 OR t3   →   ((OP:AND T:t1 ((OP:OR T:t2 (T:t3)))))
//! ```

use crate::ast::{Bound, Clause, ClauseList, Operand};

/// Renders a whole query: the list wrapped once in parentheses.
pub fn render(list: &ClauseList) -> String {
    let mut out = String::new();
    out.push('(');
    write_list(&mut out, list);
    out.push(')');
    out
}

/// Renders a clause list without the outer wrap.
pub fn render_list(list: &ClauseList) -> String {
    let mut out = String::new();
    write_list(&mut out, list);
    out
}

/// Renders a single clause.
pub fn render_clause(clause: &Clause) -> String {
    let mut out = String::new();
    write_clause(&mut out, clause);
    out
}

/// Writes a clause list, walking its chain in a loop.
fn write_list(out: &mut String, list: &ClauseList) {
    let mut current = list;
    let mut open_chains = 0;
    let mut first = true;

    loop {
        for clause in &current.leading {
            if !first {
                out.push(' ');
            }
            first = false;
            write_clause(out, clause);
        }

        let Some(chain) = &current.chain else {
            break;
        };

        if !first {
            out.push(' ');
        }
        out.push_str("(OP:");
        out.push_str(chain.op.as_str());
        out.push(' ');
        write_clause(out, &chain.left);
        // The rest is rendered as a top-level query: its own wrap plus the chain's close.
        out.push_str(" (");
        open_chains += 1;
        first = true;
        current = &chain.rest;
    }

    for _ in 0..open_chains {
        out.push_str("))");
    }
}

/// Writes a single clause.
fn write_clause(out: &mut String, clause: &Clause) {
    match clause {
        Clause::Term(text) => {
            out.push_str("T:");
            out.push_str(text);
        }
        Clause::Phrase(text) => {
            out.push_str("STR:");
            out.push_str(text);
        }
        Clause::Field { name, inner } => {
            out.push_str("(F:");
            out.push_str(name);
            out.push(' ');
            write_clause(out, inner);
            out.push(')');
        }
        Clause::FieldRange {
            name,
            inclusive,
            lower,
            upper,
        } => {
            out.push_str("(FR:");
            out.push_str(name);
            out.push(' ');
            write_bound(out, lower, *inclusive);
            out.push(' ');
            write_bound(out, upper, *inclusive);
            out.push(')');
        }
        Clause::Group(list) => {
            out.push('(');
            write_list(out, list);
            out.push(')');
        }
        Clause::Prefixed { kind, inner } => {
            out.push_str("(OP:");
            out.push_str(kind.as_str());
            out.push(' ');
            write_clause(out, inner);
            out.push(')');
        }
        Clause::Proximity { base, distance } => {
            out.push_str("(OP:~ ");
            write_operand(out, base);
            if let Some(distance) = distance {
                out.push(' ');
                out.push_str(distance.as_str());
            }
            out.push(')');
        }
        Clause::Boosted { base, factor } => {
            out.push_str("(OP:^ ");
            write_operand(out, base);
            out.push(' ');
            out.push_str(factor.as_str());
            out.push(')');
        }
    }
}

/// Writes a range bound inside its bracket pair.
fn write_bound(out: &mut String, bound: &Bound, inclusive: bool) {
    let (open, close) = if inclusive { ('[', ']') } else { ('{', '}') };
    out.push(open);
    out.push_str(bound.as_str());
    out.push(close);
}

/// Writes the base of a proximity or boost clause.
fn write_operand(out: &mut String, operand: &Operand) {
    match operand {
        Operand::Term(text) => {
            out.push_str("T:");
            out.push_str(text);
        }
        Operand::Phrase(text) => {
            out.push_str("STR:");
            out.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Number, PrefixKind};

    fn term(s: &str) -> Clause {
        Clause::Term(s.into())
    }

    #[test]
    fn flat_list_has_no_extra_wrap() {
        let list = ClauseList::flat(vec![term("a"), term("b")]);
        assert_eq!(render_list(&list), "T:a T:b");
        assert_eq!(render(&list), "(T:a T:b)");
    }

    #[test]
    fn chain_right_side_is_wrapped_as_a_query() {
        let list = ClauseList::chain(term("t1"), BinaryOp::And, ClauseList::flat(vec![term("t2")]));
        assert_eq!(render_list(&list), "(OP:AND T:t1 (T:t2))");
    }

    #[test]
    fn nested_chain_doubles_parentheses() {
        let list = ClauseList::chain(
            term("a"),
            BinaryOp::Or,
            ClauseList::chain(term("b"), BinaryOp::And, ClauseList::flat(vec![term("c")])),
        );
        assert_eq!(render_list(&list), "(OP:OR T:a ((OP:AND T:b (T:c))))");
    }

    #[test]
    fn leading_clauses_precede_chain() {
        let list = ClauseList::with_chain(
            vec![term("a")],
            term("b"),
            BinaryOp::And,
            ClauseList::flat(vec![term("c"), term("d")]),
        );
        assert_eq!(render_list(&list), "T:a (OP:AND T:b (T:c T:d))");
    }

    #[test]
    fn clause_shapes() {
        let field = Clause::Field {
            name: "f".into(),
            inner: Box::new(Clause::Phrase("\"a b\"".into())),
        };
        assert_eq!(render_clause(&field), "(F:f STR:\"a b\")");

        let range = Clause::FieldRange {
            name: "n".into(),
            inclusive: false,
            lower: Bound::Wildcard,
            upper: Bound::Value("9".into()),
        };
        assert_eq!(render_clause(&range), "(FR:n {*} {9})");

        let not = Clause::Prefixed {
            kind: PrefixKind::Not,
            inner: Box::new(term("x")),
        };
        assert_eq!(render_clause(&not), "(OP:NOT T:x)");

        let fuzzy = Clause::Proximity {
            base: Operand::Term("w".into()),
            distance: None,
        };
        assert_eq!(render_clause(&fuzzy), "(OP:~ T:w)");

        let boosted = Clause::Boosted {
            base: Operand::Phrase("\"p q\"".into()),
            factor: Number::parse("2.5").unwrap(),
        };
        assert_eq!(render_clause(&boosted), "(OP:^ STR:\"p q\" 2.5)");
    }

    #[test]
    fn group_wraps_its_list() {
        let group = Clause::Group(ClauseList::flat(vec![term("a"), term("b")]));
        assert_eq!(render_clause(&group), "(T:a T:b)");
    }
}

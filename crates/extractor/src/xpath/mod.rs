//! Path query evaluation.
//!
//! Selectors are XPath 1.0 node-set expressions. A selector is compiled once
//! into a [`Selector`] and can then be applied to any number of documents.
//! Name tests match on local names, so the default Maven namespace does not
//! get in the way of plain selectors such as `/project/version`.

mod ast;
mod eval;
mod lexer;
mod parser;

pub(crate) use lexer::is_ncname;

use crate::document::{MatchedNode, PomDocument};
use crate::error::QueryError;
use std::fmt;
use std::str::FromStr;

/// A compiled selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    expr: ast::Expr,
}

impl Selector {
    /// Compile a selector.
    ///
    /// Fails with [`QueryError::EmptySelector`] for blank input and
    /// [`QueryError::InvalidSelector`] for anything that is not a valid
    /// node-set expression.
    pub fn compile(selector: &str) -> Result<Self, QueryError> {
        if selector.trim().is_empty() {
            return Err(QueryError::EmptySelector);
        }

        let expr =
            parser::parse_expr(selector).map_err(|reason| QueryError::invalid(selector, reason))?;
        if !expr.is_node_set() {
            return Err(QueryError::invalid(
                selector,
                "expression does not select nodes",
            ));
        }

        log::trace!("Compiled selector `{selector}`");
        Ok(Self {
            source: selector.to_string(),
            expr,
        })
    }

    /// The selector text as given
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Apply the selector to a document. Matches come back in document order;
    /// no match is an empty vector.
    #[must_use]
    pub fn select<'a, 'input>(&self, doc: &'a PomDocument<'input>) -> Vec<MatchedNode<'a, 'input>> {
        eval::select(&self.expr, doc.root())
    }
}

impl FromStr for Selector {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compile `selector` and apply it to `doc` in one go.
pub fn evaluate<'a, 'input>(
    doc: &'a PomDocument<'input>,
    selector: &str,
) -> Result<Vec<MatchedNode<'a, 'input>>, QueryError> {
    Ok(Selector::compile(selector)?.select(doc))
}

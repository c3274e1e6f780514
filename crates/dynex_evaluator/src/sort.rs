//! Multi-key ordering driven by parsed ordering clauses.

use crate::evaluator::Evaluator;
use crate::value::Value;
use crate::EvalError;
use dynex_compiler::{OrderingClause, SortDirection};
use std::cmp::Ordering;

/// Compare two sort keys. `null` sorts before every value; keys that cannot
/// be compared are treated as equal.
pub fn compare_keys(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}

/// Sort `elements` by `clauses`: the first clause is the primary key, each
/// later clause breaks ties left by the ones before it. The sort is stable.
pub fn order_by(elements: Vec<Value>, clauses: &[OrderingClause]) -> Result<Vec<Value>, EvalError> {
    tracing::debug!(elements = elements.len(), clauses = clauses.len(), "order_by");
    let mut evaluator = Evaluator::new();

    let mut keyed = Vec::with_capacity(elements.len());
    for element in elements {
        let keys = clauses
            .iter()
            .map(|clause| evaluator.invoke(&clause.expression, std::slice::from_ref(&element)))
            .collect::<Result<Vec<_>, _>>()?;
        keyed.push((keys, element));
    }

    keyed.sort_by(|(a, _), (b, _)| {
        for ((x, y), clause) in a.iter().zip(b).zip(clauses) {
            let ordering = match clause.direction {
                SortDirection::Ascending => compare_keys(x, y),
                SortDirection::Descending => compare_keys(y, x),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    Ok(keyed.into_iter().map(|(_, element)| element).collect())
}

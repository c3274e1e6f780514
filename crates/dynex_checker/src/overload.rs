//! Overload resolution.
//!
//! Candidates whose arity matches and whose every parameter accepts the
//! corresponding argument are applicable. Among those, the one needing the
//! fewest implicit conversions wins; several candidates at that minimum are
//! ambiguous.

use dynex_types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadResolution {
    /// Index of the selected candidate.
    Found(usize),
    NoneApplicable,
    Ambiguous,
}

/// Choose among `candidates` (parameter lists) for `arguments`.
///
/// `cost(i, parameter)` is the number of conversions needed to pass argument
/// `i` as `parameter`, or `None` when it cannot be passed at all.
pub fn resolve_overload<F>(candidates: &[&[Type]], arguments: &[Type], cost: F) -> OverloadResolution
where
    F: Fn(usize, &Type) -> Option<u32>,
{
    let applicable: Vec<(usize, u32)> = candidates
        .iter()
        .enumerate()
        .filter(|(_, parameters)| parameters.len() == arguments.len())
        .filter_map(|(index, parameters)| {
            let mut total = 0;
            for (i, parameter) in parameters.iter().enumerate() {
                total += cost(i, parameter)?;
            }
            Some((index, total))
        })
        .collect();

    let Some(min_cost) = applicable.iter().map(|&(_, c)| c).min() else {
        return OverloadResolution::NoneApplicable;
    };
    let cheapest: Vec<usize> = applicable
        .iter()
        .filter(|&&(_, c)| c == min_cost)
        .map(|&(index, _)| index)
        .collect();
    match cheapest[..] {
        [only] => OverloadResolution::Found(only),
        _ => OverloadResolution::Ambiguous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynex_types::{conversion_cost, PrimitiveType};

    fn resolve(candidates: &[Vec<Type>], arguments: &[Type]) -> OverloadResolution {
        let lists: Vec<&[Type]> = candidates.iter().map(Vec::as_slice).collect();
        resolve_overload(&lists, arguments, |i, p| conversion_cost(&arguments[i], p))
    }

    #[test]
    fn test_exact_match_wins() {
        let candidates = vec![vec![Type::INT64], vec![Type::INT32], vec![Type::DOUBLE]];
        assert_eq!(resolve(&candidates, &[Type::INT32]), OverloadResolution::Found(1));
    }

    #[test]
    fn test_arity_filters() {
        let candidates = vec![vec![Type::INT32], vec![Type::INT32, Type::INT32]];
        assert_eq!(resolve(&candidates, &[Type::INT32, Type::INT32]), OverloadResolution::Found(1));
        assert_eq!(resolve(&candidates, &[]), OverloadResolution::NoneApplicable);
    }

    #[test]
    fn test_not_convertible() {
        let candidates = vec![vec![Type::INT32]];
        assert_eq!(resolve(&candidates, &[Type::STRING]), OverloadResolution::NoneApplicable);
    }

    #[test]
    fn test_equal_conversion_counts_are_ambiguous() {
        let byte = Type::Primitive(PrimitiveType::Byte);
        let int16 = Type::Primitive(PrimitiveType::Int16);
        let candidates = vec![vec![Type::INT32], vec![int16], vec![Type::DOUBLE]];
        assert_eq!(resolve(&candidates, &[byte]), OverloadResolution::Ambiguous);
    }

    #[test]
    fn test_single_cheapest_candidate_wins() {
        let candidates = vec![vec![Type::INT64, Type::INT64], vec![Type::INT32, Type::INT64]];
        assert_eq!(resolve(&candidates, &[Type::INT32, Type::INT32]), OverloadResolution::Found(1));
    }

    #[test]
    fn test_fewest_conversions_wins() {
        let candidates = vec![
            vec![Type::INT64, Type::INT64],
            vec![Type::INT32, Type::DOUBLE],
        ];
        assert_eq!(resolve(&candidates, &[Type::INT32, Type::INT32]), OverloadResolution::Found(1));
    }

    #[test]
    fn test_ambiguous_tie() {
        let candidates = vec![
            vec![Type::INT64, Type::INT32],
            vec![Type::INT32, Type::INT64],
        ];
        let arguments = [Type::Primitive(PrimitiveType::Int16), Type::Primitive(PrimitiveType::Int16)];
        assert_eq!(resolve(&candidates, &arguments), OverloadResolution::Ambiguous);
    }
}

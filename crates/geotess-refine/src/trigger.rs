//! What to refine: explicit point indices or a data threshold.

use std::fmt;
use std::str::FromStr;

use geotess_model::{Model, PointRef};

use crate::RefineError;

/// Relational operator of a [`Threshold`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Equal,
    NotEqual,
}

impl Comparison {
    /// Longest symbols first so `>=` is not read as `>`.
    const SYMBOLS: [(&'static str, Comparison); 6] = [
        (">=", Comparison::GreaterEqual),
        ("<=", Comparison::LessEqual),
        ("==", Comparison::Equal),
        ("!=", Comparison::NotEqual),
        (">", Comparison::Greater),
        ("<", Comparison::Less),
    ];

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Greater => ">",
            Comparison::GreaterEqual => ">=",
            Comparison::Less => "<",
            Comparison::LessEqual => "<=",
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
        }
    }

    #[must_use]
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Greater => lhs > rhs,
            Comparison::GreaterEqual => lhs >= rhs,
            Comparison::Less => lhs < rhs,
            Comparison::LessEqual => lhs <= rhs,
            Comparison::Equal => lhs == rhs,
            Comparison::NotEqual => lhs != rhs,
        }
    }
}

/// A predicate `<attribute> <op> <value>` over point data.
#[derive(Clone, Debug, PartialEq)]
pub struct Threshold {
    pub attribute: String,
    pub op: Comparison,
    pub value: f64,
}

impl FromStr for Threshold {
    type Err = RefineError;

    /// Parse `vp > 6.5`; whitespace around the operator is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RefineError::BadThreshold(s.to_string());
        let at = s.find(['<', '>', '=', '!']).ok_or_else(bad)?;
        let attribute = s[..at].trim();
        let rest = &s[at..];
        let (symbol, op) = Comparison::SYMBOLS
            .iter()
            .find(|(sym, _)| rest.starts_with(sym))
            .copied()
            .ok_or_else(bad)?;
        let value: f64 = rest[symbol.len()..].trim().parse().map_err(|_| bad())?;
        if attribute.is_empty() || attribute.contains(char::is_whitespace) || !value.is_finite() {
            return Err(bad());
        }
        Ok(Self {
            attribute: attribute.to_string(),
            op,
            value,
        })
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.attribute, self.op.symbol(), self.value)
    }
}

/// Source of seed points for one refinement run.
#[derive(Clone, Debug, PartialEq)]
pub enum RefinementTrigger {
    /// Indices into the model's point map.
    Points(Vec<usize>),
    /// Every active point whose data satisfies the threshold.
    Threshold(Threshold),
}

impl RefinementTrigger {
    /// Combine the two optional inputs of a refinement request.
    ///
    /// # Errors
    ///
    /// [`RefineError::ContradictoryTriggers`] when both are given.
    pub fn from_options(
        points: Option<Vec<usize>>,
        threshold: Option<Threshold>,
    ) -> Result<Option<Self>, RefineError> {
        match (points, threshold) {
            (Some(_), Some(_)) => Err(RefineError::ContradictoryTriggers),
            (Some(p), None) => Ok(Some(RefinementTrigger::Points(p))),
            (None, Some(t)) => Ok(Some(RefinementTrigger::Threshold(t))),
            (None, None) => Ok(None),
        }
    }

    /// Resolve to distinct active points in point-map order.
    ///
    /// # Errors
    ///
    /// Stale point map, out-of-range index, or unknown attribute.
    pub fn seeds(&self, model: &Model) -> Result<Vec<PointRef>, RefineError> {
        let map = model.point_map()?;
        let mut seeds = match self {
            RefinementTrigger::Points(indices) => indices
                .iter()
                .map(|&index| {
                    map.get(index).ok_or(RefineError::InvalidPointIndex {
                        index,
                        len: map.len(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            RefinementTrigger::Threshold(threshold) => {
                let attr = model
                    .metadata()
                    .attribute_index(&threshold.attribute)
                    .ok_or_else(|| RefineError::UnknownAttribute(threshold.attribute.clone()))?;
                let mut seeds = Vec::new();
                for p in map.iter() {
                    let value = model.profile(p.vertex, p.layer)?.value(p.node, attr);
                    if value.is_some_and(|v| threshold.op.holds(v, threshold.value)) {
                        seeds.push(p);
                    }
                }
                seeds
            }
        };
        seeds.sort_unstable();
        seeds.dedup();
        Ok(seeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold() {
        let t: Threshold = "vp > 6.5".parse().unwrap();
        assert_eq!(t.attribute, "vp");
        assert_eq!(t.op, Comparison::Greater);
        assert_eq!(t.value, 6.5);

        let t: Threshold = "density>=3".parse().unwrap();
        assert_eq!(t.op, Comparison::GreaterEqual);
        assert_eq!(t.to_string(), "density >= 3");

        assert_eq!("x != -1e3".parse::<Threshold>().unwrap().op, Comparison::NotEqual);
        assert_eq!("x<=0".parse::<Threshold>().unwrap().op, Comparison::LessEqual);
    }

    #[test]
    fn test_parse_threshold_rejects_garbage() {
        for s in ["vp 6.5", "> 6.5", "vp > fast", "vp => 1", "v p > 1", "vp > inf", ""] {
            assert!(
                matches!(s.parse::<Threshold>(), Err(RefineError::BadThreshold(_))),
                "{s}"
            );
        }
    }

    #[test]
    fn test_comparisons() {
        assert!(Comparison::Less.holds(1.0, 2.0));
        assert!(!Comparison::Less.holds(2.0, 2.0));
        assert!(Comparison::LessEqual.holds(2.0, 2.0));
        assert!(Comparison::Equal.holds(2.0, 2.0));
        assert!(Comparison::NotEqual.holds(2.0, 3.0));
    }

    #[test]
    fn test_triggers_are_exclusive() {
        let t: Threshold = "vp > 1".parse().unwrap();
        assert!(matches!(
            RefinementTrigger::from_options(Some(vec![1]), Some(t.clone())),
            Err(RefineError::ContradictoryTriggers)
        ));
        assert_eq!(
            RefinementTrigger::from_options(None, Some(t.clone())).unwrap(),
            Some(RefinementTrigger::Threshold(t))
        );
        assert_eq!(RefinementTrigger::from_options(None, None).unwrap(), None);
    }
}

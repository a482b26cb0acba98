//! Constraint sets over the type lattice

use super::CypherType;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;

/// One member of a [`TypeSpec`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Constraint {
    /// Just this type
    Exact(CypherType),
    /// This type and every subtype
    Covariant(CypherType),
}

impl Constraint {
    /// Covariant leaves contain a single type; store them as exact so equal
    /// sets compare equal.
    fn canonical(self) -> Self {
        match self {
            Constraint::Covariant(t) if !t.has_subtypes() => Constraint::Exact(t),
            other => other,
        }
    }

    fn ty(&self) -> &CypherType {
        match self {
            Constraint::Exact(t) | Constraint::Covariant(t) => t,
        }
    }

    fn is_covariant(&self) -> bool {
        matches!(self, Constraint::Covariant(_))
    }

    fn map(&self, f: impl FnOnce(&CypherType) -> CypherType) -> Self {
        match self {
            Constraint::Exact(t) => Constraint::Exact(f(t)),
            Constraint::Covariant(t) => Constraint::Covariant(f(t)),
        }
        .canonical()
    }

    fn contains(&self, ty: &CypherType) -> bool {
        match self {
            Constraint::Exact(t) => t == ty,
            Constraint::Covariant(t) => t.is_assignable_from(ty),
        }
    }

    /// Whether every type in `other` is also in `self`
    fn covers(&self, other: &Constraint) -> bool {
        match (self, other) {
            (Constraint::Exact(a), Constraint::Exact(b)) => a == b,
            (Constraint::Exact(_), Constraint::Covariant(_)) => false,
            (Constraint::Covariant(a), _) => a.is_assignable_from(other.ty()),
        }
    }

    fn intersect(&self, other: &Constraint) -> Option<Constraint> {
        match (self, other) {
            (Constraint::Exact(a), Constraint::Exact(b)) => (a == b).then(|| self.clone()),
            (Constraint::Exact(a), Constraint::Covariant(b))
            | (Constraint::Covariant(b), Constraint::Exact(a)) => {
                b.is_assignable_from(a).then(|| Constraint::Exact(a.clone()))
            }
            (Constraint::Covariant(a), Constraint::Covariant(b)) => {
                if a.is_assignable_from(b) {
                    Some(other.clone())
                } else if b.is_assignable_from(a) {
                    Some(self.clone())
                } else {
                    None
                }
            }
        }
    }

    /// The constraint covering every `lub(x, y)` with `x` in `self` and `y` in
    /// `other`. When one side is covariant and the types are comparable this
    /// over-approximates with the covariant range of the higher type.
    fn least_upper_bound(&self, other: &Constraint) -> Constraint {
        let (a, b) = (self.ty(), other.ty());
        let lub = || Constraint::Exact(a.least_upper_bound(b));
        let result = match (self, other) {
            (Constraint::Exact(_), Constraint::Exact(_)) => lub(),
            (Constraint::Exact(_), Constraint::Covariant(_))
            | (Constraint::Covariant(_), Constraint::Exact(_)) => {
                let (exact, covariant) = if self.is_covariant() {
                    (b, a)
                } else {
                    (a, b)
                };
                if exact.is_assignable_from(covariant) {
                    Constraint::Exact(exact.clone())
                } else if covariant.is_assignable_from(exact) {
                    Constraint::Covariant(covariant.clone())
                } else {
                    lub()
                }
            }
            (Constraint::Covariant(_), Constraint::Covariant(_)) => {
                if a.is_assignable_from(b) {
                    self.clone()
                } else if b.is_assignable_from(a) {
                    other.clone()
                } else {
                    lub()
                }
            }
        };
        result.canonical()
    }

    /// Ordering key for "smaller" bounds: deeper types first, exact before
    /// covariant.
    fn rank(&self) -> (Reverse<usize>, bool) {
        (Reverse(self.ty().depth()), self.is_covariant())
    }
}

/// The set of types an expression may have, as currently known
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TypeSpec {
    constraints: BTreeSet<Constraint>,
}

impl TypeSpec {
    fn from_constraints(constraints: impl IntoIterator<Item = Constraint>) -> Self {
        let candidates: BTreeSet<Constraint> =
            constraints.into_iter().map(Constraint::canonical).collect();
        let constraints = candidates
            .iter()
            .filter(|c| !candidates.iter().any(|other| other != *c && other.covers(c)))
            .cloned()
            .collect();
        Self { constraints }
    }

    /// The empty set; any expression constrained to it is a type error
    pub fn none() -> Self {
        Self::default()
    }

    /// Every type
    pub fn all() -> Self {
        Self::covariant(CypherType::Any)
    }

    /// Exactly `ty`
    pub fn exact(ty: CypherType) -> Self {
        Self::from_constraints([Constraint::Exact(ty)])
    }

    /// `ty` and all of its subtypes
    pub fn covariant(ty: CypherType) -> Self {
        Self::from_constraints([Constraint::Covariant(ty)])
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn is_all(&self) -> bool {
        self.constraints.contains(&Constraint::Covariant(CypherType::Any))
    }

    /// Whether `ty` is a member of this set
    pub fn contains(&self, ty: &CypherType) -> bool {
        self.constraints.iter().any(|c| c.contains(ty))
    }

    /// Set union
    pub fn union(&self, other: &TypeSpec) -> TypeSpec {
        Self::from_constraints(self.constraints.iter().chain(&other.constraints).cloned())
    }

    /// Set intersection
    pub fn intersect(&self, other: &TypeSpec) -> TypeSpec {
        Self::from_constraints(
            self.constraints
                .iter()
                .flat_map(|a| other.constraints.iter().filter_map(|b| a.intersect(b))),
        )
    }

    /// Whether the two sets share at least one type
    pub fn contains_any(&self, other: &TypeSpec) -> bool {
        self.constraints
            .iter()
            .any(|a| other.constraints.iter().any(|b| a.intersect(b).is_some()))
    }

    /// The smallest set in which every member of `self` and of `other` has a
    /// supertype. Each member is paired with its closest counterpart on the
    /// other side.
    pub fn least_upper_bound(&self, other: &TypeSpec) -> TypeSpec {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let closest = |c: &Constraint, side: &TypeSpec| {
            side.constraints
                .iter()
                .map(|d| c.least_upper_bound(d))
                .min_by_key(Constraint::rank)
        };
        Self::from_constraints(
            self.constraints
                .iter()
                .filter_map(|c| closest(c, other))
                .chain(other.constraints.iter().filter_map(|c| closest(c, self))),
        )
    }

    /// `List<t>` for every member `t`
    pub fn wrap_in_list(&self) -> TypeSpec {
        Self::from_constraints(
            self.constraints
                .iter()
                .map(|c| c.map(|t| CypherType::list(t.clone()))),
        )
    }

    /// Element types of the list members. `Any` may hold a list of anything and
    /// unwraps to itself; other non-list members contribute nothing.
    pub fn unwrap_lists(&self) -> TypeSpec {
        Self::from_constraints(self.constraints.iter().filter_map(|c| match c.ty() {
            CypherType::List(inner) => Some(c.map(|_| (**inner).clone())),
            CypherType::Any => Some(c.clone()),
            _ => None,
        }))
    }
}

impl From<CypherType> for TypeSpec {
    fn from(ty: CypherType) -> Self {
        TypeSpec::exact(ty)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Nothing");
        }
        let names: BTreeSet<String> = self.constraints.iter().map(|c| c.ty().to_string()).collect();
        write!(f, "{}", names.into_iter().collect::<Vec<_>>().join(" or "))
    }
}

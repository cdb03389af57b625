//! Linear Constraint Equations
//!
//! An equation is an ordered list of terms `sum(c_i * u_i) = 0`, where each
//! `u_i` is one degree of freedom of the single node (or reference point) held
//! by a named set. The first term is the constrained degree of freedom.

use serde::{Deserialize, Serialize};

/// A degree of freedom of a node or reference point
///
/// Serialized as the kernel's 1-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Dof {
    /// Translation along x
    U1,
    /// Translation along y
    U2,
    /// Translation along z
    U3,
    /// Rotation about x
    Ur1,
    /// Rotation about y
    Ur2,
    /// Rotation about z
    Ur3,
}

impl Dof {
    /// The translational degrees of freedom in axis order
    pub const TRANSLATIONS: [Dof; 3] = [Dof::U1, Dof::U2, Dof::U3];

    /// 1-based index used by finite-element kernels (1..=6)
    pub fn index(self) -> u8 {
        match self {
            Dof::U1 => 1,
            Dof::U2 => 2,
            Dof::U3 => 3,
            Dof::Ur1 => 4,
            Dof::Ur2 => 5,
            Dof::Ur3 => 6,
        }
    }

    /// Look up a degree of freedom from its 1-based index
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Dof::U1),
            2 => Some(Dof::U2),
            3 => Some(Dof::U3),
            4 => Some(Dof::Ur1),
            5 => Some(Dof::Ur2),
            6 => Some(Dof::Ur3),
            _ => None,
        }
    }

    /// Axis name (`x`, `y` or `z`) this degree of freedom acts along or about
    pub fn axis_name(self) -> &'static str {
        match self {
            Dof::U1 | Dof::Ur1 => "x",
            Dof::U2 | Dof::Ur2 => "y",
            Dof::U3 | Dof::Ur3 => "z",
        }
    }
}

impl From<Dof> for u8 {
    fn from(dof: Dof) -> Self {
        dof.index()
    }
}

impl TryFrom<u8> for Dof {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Dof::from_index(index).ok_or_else(|| format!("invalid degree of freedom index {index}"))
    }
}

/// A single term of a linear equation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationTerm {
    /// Coefficient multiplying the degree of freedom
    pub coefficient: f64,
    /// Name of the set holding the node or reference point
    pub set_name: String,
    /// Degree of freedom referenced
    pub dof: Dof,
}

impl EquationTerm {
    /// Create a new term
    pub fn new(coefficient: f64, set_name: impl Into<String>, dof: Dof) -> Self {
        Self {
            coefficient,
            set_name: set_name.into(),
            dof,
        }
    }
}

/// A named linear constraint equation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearEquation {
    /// Unique name of the equation
    pub name: String,
    /// Ordered terms; the first one is the constrained degree of freedom
    pub terms: Vec<EquationTerm>,
}

impl LinearEquation {
    /// Create an equation without terms
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            terms: Vec::new(),
        }
    }

    /// Append a term
    pub fn push_term(&mut self, coefficient: f64, set_name: impl Into<String>, dof: Dof) {
        self.terms.push(EquationTerm::new(coefficient, set_name, dof));
    }

    /// Builder variant of [`LinearEquation::push_term`]
    pub fn with_term(mut self, coefficient: f64, set_name: impl Into<String>, dof: Dof) -> Self {
        self.push_term(coefficient, set_name, dof);
        self
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if the equation has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// An equation relates degrees of freedom only with at least two terms.
    /// A single term would just prescribe zero displacement.
    pub fn is_relation(&self) -> bool {
        self.terms.len() >= 2
    }

    /// Find the first term referencing `set_name` and `dof`
    pub fn term(&self, set_name: &str, dof: Dof) -> Option<&EquationTerm> {
        self.terms
            .iter()
            .find(|t| t.set_name == set_name && t.dof == dof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dof_index_mapping() {
        for index in 1..=6 {
            let dof = Dof::from_index(index).unwrap();
            assert_eq!(dof.index(), index);
        }
        assert!(Dof::from_index(0).is_none());
        assert!(Dof::from_index(7).is_none());
        assert_eq!(Dof::U3.axis_name(), "z");
    }

    #[test]
    fn test_dof_serializes_as_kernel_index() {
        let term = EquationTerm::new(0.3, "RAIL_RP", Dof::U3);
        let json = serde_json::to_string(&term).unwrap();
        assert!(json.contains("\"dof\":3"), "{json}");

        let parsed: EquationTerm = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.dof, Dof::U3);
        assert!(serde_json::from_str::<Dof>("7").is_err());
    }

    #[test]
    fn test_single_term_is_not_a_relation() {
        let eq =
            LinearEquation::new("N00000001_C_x").with_term(-1.0, "RAIL-1.N00000001_C", Dof::U1);
        assert!(!eq.is_relation());

        let eq = eq.with_term(1.0, "RAIL-1.N00000001_R", Dof::U1);
        assert!(eq.is_relation());
        assert_eq!(eq.len(), 2);
        assert_eq!(
            eq.term("RAIL-1.N00000001_R", Dof::U1).map(|t| t.coefficient),
            Some(1.0)
        );
    }
}

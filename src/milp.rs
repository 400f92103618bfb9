//! This module provides a generic representation of 0-1 integer linear programs and the interface
//! to the MILP engine solving them.
//!
//! The formulation code builds a `Model` out of binary variables, labelled linear constraints and
//! a linear objective. The model is handed to an implementation of the `MilpSolver` trait, which
//! runs the actual optimization and reports one of the terminal states in `SolveStatus`. This way
//! the solving engine stays an opaque, replaceable collaborator: any MILP backend can be plugged
//! in without touching the formulation.
//!
//! The trait also provides a generic `compute_iis()` implementation (deletion filtering), so every
//! backend gains infeasibility diagnosis for free: constraints are dropped one by one and a drop is
//! made permanent whenever the remaining model is still infeasible. The surviving constraints form
//! an irreducible infeasible subset.

/// Identifier of a binary variable within a `Model`
pub type VarId = usize;

/// Optimization direction of the objective function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// A linear expression over binary variables, represented as a list of (variable, coefficient)
/// terms. Variables may appear in multiple terms; their coefficients add up.
#[derive(Debug, Clone, Default)]
pub struct LinExpr {
    pub terms: Vec<(VarId, f64)>,
}

impl LinExpr {
    pub fn new() -> LinExpr {
        LinExpr { terms: Vec::new() }
    }

    /// Builder-style variant of `add_term()`
    pub fn term(mut self, var: VarId, coefficient: f64) -> LinExpr {
        self.add_term(var, coefficient);
        self
    }

    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    /// Sum of the given variables, each with coefficient 1
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> LinExpr {
        LinExpr {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
        }
    }
}

/// Relation of a constraint's linear expression to its right hand side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessEq,
    Equal,
}

/// A labelled linear constraint `expr (<=|==) rhs`. The label identifies the constraint in
/// conflict reports.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub label: String,
    pub expr: LinExpr,
    pub comparison: Comparison,
    pub rhs: f64,
}

/// A full 0-1 integer linear program: binary variables, labelled constraints and a linear
/// objective. Built once per solve; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Model {
    num_vars: usize,
    pub constraints: Vec<Constraint>,
    pub objective: LinExpr,
    pub sense: Sense,
}

impl Model {
    pub fn new() -> Model {
        Model {
            num_vars: 0,
            constraints: Vec::new(),
            objective: LinExpr::new(),
            sense: Sense::Maximize,
        }
    }

    /// Create a new binary variable and return its id
    pub fn add_binary(&mut self) -> VarId {
        let var = self.num_vars;
        self.num_vars += 1;
        var
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn add_constraint(
        &mut self,
        label: String,
        expr: LinExpr,
        comparison: Comparison,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            label,
            expr,
            comparison,
            rhs,
        });
    }

    pub fn set_objective(&mut self, sense: Sense, objective: LinExpr) {
        self.sense = sense;
        self.objective = objective;
    }

    /// Copy of this model, restricted to the constraints at the given indexes. Used by the
    /// deletion filter in `MilpSolver::compute_iis()`.
    fn with_constraints(&self, keep: &[usize]) -> Model {
        Model {
            num_vars: self.num_vars,
            constraints: keep.iter().map(|i| self.constraints[*i].clone()).collect(),
            objective: self.objective.clone(),
            sense: self.sense,
        }
    }
}

impl Default for Model {
    fn default() -> Model {
        Model::new()
    }
}

/// Variable assignment and objective value of a solved model
#[derive(Debug, Clone)]
pub struct Solution {
    pub objective: f64,
    pub values: Vec<f64>,
}

impl Solution {
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var]
    }

    /// Whether the binary variable is set in this solution. The 0.5 threshold is the usual
    /// rounding convention for solver-reported boolean values, tolerant of floating point slack.
    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var) > 0.5
    }
}

/// Terminal states of a single synchronous solver run
#[derive(Debug)]
pub enum SolveStatus {
    Optimal(Solution),
    Infeasible,
    Unbounded,
    Error(String),
}

/// Interface of an external MILP engine. `solve()` is the only backend-specific operation;
/// `compute_iis()` comes for free with every implementation.
pub trait MilpSolver {
    /// Run one synchronous optimization of the given model
    fn solve(&self, model: &Model) -> SolveStatus;

    /// Compute an irreducible infeasible subset of the model's constraints by deletion
    /// filtering. Must only be called for a model that `solve()` reported as infeasible;
    /// on a feasible model the full constraint set is returned.
    fn compute_iis(&self, model: &Model) -> Vec<Constraint> {
        let mut keep: Vec<usize> = (0..model.constraints.len()).collect();
        let mut i = 0;
        while i < keep.len() {
            let mut candidate = keep.clone();
            candidate.remove(i);
            match self.solve(&model.with_constraints(&candidate)) {
                // Still infeasible without the constraint, so it is not part of the conflict
                SolveStatus::Infeasible => keep = candidate,
                _ => i += 1,
            }
        }
        keep.iter().map(|i| model.constraints[*i].clone()).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn build_simple_model() {
        let mut model = Model::new();
        let x = model.add_binary();
        let y = model.add_binary();
        let z = model.add_binary();
        assert_eq!((x, y, z), (0, 1, 2));
        assert_eq!(model.num_vars(), 3);

        model.add_constraint(
            String::from("capacity"),
            LinExpr::sum(vec![x, y, z]),
            Comparison::LessEq,
            2.0,
        );
        model.add_constraint(
            String::from("pick x"),
            LinExpr::new().term(x, 1.0),
            Comparison::Equal,
            1.0,
        );
        model.set_objective(Sense::Maximize, LinExpr::sum(vec![x, y, z]));

        assert_eq!(model.constraints.len(), 2);
        assert_eq!(model.constraints[0].label, "capacity");
        assert_eq!(model.constraints[0].expr.terms.len(), 3);
        assert_eq!(model.constraints[1].comparison, Comparison::Equal);
        assert_eq!(model.sense, Sense::Maximize);
    }

    #[test]
    fn restricted_model_keeps_selected_constraints() {
        let mut model = Model::new();
        let x = model.add_binary();
        for label in &["a", "b", "c"] {
            model.add_constraint(
                String::from(*label),
                LinExpr::new().term(x, 1.0),
                Comparison::LessEq,
                1.0,
            );
        }

        let restricted = model.with_constraints(&[0, 2]);
        assert_eq!(restricted.num_vars(), 1);
        let labels: Vec<&str> = restricted
            .constraints
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(labels, vec!["a", "c"]);
    }

    #[test]
    fn solution_thresholds_binary_values() {
        let solution = Solution {
            objective: 1.0,
            values: vec![0.0, 1.0, 0.4999, 0.5001],
        };
        assert!(!solution.is_set(0));
        assert!(solution.is_set(1));
        assert!(!solution.is_set(2));
        assert!(solution.is_set(3));
    }
}

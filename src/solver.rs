//! MILP backend based on the `good_lp` crate, using its bundled pure-Rust solver.
//!
//! The adapter translates a `milp::Model` into a `good_lp` problem, runs one synchronous
//! optimization and maps the resolution result back onto `milp::SolveStatus`. All domain
//! knowledge stays in the formulation; this module only shovels variables and constraints
//! across the crate boundary.

use crate::milp::{Comparison, LinExpr, MilpSolver, Model, Sense, Solution, SolveStatus};
use good_lp::{
    default_solver, variable, Expression, ProblemVariables, ResolutionError,
    Solution as LpSolution, SolverModel, Variable,
};
use log::debug;

/// Solver adapter for `good_lp`'s default backend. Stateless; each `solve()` call builds a
/// fresh problem.
pub struct GoodLpSolver;

impl MilpSolver for GoodLpSolver {
    fn solve(&self, model: &Model) -> SolveStatus {
        let mut vars = ProblemVariables::new();
        let lp_vars: Vec<Variable> = (0..model.num_vars())
            .map(|_| vars.add(variable().binary()))
            .collect();

        let objective = translate(&model.objective, &lp_vars);
        let mut problem = match model.sense {
            Sense::Maximize => vars.maximise(objective.clone()),
            Sense::Minimize => vars.minimise(objective.clone()),
        }
        .using(default_solver);

        for constraint in &model.constraints {
            let lhs = translate(&constraint.expr, &lp_vars);
            problem = problem.with(match constraint.comparison {
                Comparison::LessEq => lhs.leq(constraint.rhs),
                Comparison::Equal => lhs.eq(constraint.rhs),
            });
        }

        debug!(
            "Solving model with {} variables and {} constraints",
            model.num_vars(),
            model.constraints.len()
        );
        match problem.solve() {
            Ok(lp_solution) => SolveStatus::Optimal(Solution {
                objective: objective.eval_with(&lp_solution),
                values: lp_vars.iter().map(|v| lp_solution.value(*v)).collect(),
            }),
            Err(ResolutionError::Infeasible) => SolveStatus::Infeasible,
            Err(ResolutionError::Unbounded) => SolveStatus::Unbounded,
            Err(other) => SolveStatus::Error(other.to_string()),
        }
    }
}

fn translate(expr: &LinExpr, lp_vars: &[Variable]) -> Expression {
    expr.terms
        .iter()
        .fold(Expression::from(0.0), |acc, (var, coefficient)| {
            acc + *coefficient * lp_vars[*var]
        })
}

#[cfg(test)]
mod test {
    use super::GoodLpSolver;
    use crate::milp::{Comparison, LinExpr, MilpSolver, Model, Sense, SolveStatus};
    use assert_float_eq::assert_float_absolute_eq;

    #[test]
    fn maximize_with_capacity() {
        let mut model = Model::new();
        let x = model.add_binary();
        let y = model.add_binary();
        let z = model.add_binary();
        model.add_constraint(
            String::from("capacity"),
            LinExpr::sum(vec![x, y]),
            Comparison::LessEq,
            1.0,
        );
        model.add_constraint(
            String::from("force z"),
            LinExpr::new().term(z, 1.0),
            Comparison::Equal,
            1.0,
        );
        model.set_objective(Sense::Maximize, LinExpr::sum(vec![x, y, z]));

        match GoodLpSolver.solve(&model) {
            SolveStatus::Optimal(solution) => {
                assert_float_absolute_eq!(solution.objective, 2.0);
                assert!(solution.is_set(z));
                assert!(solution.is_set(x) != solution.is_set(y));
            }
            other => panic!("Expected optimal solution, got {:?}", other),
        }
    }

    #[test]
    fn minimize_respects_equalities() {
        let mut model = Model::new();
        let x = model.add_binary();
        let y = model.add_binary();
        model.add_constraint(
            String::from("force x"),
            LinExpr::new().term(x, 1.0),
            Comparison::Equal,
            1.0,
        );
        model.set_objective(Sense::Minimize, LinExpr::sum(vec![x, y]));

        match GoodLpSolver.solve(&model) {
            SolveStatus::Optimal(solution) => {
                assert_float_absolute_eq!(solution.objective, 1.0);
                assert!(solution.is_set(x));
                assert!(!solution.is_set(y));
            }
            other => panic!("Expected optimal solution, got {:?}", other),
        }
    }

    #[test]
    fn contradictory_equalities_are_infeasible() {
        let mut model = Model::new();
        let x = model.add_binary();
        model.add_constraint(
            String::from("on"),
            LinExpr::new().term(x, 1.0),
            Comparison::Equal,
            1.0,
        );
        model.add_constraint(
            String::from("off"),
            LinExpr::new().term(x, 1.0),
            Comparison::LessEq,
            0.0,
        );
        model.set_objective(Sense::Maximize, LinExpr::new().term(x, 1.0));

        match GoodLpSolver.solve(&model) {
            SolveStatus::Infeasible => (),
            other => panic!("Expected infeasible model, got {:?}", other),
        }
    }

    #[test]
    fn iis_drops_unrelated_constraints() {
        let mut model = Model::new();
        let x = model.add_binary();
        let y = model.add_binary();
        model.add_constraint(
            String::from("on"),
            LinExpr::new().term(x, 1.0),
            Comparison::Equal,
            1.0,
        );
        model.add_constraint(
            String::from("off"),
            LinExpr::new().term(x, 1.0),
            Comparison::LessEq,
            0.0,
        );
        model.add_constraint(
            String::from("unrelated"),
            LinExpr::new().term(y, 1.0),
            Comparison::LessEq,
            1.0,
        );
        model.set_objective(Sense::Maximize, LinExpr::sum(vec![x, y]));

        let conflict = GoodLpSolver.compute_iis(&model);
        let labels: Vec<&str> = conflict.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["on", "off"]);
    }
}

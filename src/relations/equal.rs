use crate::basic_types::PropagationStatus;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Relation;

/// All variables in the scope take the same value.
#[derive(Clone, Copy, Debug, Default)]
pub struct Equal;

impl Relation for Equal {
    fn name(&self) -> &str {
        "eq"
    }

    fn propagate(&self, mut context: PropagationContextMut<'_>) -> PropagationStatus {
        if context.arity() < 2 {
            return Ok(());
        }

        let mut common = context.domain(0).clone();
        for argument in 1..context.arity() {
            let _ = common.intersect(context.domain(argument));
        }

        for argument in 0..context.arity() {
            context.intersect(argument, &common)?;
        }

        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn Relation> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::Equal;
    use crate::engine::domains::Domain;
    use crate::engine::test_helper::TestEngine;

    #[test]
    fn all_variables_narrow_to_the_common_values() {
        let mut engine = TestEngine::default();
        let a = engine.new_variable(0, 10);
        let b = engine.new_sparse_variable(&[2, 4, 12]);
        let c = engine.new_variable(3, 20);

        let _ = engine.post(Equal, &[a, b, c]);
        assert!(engine.propagate());

        for variable in [a, b, c] {
            assert_eq!(&Domain::singleton(4), engine.domain(variable));
        }
    }

    #[test]
    fn disjoint_domains_are_inconsistent() {
        let mut engine = TestEngine::default();
        let a = engine.new_variable(0, 3);
        let b = engine.new_variable(5, 7);

        let _ = engine.post(Equal, &[a, b]);
        assert!(!engine.propagate());
        assert!(engine.is_proven_inconsistent());
    }
}

use crate::basic_types::PropagationStatus;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Relation;

/// `x <= y`, propagated on bounds.
#[derive(Clone, Copy, Debug, Default)]
pub struct LessThanEqual;

impl Relation for LessThanEqual {
    fn name(&self) -> &str {
        "leq"
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }

    fn propagate(&self, mut context: PropagationContextMut<'_>) -> PropagationStatus {
        let lower_bound_x = context.lower_bound(0)?;
        let upper_bound_y = context.upper_bound(1)?;

        context.restrict_bounds(0, lower_bound_x, upper_bound_y)?;
        let upper_bound_y = context.upper_bound(1)?;
        context.restrict_bounds(1, lower_bound_x, upper_bound_y)?;

        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn Relation> {
        Box::new(*self)
    }
}

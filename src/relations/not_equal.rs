use crate::basic_types::PropagationStatus;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Relation;

/// `x != y`. Only propagates once one side is a singleton.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotEqual;

impl Relation for NotEqual {
    fn name(&self) -> &str {
        "neq"
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }

    fn propagate(&self, mut context: PropagationContextMut<'_>) -> PropagationStatus {
        // A removal can turn the other side into a singleton, hence the third pass.
        for (fixed, other) in [(0, 1), (1, 0), (0, 1)] {
            if let Some(value) = context.domain(fixed).singleton_value() {
                context.remove(other, value)?;
            }
        }

        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn Relation> {
        Box::new(*self)
    }
}

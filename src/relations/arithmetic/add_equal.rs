use crate::basic_types::PropagationStatus;
use crate::engine::domains::saturating_bound_add;
use crate::engine::domains::saturating_bound_sub;
use crate::engine::domains::EmptyDomain;
use crate::engine::domains::Value;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Relation;

/// `x + y = z`, propagated on bounds until a fixed point.
#[derive(Clone, Copy, Debug, Default)]
pub struct AddEqual;

impl Relation for AddEqual {
    fn name(&self) -> &str {
        "addEq"
    }

    fn arity(&self) -> Option<usize> {
        Some(3)
    }

    fn propagate(&self, mut context: PropagationContextMut<'_>) -> PropagationStatus {
        loop {
            let before = bounds(&context)?;
            let [lb_x, ub_x, lb_y, ub_y, _, _] = before;

            context.restrict_bounds(
                2,
                saturating_bound_add(lb_x, lb_y),
                saturating_bound_add(ub_x, ub_y),
            )?;
            let (lb_z, ub_z) = (context.lower_bound(2)?, context.upper_bound(2)?);

            context.restrict_bounds(
                0,
                saturating_bound_sub(lb_z, ub_y),
                saturating_bound_sub(ub_z, lb_y),
            )?;
            let (lb_x, ub_x) = (context.lower_bound(0)?, context.upper_bound(0)?);

            context.restrict_bounds(
                1,
                saturating_bound_sub(lb_z, ub_x),
                saturating_bound_sub(ub_z, lb_x),
            )?;

            if bounds(&context)? == before {
                return Ok(());
            }
        }
    }

    fn boxed_clone(&self) -> Box<dyn Relation> {
        Box::new(*self)
    }
}

fn bounds(context: &PropagationContextMut<'_>) -> Result<[Value; 6], EmptyDomain> {
    Ok([
        context.lower_bound(0)?,
        context.upper_bound(0)?,
        context.lower_bound(1)?,
        context.upper_bound(1)?,
        context.lower_bound(2)?,
        context.upper_bound(2)?,
    ])
}

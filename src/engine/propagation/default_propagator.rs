use std::collections::BTreeSet;

use log::debug;
use log::trace;

use crate::engine::constraint::ConstraintId;
use crate::engine::constraint_network::ConstraintNetwork;
use crate::engine::domains::DomainChange;
use crate::engine::variables::VariableId;
use crate::plandb_assert_moderate;
use crate::plandb_assert_simple;

/// Decides which constraint is executed when.
///
/// The agenda is ordered by [`ConstraintId`], which is assigned at creation and never changes, so
/// propagation over the same sequence of mutations always happens in the same order.
#[derive(Debug, Default)]
pub(crate) struct DefaultPropagator {
    agenda: BTreeSet<ConstraintId>,
    /// The constraint which is currently executing; it is never put back on the agenda by its own
    /// changes.
    active_constraint: Option<ConstraintId>,
}

impl DefaultPropagator {
    pub(crate) fn handle_constraint_added(&mut self, constraint: ConstraintId) {
        debug!("Adding {constraint} to the agenda");
        let _ = self.agenda.insert(constraint);
    }

    pub(crate) fn handle_constraint_removed(&mut self, constraint: ConstraintId) {
        plandb_assert_simple!(
            self.active_constraint != Some(constraint),
            "{constraint} cannot be removed while it is executing"
        );
        if self.agenda.remove(&constraint) {
            debug!("Removed {constraint} from the agenda");
        }
    }

    pub(crate) fn handle_constraint_activated(&mut self, constraint: ConstraintId) {
        self.handle_constraint_added(constraint);
    }

    pub(crate) fn handle_constraint_deactivated(&mut self, constraint: ConstraintId) {
        let _ = self.agenda.remove(&constraint);
    }

    pub(crate) fn handle_notification(
        &mut self,
        variable: VariableId,
        argument: usize,
        constraint: ConstraintId,
        change: DomainChange,
    ) {
        if self.active_constraint == Some(constraint) {
            return;
        }

        if self.agenda.insert(constraint) {
            trace!("{change:?} on {variable} (argument {argument}) schedules {constraint}");
        }
    }

    pub(crate) fn update_required(&self) -> bool {
        !self.agenda.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn is_scheduled(&self, constraint: ConstraintId) -> bool {
        self.agenda.contains(&constraint)
    }

    /// Executes constraints in agenda order until the agenda is empty or the network is proven
    /// inconsistent, in which case the rest of the agenda is dropped. Returns the number of
    /// constraints executed.
    pub(crate) fn execute(&mut self, network: &mut ConstraintNetwork) -> u64 {
        plandb_assert_simple!(!self.agenda.is_empty(), "executing an empty agenda");
        plandb_assert_simple!(!network.is_proven_inconsistent());
        plandb_assert_simple!(self.active_constraint.is_none());

        let mut num_executed = 0;

        while let Some(constraint) = self.agenda.pop_first() {
            plandb_assert_moderate!(network.constraint(constraint).is_active());

            self.active_constraint = Some(constraint);
            network.execute(constraint);
            num_executed += 1;

            for (variable, change) in network.drain_changes() {
                for (target, argument) in network.notification_targets(variable, change) {
                    self.handle_notification(variable, argument, target, change);
                }
            }

            if network.is_proven_inconsistent() {
                debug!(
                    "Network proven inconsistent by {constraint}, dropping {} scheduled constraints",
                    self.agenda.len()
                );
                self.agenda.clear();
                break;
            }
        }

        self.active_constraint = None;
        num_executed
    }
}

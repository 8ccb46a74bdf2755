#![cfg(test)]
use crate::engine::domains::Domain;
use crate::plan_database::test_helper::TestDatabase;
use crate::plan_database::Notification;
use crate::plan_database::ObjectEvent;
use crate::plan_database::SchemaError;
use crate::plan_database::TokenEvent;
use crate::plan_database::TokenId;
use crate::plan_database::TokenState;
use crate::relations::arithmetic::LessThanEqual;

fn token_events(db: &mut TestDatabase) -> Vec<(TokenId, TokenEvent)> {
    db.drain_notifications()
        .into_iter()
        .filter_map(|notification| match notification {
            Notification::Token { token, event } => Some((token, event)),
            _ => None,
        })
        .collect()
}

#[test]
fn tokens_move_through_their_states() {
    let mut db = TestDatabase::default();
    let token = db.create_token("Rover.At", true, false).unwrap();
    assert_eq!(TokenState::Incomplete, db.state(token));

    let _ = db.add_parameter(token, "battery", Domain::interval(0, 100));
    db.close(token);
    assert_eq!(TokenState::Inactive, db.state(token));
    assert!(db.variable(token, "battery").is_some());

    db.activate(token);
    assert_eq!(TokenState::Active, db.state(token));
    db.deactivate(token);
    assert_eq!(TokenState::Inactive, db.state(token));

    db.reject(token);
    assert_eq!(TokenState::Rejected, db.state(token));
    db.reinstate(token);
    assert_eq!(TokenState::Inactive, db.state(token));
    assert!(db.is_valid(token));

    assert_eq!(
        vec![
            (token, TokenEvent::Added),
            (token, TokenEvent::Activated),
            (token, TokenEvent::Deactivated),
            (token, TokenEvent::Rejected),
            (token, TokenEvent::Reinstated),
        ],
        token_events(&mut db)
    );
}

#[test]
#[should_panic]
fn parameters_cannot_be_added_to_a_closed_token() {
    let mut db = TestDatabase::default();
    let token = db.new_token("Rover.At");

    let _ = db.add_parameter(token, "battery", Domain::interval(0, 100));
}

#[test]
fn unknown_predicates_are_reported() {
    let mut db = TestDatabase::default();

    assert_eq!(
        Err(SchemaError::UnknownPredicate("Rover.Fly".to_owned())),
        db.create_token("Rover.Fly", true, true)
    );
}

#[test]
fn variables_are_created_in_a_fixed_order() {
    let mut db = TestDatabase::default();
    let token = db.new_token("Rover.Drive");
    let entry = db.token(token);

    let names: Vec<&str> = entry
        .variables()
        .iter()
        .map(|&variable| db.engine().variable(variable).name())
        .collect();
    assert_eq!(
        vec!["state", "object", "duration", "start", "end", "to", "speed"],
        names
    );
    assert_eq!("Drive", db.unqualified_predicate(token));
    assert!(!db.engine().variable(entry.state_variable()).can_be_specified());
    assert_eq!(1, entry.standard_constraints().count());

    let rovers: Vec<_> = db
        .objects()
        .filter(|&object| db.object(object).object_type() == "Rover")
        .map(|object| object.value())
        .collect();
    assert_eq!(
        &Domain::values(rovers),
        db.engine().variable(entry.object_variable()).base_domain()
    );
}

#[test]
fn variables_are_looked_up_on_the_token_then_locally_then_globally() {
    let mut db = TestDatabase::default();
    let token = db.new_token("Rover.At");
    let global = db.create_global_variable("deadline", Domain::interval(0, 50));
    let local = db.create_local_variable(token, "guard", Domain::values([0, 1]));

    assert_eq!(Some(db.token(token).start()), db.variable(token, "start"));
    assert_eq!(Some(local), db.variable(token, "guard"));
    assert_eq!(Some(global), db.variable(token, "deadline"));
    assert_eq!(None, db.variable(token, "missing"));
    assert_eq!(Some(token), db.local_variable_owner(local));

    db.remove_local_variable(token, local);
    assert!(!db.engine().contains_variable(local));
    assert_eq!(None, db.variable(token, "guard"));
}

#[test]
fn cancel_undoes_whatever_state_the_token_is_in() {
    let mut db = TestDatabase::default();
    let active = db.new_token("Rover.At");
    let merged = db.new_token("Rover.At");
    let rejected = db.new_token("Rover.At");
    db.activate(active);
    db.merge(merged, active);
    db.reject(rejected);

    db.cancel(merged);
    db.cancel(rejected);
    db.cancel(active);

    for token in [active, merged, rejected] {
        assert_eq!(TokenState::Inactive, db.state(token));
        assert!(db.is_valid(token));
    }
}

#[test]
fn deactivating_splits_the_tokens_merged_onto_it() {
    let mut db = TestDatabase::default();
    let active = db.new_token("Rover.At");
    let first = db.new_token("Rover.At");
    let second = db.new_token("Rover.At");
    db.activate(active);
    db.merge(first, active);
    db.merge(second, active);

    db.deactivate(active);

    for token in [active, first, second] {
        assert_eq!(TokenState::Inactive, db.state(token));
    }
    assert_eq!(1, db.token(active).ref_count());
}

#[test]
fn rejecting_notifies_every_candidate_object() {
    let mut db = TestDatabase::default();
    let token = db.new_token("Rover.At");
    let _ = db.drain_notifications();

    db.reject(token);

    let objects: Vec<_> = db
        .drain_notifications()
        .into_iter()
        .filter_map(|notification| match notification {
            Notification::Object {
                object,
                token: notified,
                event: ObjectEvent::Rejected,
            } if notified == token => Some(db.object(object).name().to_owned()),
            _ => None,
        })
        .collect();
    assert_eq!(vec!["spirit", "opportunity"], objects);
}

#[test]
#[should_panic]
fn non_rejectable_tokens_cannot_be_rejected() {
    let mut db = TestDatabase::default();
    let token = db.create_token("Rover.At", false, true).unwrap();

    db.reject(token);
}

#[test]
fn committing_pins_the_state_and_keeps_the_token_alive() {
    let mut db = TestDatabase::default();
    let token = db.new_token("Rover.At");
    assert!(!db.can_be_committed(token));
    db.activate(token);
    assert!(db.can_be_committed(token));

    db.commit(token);

    assert!(db.token(token).is_committed());
    assert!(!db.can_be_committed(token));
    assert_eq!(
        &Domain::singleton(TokenState::ACTIVE),
        db.engine()
            .variable(db.token(token).state_variable())
            .base_domain()
    );

    db.delete_token(token);
    assert!(db.contains_token(token));
    assert!(db.token(token).is_discarded());
    assert_eq!(TokenState::Active, db.state(token));
}

#[test]
#[should_panic]
fn committed_tokens_cannot_be_deactivated() {
    let mut db = TestDatabase::default();
    let token = db.new_token("Rover.At");
    db.activate(token);
    db.commit(token);

    db.deactivate(token);
}

#[test]
fn restricting_base_domains_keeps_the_current_domains_for_good() {
    let mut db = TestDatabase::default();
    let token = db.new_token("Rover.At");
    let location = db.parameter(token, "location");
    let _ = db.restrict(location, &Domain::values([1, 2]));

    db.restrict_base_domains(token);
    db.relax(location);

    assert_eq!(&Domain::values([1, 2]), db.domain(location));
    assert_eq!(
        &Domain::values([1, 2]),
        db.engine().variable(location).base_domain()
    );
}

#[test]
fn rejected_tokens_can_always_be_terminated() {
    let mut db = TestDatabase::default();
    let token = db.new_token("Rover.At");
    db.reject(token);
    let _ = db.drain_notifications();

    assert!(db.can_be_terminated(token));
    db.terminate(token);

    assert!(db.token(token).is_terminated());
    assert!(!db.can_be_terminated(token));
    for &variable in db.token(token).variables() {
        assert!(!db.engine().variable(variable).is_active());
    }
    assert_eq!(vec![(token, TokenEvent::Terminated)], token_events(&mut db));
}

#[test]
fn tokens_linked_to_undecided_variables_cannot_be_terminated() {
    let mut db = TestDatabase::default();
    let token = db.new_token("Rover.At");
    let other = db.new_token("Rover.At");
    db.activate(token);
    let scope = [db.token(token).end(), db.token(other).start()];
    let precedence = db.add_constraint(LessThanEqual, &scope).unwrap();

    assert!(!db.can_be_terminated(token));

    db.remove_constraint(precedence);
    assert!(db.can_be_terminated(token));
}

#[test]
fn merged_tokens_can_be_terminated_once_the_active_token_is_committed() {
    let mut db = TestDatabase::default();
    let active = db.new_token("Rover.At");
    let merged = db.new_token("Rover.At");
    db.activate(active);
    db.merge(merged, active);
    assert!(!db.can_be_terminated(merged));
    assert!(!db.can_be_terminated(active));

    db.commit(active);

    assert!(db.can_be_terminated(merged));
    db.terminate(merged);
    assert!(db.token(merged).is_terminated());
}

#[test]
fn deleting_a_token_removes_it_with_its_variables() {
    let mut db = TestDatabase::default();
    let token = db.new_token("Rover.At");
    let variables = db.token(token).variables().to_vec();
    let _ = db.drain_notifications();

    db.delete_token(token);

    assert!(!db.contains_token(token));
    assert_eq!(0, db.tokens().count());
    for variable in variables {
        assert!(!db.engine().contains_variable(variable));
        assert!(db.token_variable(variable).is_none());
    }
    assert_eq!(vec![(token, TokenEvent::Removed)], token_events(&mut db));
}

#[test]
fn deleting_an_active_token_waits_for_the_tokens_merged_onto_it() {
    let mut db = TestDatabase::default();
    let active = db.new_token("Rover.At");
    let merged = db.new_token("Rover.At");
    db.activate(active);
    let start = db.token(merged).start();
    let limit = db.create_global_variable("limit", Domain::interval(0, 10));
    let original = db.add_constraint(LessThanEqual, &[start, limit]).unwrap();
    db.merge(merged, active);

    db.delete_token(active);
    assert!(db.contains_token(active));
    assert_eq!(1, db.token(active).ref_count());

    db.split(merged);

    assert!(!db.contains_token(active));
    assert_eq!(TokenState::Inactive, db.state(merged));
    assert!(db.is_valid(merged));
    assert_eq!(
        vec![original],
        db.engine()
            .constraints()
            .filter(|&constraint| !db.token(merged).is_standard_constraint(constraint))
            .collect::<Vec<_>>()
    );
    assert!(db.engine().constraint(original).is_active());
    assert!(db.propagate());
    assert_eq!(&Domain::interval(0, 10), db.domain(start));
}

#[test]
fn compatible_tokens_share_values_with_the_candidate() {
    let mut db = TestDatabase::default();
    let rover = db.new_token("Rover.At");
    let vehicle = db.new_token("Vehicle.At");
    let candidate = db.new_token("Rover.At");
    let general = db.new_token("Vehicle.At");
    db.activate(rover);
    db.activate(vehicle);

    assert_eq!(vec![rover], db.compatible_tokens(candidate, false));
    assert_eq!(vec![rover, vehicle], db.compatible_tokens(general, false));
    assert_eq!(vec![vehicle], db.compatible_tokens(general, true));

    let candidate_location = db.parameter(candidate, "location");
    let rover_location = db.parameter(rover, "location");
    db.specify(candidate_location, 3);
    db.specify(rover_location, 1);
    assert!(db.compatible_tokens(candidate, false).is_empty());
}

#[test]
fn purging_removes_every_token_silently() {
    let mut db = TestDatabase::default();
    let active = db.new_token("Rover.At");
    let merged = db.new_token("Rover.At");
    let _ = db.create_global_variable("limit", Domain::interval(0, 10));
    db.activate(active);
    db.merge(merged, active);
    db.commit(active);
    let _ = db.drain_notifications();

    db.purge();

    assert_eq!(0, db.tokens().count());
    assert_eq!(0, db.engine().variables().count());
    assert_eq!(0, db.engine().constraints().count());
    assert_eq!(0, db.global_variables().count());
    assert!(db.drain_notifications().is_empty());
    assert!(!db.is_purging());
    assert_eq!(3, db.objects().count());

    let token = db.new_token("Rover.At");
    assert!(token > merged);
}

#[test]
fn merges_splits_and_migrations_are_counted() {
    let mut db = TestDatabase::default();
    let active = db.new_token("Rover.At");
    let merged = db.new_token("Rover.At");
    let other = db.new_token("Rover.At");
    db.activate(active);
    let scope = [db.token(merged).end(), db.token(other).start()];
    let _ = db.add_constraint(LessThanEqual, &scope).unwrap();

    db.merge(merged, active);
    db.split(merged);
    db.merge(merged, active);
    db.log_statistics();

    assert_eq!(2, db.counters.num_merges);
    assert_eq!(1, db.counters.num_splits);
    assert_eq!(2, db.counters.num_migrated_constraints);
}

#![cfg(test)]
use crate::plan_database::test_helper::TestDatabase;
use crate::plan_database::TokenId;
use crate::plan_database::TokenState;

fn master_with_slave(db: &mut TestDatabase) -> (TokenId, TokenId) {
    let master = db.new_token("Rover.At");
    db.activate(master);
    let slave = db.new_slave(master, "Rover.Drive");
    (master, slave)
}

#[test]
fn slaves_are_recorded_on_their_master() {
    let mut db = TestDatabase::default();
    let (master, slave) = master_with_slave(&mut db);
    let second = db.new_slave(master, "Rover.At");

    assert_eq!(Some(slave), db.slave(master, 0));
    assert_eq!(Some(second), db.slave(master, 1));
    assert_eq!(None, db.slave(master, 2));
    assert_eq!(Some(1), db.slave_position(master, second));
    assert_eq!(Some(master), db.token(slave).master());
    assert_eq!(Some("before"), db.token(slave).relation());
    assert_eq!(TokenState::Inactive, db.state(slave));
}

#[test]
#[should_panic]
fn slaves_need_an_active_master() {
    let mut db = TestDatabase::default();
    let master = db.new_token("Rover.At");

    let _ = db.new_slave(master, "Rover.Drive");
}

#[test]
#[should_panic]
fn slaves_cannot_be_rejected() {
    let mut db = TestDatabase::default();
    let (_, slave) = master_with_slave(&mut db);

    db.reject(slave);
}

#[test]
fn deactivating_the_master_removes_its_slaves() {
    let mut db = TestDatabase::default();
    let (master, slave) = master_with_slave(&mut db);

    db.deactivate(master);

    assert!(!db.contains_token(slave));
    assert!(db.token(master).slaves().is_empty());
    assert!(db.is_valid(master));
}

#[test]
fn committed_slaves_outlive_their_master() {
    let mut db = TestDatabase::default();
    let (master, slave) = master_with_slave(&mut db);
    db.activate(slave);
    db.commit(slave);

    db.deactivate(master);

    assert!(db.contains_token(slave));
    assert_eq!(None, db.token(slave).master());
    assert_eq!(1, db.token(slave).ref_count());
    assert_eq!(TokenState::Active, db.state(slave));
    assert!(db.is_valid(slave));
}

#[test]
fn slaves_of_a_terminated_master_are_terminated_instead_of_removed() {
    let mut db = TestDatabase::default();
    let (master, slave) = master_with_slave(&mut db);
    assert!(db.can_be_terminated(master));
    db.terminate(master);

    assert!(db.remove_master(slave, master));

    assert!(db.contains_token(slave));
    assert!(db.token(slave).is_terminated());
    assert_eq!(None, db.token(slave).master());
    assert!(db.token(master).slaves().is_empty());
}

#[test]
fn removing_the_master_of_a_shared_slave_only_releases_it() {
    let mut db = TestDatabase::default();
    let (master, slave) = master_with_slave(&mut db);
    db.activate(slave);
    db.commit(slave);

    assert!(!db.remove_master(slave, master));
    assert!(db.contains_token(slave));
    assert!(!db.token(slave).is_terminated());
}

#[test]
fn deleting_a_slave_detaches_it_from_its_master() {
    let mut db = TestDatabase::default();
    let (master, slave) = master_with_slave(&mut db);

    db.delete_token(slave);

    assert!(!db.contains_token(slave));
    assert_eq!(None, db.slave_position(master, slave));
}

#[test]
fn deleting_the_master_cascades_to_its_slaves() {
    let mut db = TestDatabase::default();
    let (master, slave) = master_with_slave(&mut db);
    let grandchild = {
        db.activate(slave);
        db.new_slave(slave, "Rover.At")
    };

    db.delete_token(master);

    for token in [master, slave, grandchild] {
        assert!(!db.contains_token(token));
    }
    assert_eq!(0, db.tokens().count());
}

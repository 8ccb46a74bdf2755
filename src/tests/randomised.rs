#![cfg(test)]
//! Random plans over which merges are undone in reverse order; afterwards every domain and the
//! set of constraints must be exactly what it was before the first merge.
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;

use crate::engine::domains::Domain;
use crate::engine::ConstraintId;
use crate::plan_database::test_helper::TestDatabase;
use crate::plan_database::PlanDatabaseOptions;
use crate::plan_database::Token;
use crate::plan_database::TokenId;
use crate::plan_database::UnificationStrategy;
use crate::relations::arithmetic::LessThanEqual;
use crate::relations::Unary;

const NUM_TOKENS: usize = 5;

fn random_plan(db: &mut TestDatabase, rng: &mut SmallRng) -> Vec<TokenId> {
    let tokens: Vec<TokenId> = (0..NUM_TOKENS).map(|_| db.new_token("Rover.At")).collect();

    for _ in 0..8 {
        let token = tokens[rng.gen_range(0..tokens.len())];
        let index = rng.gen_range(Token::DURATION..=Token::END + 1);
        let variable = db.token(token).variables()[index];

        let domain = if index > Token::END {
            let mut values: Vec<i64> = (1..=3).filter(|_| rng.gen_bool(0.7)).collect();
            if values.is_empty() {
                values.push(rng.gen_range(1..=3));
            }
            Domain::values(values)
        } else {
            let lower_bound = rng.gen_range(0..60);
            Domain::interval(lower_bound, lower_bound + rng.gen_range(5..60))
        };
        let _ = db
            .add_constraint(Unary::new(domain), &[variable])
            .expect("unary constraints take one variable");
    }

    for _ in 0..3 {
        let before = tokens[rng.gen_range(0..tokens.len())];
        let after = tokens[rng.gen_range(0..tokens.len())];
        if before != after {
            let scope = [db.token(before).end(), db.token(after).start()];
            let _ = db
                .add_constraint(LessThanEqual, &scope)
                .expect("precedences take two variables");
        }
    }

    tokens
}

fn state_of(db: &TestDatabase, tokens: &[TokenId]) -> (Vec<Vec<Domain>>, Vec<ConstraintId>) {
    (
        tokens.iter().map(|&token| db.snapshot(token)).collect(),
        db.engine().constraints().collect(),
    )
}

fn merge_and_split_in_reverse(strategy: UnificationStrategy, seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut db = TestDatabase::with_options(PlanDatabaseOptions {
        unification: strategy,
        ..PlanDatabaseOptions::default()
    });
    let tokens = random_plan(&mut db, &mut rng);
    let active = tokens[0];
    db.activate(active);
    if !db.propagate() {
        return;
    }
    let before = state_of(&db, &tokens);

    let mut candidates = tokens[1..].to_vec();
    candidates.shuffle(&mut rng);
    let mut merged = vec![];
    for token in candidates {
        if !db.compatible_tokens(token, false).contains(&active) {
            continue;
        }
        db.merge(token, active);
        merged.push(token);
    }

    while let Some(token) = merged.pop() {
        db.split(token);
    }
    assert!(db.propagate(), "seed {seed} did not recover consistency");

    assert_eq!(before, state_of(&db, &tokens), "seed {seed}");
    for token in tokens {
        assert!(db.is_valid(token));
    }
}

#[test]
fn migrating_merges_are_undone_exactly() {
    for seed in 0..50 {
        merge_and_split_in_reverse(UnificationStrategy::Migrate, seed);
    }
}

#[test]
fn stacking_merges_are_undone_exactly() {
    for seed in 0..50 {
        merge_and_split_in_reverse(UnificationStrategy::Stack, seed);
    }
}

//! Claim races across independent database handles
//!
//! Each thread opens its own connection to the same file, the way separate
//! server processes would, and all threads start claiming at the same instant.

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use common::{TestEnv, addr, new_reward, seed_reward};
use guildhall::{ClaimError, Guildhall};

fn race(apps: Vec<(Guildhall, String)>, reward_id: i64) -> Vec<Result<(), ClaimError>> {
    let barrier = Arc::new(Barrier::new(apps.len()));
    let handles: Vec<_> = apps
        .into_iter()
        .map(|(app, address)| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                app.claim_reward(&address, reward_id).map(|_| ())
            })
        })
        .collect();

    handles
        .into_iter()
        .map(|h| h.join().expect("claim thread panicked"))
        .collect()
}

#[test]
fn test_same_user_double_claim_last_unit() {
    let env = TestEnv::new();
    let setup = env.instance();
    let reward_id = seed_reward(&setup, new_reward("Last hoodie", 10, 1));
    setup.award(&addr(1), 100, 100).unwrap();

    let apps = vec![(env.instance(), addr(1)), (env.instance(), addr(1))];
    let results = race(apps, reward_id);

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one claim must succeed: {results:?}");
    for loser in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            matches!(loser, ClaimError::AlreadyClaimed(_) | ClaimError::RewardExhausted(_)),
            "unexpected loser outcome: {loser:?}"
        );
    }

    let rewards = setup.list_rewards(None).unwrap();
    assert_eq!(rewards[0].reward.claimed, 1);
    assert_eq!(setup.profile(&addr(1)).unwrap().user.coins, 90);
    assert_eq!(setup.claims(&addr(1)).unwrap().len(), 1);
}

#[test]
fn test_five_users_five_units_then_sold_out() {
    let env = TestEnv::new();
    let setup = env.instance();
    let reward_id = seed_reward(&setup, new_reward("Genesis cap", 20, 5));
    for n in 1..=6 {
        setup.award(&addr(n), 50, 50).unwrap();
    }

    let apps = (1..=5).map(|n| (env.instance(), addr(n))).collect();
    let results = race(apps, reward_id);
    assert!(results.iter().all(|r| r.is_ok()), "all five must succeed: {results:?}");

    let err = setup.claim_reward(&addr(6), reward_id).unwrap_err();
    assert!(matches!(err, ClaimError::RewardExhausted(_)));
    assert_eq!(setup.profile(&addr(6)).unwrap().user.coins, 50);

    let reward = &setup.list_rewards(None).unwrap()[0];
    assert_eq!(reward.reward.claimed, 5);
    assert_eq!(reward.available, 0);
}

#[test]
fn test_oversubscribed_reward_never_oversells() {
    let env = TestEnv::new();
    let setup = env.instance();
    let reward_id = seed_reward(&setup, new_reward("Signed poster", 15, 3));
    for n in 1..=10 {
        setup.award(&addr(n), 15, 15).unwrap();
    }

    let apps = (1..=10).map(|n| (env.instance(), addr(n))).collect();
    let results = race(apps, reward_id);

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 3);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ClaimError::RewardExhausted(_)))
    );

    let spent: u64 = (1..=10)
        .map(|n| 15 - setup.profile(&addr(n)).unwrap().user.coins)
        .sum();
    assert_eq!(spent, 45);
    assert_eq!(setup.list_rewards(None).unwrap()[0].reward.claimed, 3);
}

#[test]
fn test_balance_race_across_two_rewards() {
    // One user, enough coins for only one of two rewards
    let env = TestEnv::new();
    let setup = env.instance();
    let sticker = seed_reward(&setup, new_reward("Sticker", 30, 10));
    let pin = seed_reward(&setup, new_reward("Pin", 30, 10));
    setup.award(&addr(1), 40, 40).unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = [sticker, pin]
        .into_iter()
        .map(|reward_id| {
            let app = env.instance();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                app.claim_reward(&addr(1), reward_id)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(ClaimError::InsufficientCoins { price: 30, balance: 10 })
    )));
    assert_eq!(setup.profile(&addr(1)).unwrap().user.coins, 10);
}

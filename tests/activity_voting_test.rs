//! Presence windows and the vote cooldown across instances

mod common;

use chrono::Duration;

use common::{TestEnv, addr};
use guildhall::Error;

#[test]
fn test_presence_is_shared_between_instances() {
    let env = TestEnv::new();
    let a = env.instance();
    let b = env.instance();

    a.ping_activity(&addr(1)).unwrap();
    b.ping_activity(&addr(2)).unwrap();
    assert_eq!(a.count_active_users(300).unwrap(), 2);

    b.clear_activity(&addr(1)).unwrap();
    assert_eq!(a.count_active_users(300).unwrap(), 1);
}

#[test]
fn test_count_excludes_and_clears_stale_users() {
    let env = TestEnv::new();
    let app = env.instance();

    app.ping_activity(&addr(1)).unwrap();
    env.clock.advance(Duration::seconds(200));
    app.ping_activity(&addr(2)).unwrap();

    env.clock.advance(Duration::seconds(101));
    assert_eq!(app.count_active_users(300).unwrap(), 1);
    assert_eq!(app.profile(&addr(1)).unwrap().user.last_active, None);
    assert!(app.profile(&addr(2)).unwrap().user.last_active.is_some());

    // Re-pinging brings the user back
    app.ping_activity(&addr(1)).unwrap();
    assert_eq!(app.count_active_users(300).unwrap(), 2);
}

#[test]
fn test_wider_window_still_counts() {
    let env = TestEnv::new();
    let app = env.instance();

    app.ping_activity(&addr(1)).unwrap();
    env.clock.advance(Duration::seconds(301));
    assert_eq!(app.count_active_users(600).unwrap(), 1);
    assert_eq!(app.count_active_users(300).unwrap(), 0);
}

#[test]
fn test_vote_cooldown_over_a_day() {
    let env = TestEnv::new();
    let a = env.instance();
    let b = env.instance();

    assert!(!a.is_voting_locked(&addr(1)).unwrap());
    a.record_vote(&addr(1)).unwrap();

    env.clock.advance(Duration::hours(23));
    assert!(b.is_voting_locked(&addr(1)).unwrap());
    assert!(matches!(
        b.record_vote(&addr(1)).unwrap_err(),
        Error::VotingLocked { .. }
    ));

    env.clock.advance(Duration::hours(2));
    assert!(!b.is_voting_locked(&addr(1)).unwrap());
    b.record_vote(&addr(1)).unwrap();

    // Other users are unaffected by someone else's vote
    assert!(!a.is_voting_locked(&addr(2)).unwrap());
}

//! Follow graph behavior against the in-memory store.

mod common;

use std::collections::HashSet;

use futures::TryStreamExt;
use test_context::test_context;

use crate::common::{artist, crowd, standard_user, MemoryHarness};
use gallery_core::common::{AccountId, Caller, ErrorKind, PageRequest, Role};
use gallery_core::domains::follows::FollowEvent;
use gallery_core::kernel::{SocialEvent, SocialStore};

// ============================================================================
// Follow / unfollow
// ============================================================================

#[test_context(MemoryHarness)]
#[tokio::test]
async fn double_follow_creates_one_edge(ctx: &MemoryHarness) {
    let (_, alice) = standard_user(&ctx.deps, "alice").await;
    let (bob, _) = artist(&ctx.deps, "bob").await;
    let follows = ctx.follows();

    let first = follows.follow(&alice, bob.id).await.unwrap();
    let second = follows.follow(&alice, bob.id).await.unwrap();

    assert_eq!(first.follower_count, 1);
    assert_eq!(first.following_count, 1);
    assert_eq!(second, first);
    assert_eq!(ctx.store.edge_count(), 1);

    // Only the edge that was actually created is announced.
    let events = ctx.notifier.events_for(bob.id);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        SocialEvent::Follow(FollowEvent::NewFollower { follower_id, .. }) if *follower_id == alice.account_id
    ));
}

#[test_context(MemoryHarness)]
#[tokio::test]
async fn unfollow_without_edge_is_a_no_op(ctx: &MemoryHarness) {
    let (_, alice) = standard_user(&ctx.deps, "alice").await;
    let (bob, bob_caller) = artist(&ctx.deps, "bob").await;
    let follows = ctx.follows();

    // Bob follows someone so his counters are non-zero.
    follows.follow(&bob_caller, alice.account_id).await.unwrap();

    let counts = follows.unfollow(&alice, bob.id).await.unwrap();
    assert_eq!(counts.follower_count, 0);
    assert_eq!(counts.following_count, 0);

    let bob_counts = follows.counts(&alice, bob.id).await.unwrap();
    assert_eq!(bob_counts.following_count, 1);
    assert_eq!(bob_counts.follower_count, 0);
}

#[test_context(MemoryHarness)]
#[tokio::test]
async fn follow_then_unfollow_restores_counts(ctx: &MemoryHarness) {
    let (alice, alice_caller) = standard_user(&ctx.deps, "alice").await;
    let (bob, _) = artist(&ctx.deps, "bob").await;
    let follows = ctx.follows();

    follows.follow(&alice_caller, bob.id).await.unwrap();
    let counts = follows.unfollow(&alice_caller, bob.id).await.unwrap();

    assert_eq!(counts.follower_count, 0);
    assert_eq!(counts.following_count, 0);
    assert_eq!(ctx.store.edge_count(), 0);

    let relationship = follows.relationship(&alice_caller, alice.id, bob.id).await.unwrap();
    assert!(!relationship.following);
    assert!(!relationship.followed_by);
}

#[test_context(MemoryHarness)]
#[tokio::test]
async fn self_follow_is_invalid(ctx: &MemoryHarness) {
    let (alice, caller) = standard_user(&ctx.deps, "alice").await;
    let follows = ctx.follows();

    let err = follows.follow(&caller, alice.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);

    let err = follows.unfollow(&caller, alice.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);

    assert_eq!(ctx.store.edge_count(), 0);
}

#[test_context(MemoryHarness)]
#[tokio::test]
async fn follow_unknown_account_is_not_found(ctx: &MemoryHarness) {
    let (_, alice) = standard_user(&ctx.deps, "alice").await;
    let ghost = AccountId::new();

    let err = ctx.follows().follow(&alice, ghost).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains(&ghost.to_string()));
}

#[test_context(MemoryHarness)]
#[tokio::test]
async fn unprovisioned_caller_is_unauthorized(ctx: &MemoryHarness) {
    let (bob, _) = artist(&ctx.deps, "bob").await;
    let stranger = Caller::new(AccountId::new(), Role::Standard);

    let err = ctx.follows().follow(&stranger, bob.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(ctx.store.edge_count(), 0);
}

#[test_context(MemoryHarness)]
#[tokio::test]
async fn relationship_reports_both_directions(ctx: &MemoryHarness) {
    let (alice, alice_caller) = standard_user(&ctx.deps, "alice").await;
    let (bob, _) = artist(&ctx.deps, "bob").await;
    let follows = ctx.follows();

    follows.follow(&alice_caller, bob.id).await.unwrap();

    let seen_by_alice = follows.relationship(&alice_caller, alice.id, bob.id).await.unwrap();
    assert!(seen_by_alice.following);
    assert!(!seen_by_alice.followed_by);

    let seen_by_bob = follows.relationship(&alice_caller, bob.id, alice.id).await.unwrap();
    assert!(!seen_by_bob.following);
    assert!(seen_by_bob.followed_by);
}

#[tokio::test]
async fn emitter_failure_does_not_fail_follow() {
    let ctx = MemoryHarness::with_failing_notifier();
    let (_, alice) = standard_user(&ctx.deps, "alice").await;
    let (bob, _) = artist(&ctx.deps, "bob").await;

    let counts = ctx.follows().follow(&alice, bob.id).await.unwrap();

    assert_eq!(counts.follower_count, 1);
    assert_eq!(ctx.notifier.event_count(), 1);
    assert!(ctx.store.edge_exists(alice.account_id, bob.id).await.unwrap());
}

#[test_context(MemoryHarness)]
#[tokio::test]
async fn elapsed_deadline_is_unavailable_and_writes_nothing(ctx: &MemoryHarness) {
    let (_, alice) = standard_user(&ctx.deps, "alice").await;
    let (bob, _) = artist(&ctx.deps, "bob").await;
    let expired = alice.clone().with_deadline(tokio::time::Instant::now());

    let err = ctx.follows().follow(&expired, bob.id).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(ctx.store.edge_count(), 0);
    assert_eq!(ctx.notifier.event_count(), 0);

    // The same caller without a deadline goes through.
    ctx.follows().follow(&alice, bob.id).await.unwrap();
}

// ============================================================================
// Listing
// ============================================================================

#[test_context(MemoryHarness)]
#[tokio::test]
async fn followers_page_most_recent_first(ctx: &MemoryHarness) {
    let (bob, bob_caller) = artist(&ctx.deps, "bob").await;
    let fans = crowd(&ctx.deps, "fan", 5).await;
    let follows = ctx.follows();

    for (_, fan) in &fans {
        follows.follow(fan, bob.id).await.unwrap();
    }

    let mut seen = Vec::new();
    let mut cursor = None;
    let mut pages = 0;
    loop {
        let page = follows
            .list_followers(&bob_caller, bob.id, &PageRequest::new(cursor, Some(2)))
            .await
            .unwrap();
        pages += 1;
        assert!(page.items.len() <= 2);
        seen.extend(page.items);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(pages, 3);
    let expected: Vec<AccountId> = fans.iter().rev().map(|(a, _)| a.id).collect();
    let actual: Vec<AccountId> = seen.iter().map(|s| s.account_id).collect();
    assert_eq!(actual, expected);
    assert!(seen.windows(2).all(|w| w[0].followed_at > w[1].followed_at));
    assert_eq!(seen[0].display_name, "fan-4");
}

#[test_context(MemoryHarness)]
#[tokio::test]
async fn listing_restarts_from_any_cursor(ctx: &MemoryHarness) {
    let (_, alice) = standard_user(&ctx.deps, "alice").await;
    let artists = crowd(&ctx.deps, "artist", 4).await;
    let follows = ctx.follows();

    for (account, _) in &artists {
        follows.follow(&alice, account.id).await.unwrap();
    }

    let first = follows
        .list_following(&alice, alice.account_id, &PageRequest::first(2))
        .await
        .unwrap();
    let cursor = first.next_cursor.clone().unwrap();

    let again = follows
        .list_following(&alice, alice.account_id, &PageRequest::new(Some(cursor.clone()), Some(2)))
        .await
        .unwrap();
    let once_more = follows
        .list_following(&alice, alice.account_id, &PageRequest::new(Some(cursor), Some(2)))
        .await
        .unwrap();

    assert_eq!(again.items, once_more.items);
    assert_eq!(again.items.len(), 2);
    assert!(again.next_cursor.is_none());

    let first_ids: HashSet<_> = first.items.iter().map(|s| s.account_id).collect();
    assert!(again.items.iter().all(|s| !first_ids.contains(&s.account_id)));
}

#[test_context(MemoryHarness)]
#[tokio::test]
async fn listing_validates_input(ctx: &MemoryHarness) {
    let (_, alice) = standard_user(&ctx.deps, "alice").await;
    let follows = ctx.follows();

    let err = follows
        .list_followers(&alice, AccountId::new(), &PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = follows
        .list_followers(
            &alice,
            alice.account_id,
            &PageRequest::new(Some("definitely-not-a-cursor".into()), None),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);

    let empty = follows
        .list_followers(&alice, alice.account_id, &PageRequest::default())
        .await
        .unwrap();
    assert!(empty.items.is_empty());
    assert!(empty.next_cursor.is_none());
}

#[test_context(MemoryHarness)]
#[tokio::test]
async fn followers_stream_yields_every_follower(ctx: &MemoryHarness) {
    let (bob, bob_caller) = artist(&ctx.deps, "bob").await;
    let fans = crowd(&ctx.deps, "fan", 7).await;
    let follows = ctx.follows();

    for (_, fan) in &fans {
        follows.follow(fan, bob.id).await.unwrap();
    }

    let streamed: Vec<_> = follows
        .followers_stream(bob_caller.clone(), bob.id, Some(3))
        .try_collect()
        .await
        .unwrap();
    assert_eq!(streamed.len(), 7);
    assert_eq!(streamed[0].account_id, fans[6].0.id);

    let none: Vec<_> = follows
        .following_stream(bob_caller, bob.id, Some(3))
        .try_collect()
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[test_context(MemoryHarness)]
#[tokio::test]
async fn stream_surfaces_errors(ctx: &MemoryHarness) {
    let (_, alice) = standard_user(&ctx.deps, "alice").await;

    let result: Result<Vec<_>, _> = ctx
        .follows()
        .followers_stream(alice, AccountId::new(), None)
        .try_collect()
        .await;
    assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test_context(MemoryHarness)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_follows_create_one_edge(ctx: &MemoryHarness) {
    let (_, alice) = standard_user(&ctx.deps, "alice").await;
    let (bob, _) = artist(&ctx.deps, "bob").await;
    let bob_id = bob.id;

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let follows = ctx.follows();
            let alice = alice.clone();
            tokio::spawn(async move { follows.follow(&alice, bob_id).await })
        })
        .collect();

    for task in tasks {
        let counts = task.await.unwrap().unwrap();
        assert_eq!(counts.follower_count, 1);
    }

    assert_eq!(ctx.store.edge_count(), 1);
    assert_eq!(ctx.notifier.events_for(bob.id).len(), 1);
}

#[test_context(MemoryHarness)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_follows_and_unfollows_keep_counts_exact(ctx: &MemoryHarness) {
    const N: usize = 40;
    const M: usize = 15;

    let (bob, bob_caller) = artist(&ctx.deps, "bob").await;
    let fans = crowd(&ctx.deps, "fan", N).await;
    let follows = ctx.follows();

    // The first M fans already follow; they unfollow while the rest follow.
    for (_, fan) in fans.iter().take(M) {
        follows.follow(fan, bob.id).await.unwrap();
    }

    let mut tasks = Vec::new();
    for (i, (_, fan)) in fans.iter().enumerate() {
        let follows = follows.clone();
        let fan = fan.clone();
        let bob_id = bob.id;
        tasks.push(tokio::spawn(async move {
            if i < M {
                follows.unfollow(&fan, bob_id).await
            } else {
                follows.follow(&fan, bob_id).await
            }
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let counts = follows.counts(&bob_caller, bob.id).await.unwrap();
    assert_eq!(counts.follower_count, (N - M) as i64);

    let listed: Vec<_> = follows
        .followers_stream(bob_caller.clone(), bob.id, Some(100))
        .try_collect()
        .await
        .unwrap();
    assert_eq!(listed.len(), N - M);

    for (account, fan) in &fans {
        let expected = if fans.iter().take(M).any(|(a, _)| a.id == account.id) { 0 } else { 1 };
        assert_eq!(follows.counts(fan, account.id).await.unwrap().following_count, expected);
    }

    assert!(ctx.store.find_count_drift().await.unwrap().is_empty());
}

#[test_context(MemoryHarness)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn interleaved_follow_unfollow_on_one_pair_stays_consistent(ctx: &MemoryHarness) {
    let (_, alice) = standard_user(&ctx.deps, "alice").await;
    let (bob, bob_caller) = artist(&ctx.deps, "bob").await;
    let bob_id = bob.id;

    let tasks: Vec<_> = (0..50)
        .map(|i| {
            let follows = ctx.follows();
            let alice = alice.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    follows.follow(&alice, bob_id).await
                } else {
                    follows.unfollow(&alice, bob_id).await
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let live = ctx.store.edge_count() as i64;
    let counts = ctx.follows().counts(&bob_caller, bob.id).await.unwrap();
    assert_eq!(counts.follower_count, live);
    assert!(ctx.store.find_count_drift().await.unwrap().is_empty());
}

// ============================================================================
// Reconciliation
// ============================================================================

#[test_context(MemoryHarness)]
#[tokio::test]
async fn reconcile_reports_and_repairs_drift(ctx: &MemoryHarness) {
    use gallery_core::domains::follows::activities::reconcile_counts;

    let (_, alice) = standard_user(&ctx.deps, "alice").await;
    let (bob, bob_caller) = artist(&ctx.deps, "bob").await;
    ctx.follows().follow(&alice, bob.id).await.unwrap();

    let clean = reconcile_counts(&ctx.deps, false).await.unwrap();
    assert!(clean.drifted.is_empty());

    ctx.store.force_counts(bob.id, 42, 0);

    let report = reconcile_counts(&ctx.deps, false).await.unwrap();
    assert_eq!(report.drifted.len(), 1);
    assert_eq!(report.drifted[0].cached_followers, 42);
    assert_eq!(report.drifted[0].live_followers, 1);
    // Check-only leaves the bad value in place.
    assert_eq!(ctx.follows().counts(&bob_caller, bob.id).await.unwrap().follower_count, 42);

    let repaired = reconcile_counts(&ctx.deps, true).await.unwrap();
    assert!(repaired.repaired);
    assert_eq!(ctx.follows().counts(&bob_caller, bob.id).await.unwrap().follower_count, 1);
    assert!(reconcile_counts(&ctx.deps, false).await.unwrap().drifted.is_empty());
}

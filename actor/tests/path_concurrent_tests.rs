// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! Tests for ActorPath edge cases and concurrent scenarios

use actor::{ActorPath, ActorSystem, Behavior, Error, Props, SystemConfig};
use tokio_util::sync::CancellationToken;

// Test ActorPath edge cases
#[test]
fn test_actor_path_edge_cases() {
    let root = ActorPath::new_root("edge", "0");
    assert!(root.is_root());
    assert_eq!(root.level(), 0);
    assert_eq!(root.to_string(), "rook://edge");

    // Deep path
    let user = root.add("user", "1").unwrap();
    let parent = user.add("parent", "2").unwrap();
    let child = parent.add("child", "3").unwrap();
    let grandchild = child.add("grandchild", "4").unwrap();
    assert_eq!(grandchild.level(), 4);
    assert_eq!(grandchild.root(), root);
    assert_eq!(
        grandchild.to_string(),
        "rook://edge/user/parent/child/grandchild"
    );
    assert!(user.is_ancestor_of(&grandchild));
    assert!(grandchild.is_descendant_of(&root));
    assert!(!grandchild.is_ancestor_of(&user));
    assert!(!child.is_parent_of(&child));

    // Disposing a middle node keeps its subtree reachable from below.
    parent.dispose();
    assert!(user.get("parent").is_none());
    assert_eq!(grandchild.parent(), Some(child.clone()));
}

#[test]
fn test_same_name_different_parents() {
    let root = ActorPath::new_root("edge", "0");
    let left = root.add("left", "1").unwrap();
    let right = root.add("right", "2").unwrap();

    let a = left.add("worker", "3").unwrap();
    let b = right.add("worker", "4").unwrap();
    assert_ne!(a, b);
    assert_eq!(a.name(), b.name());
    assert!(a.is_child_of(&left));
    assert!(!a.is_child_of(&right));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_spawn_same_name() {
    let (system, _runner) =
        ActorSystem::create(SystemConfig::default(), CancellationToken::new()).unwrap();

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let system = system.clone();
        tasks.push(tokio::spawn(async move {
            system.spawn(Props::stateless(Behavior::ignore()).named("contested"))
        }));
    }

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap());
    }
    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    for result in &results {
        if let Err(error) = result {
            assert_eq!(*error, Error::Exists("rook://rook/user/contested".to_owned()));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_spawn_distinct_names() {
    let (system, _runner) =
        ActorSystem::create(SystemConfig::default(), CancellationToken::new()).unwrap();

    let mut tasks = Vec::new();
    for i in 0..16 {
        let system = system.clone();
        tasks.push(tokio::spawn(async move {
            system.spawn(Props::stateless(Behavior::ignore()).named(format!("worker-{}", i)))
        }));
    }
    let mut actors = Vec::new();
    for task in tasks {
        actors.push(task.await.unwrap().unwrap());
    }

    let user = system.user_root().unwrap();
    assert_eq!(user.path().children().len(), 16);
    for actor in &actors {
        assert!(actor.path().is_child_of(user.path()));
    }
}

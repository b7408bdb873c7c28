// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! Edge case tests for the actor module: failing starts, receive timeouts and late
//! messages.

use actor::{
    ActorContext, ActorIdentity, ActorSystem, Behavior, Error, Hooks, Identify, Props,
    ReceiveTimeout, SystemConfig,
};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use std::time::Duration;

#[tokio::test]
async fn test_pre_start_failure_aborts_spawn() {
    let (system, _runner) =
        ActorSystem::create(SystemConfig::default(), CancellationToken::new()).unwrap();

    let hooks = Hooks::new().pre_start(|_| Err(Error::Functional("no database".to_owned())));
    let result = system.spawn(Props::stateless(Behavior::ignore()).named("broken").hooks(hooks));

    match result {
        Err(Error::Start(reason)) => {
            assert!(reason.contains("rook://rook/user/broken"));
            assert!(reason.contains("no database"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    let user = system.user_root().unwrap();
    assert!(user.path().get("broken").is_none());

    // The name is free again.
    system
        .spawn(Props::stateless(Behavior::ignore()).named("broken"))
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_idle_actor_stops_itself() {
    let (system, _runner) =
        ActorSystem::create(SystemConfig::default(), CancellationToken::new()).unwrap();
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let behavior = Behavior::<()>::new().on(
        move |ctx: ActorContext<()>, state, ReceiveTimeout(after)| {
            let sender = sender.clone();
            async move {
                let _ = sender.send(after);
                ctx.stop(Some("idle".to_owned()));
                Ok(state)
            }
        },
    );
    let actor = system
        .spawn(Props::stateless(behavior).receive_timeout(Duration::from_millis(200)))
        .unwrap();

    let start = tokio::time::Instant::now();
    actor.terminated().await;
    assert!(start.elapsed() >= Duration::from_millis(200));
    assert_eq!(receiver.recv().await, Some(Duration::from_millis(200)));
    assert!(receiver.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_receive_timeout_can_be_cleared() {
    let (system, _runner) =
        ActorSystem::create(SystemConfig::default(), CancellationToken::new()).unwrap();
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let behavior = Behavior::<u32>::new().on(
        move |ctx: ActorContext<u32>, fired, _: ReceiveTimeout| {
            let sender = sender.clone();
            async move {
                let _ = sender.send(fired + 1);
                ctx.set_receive_timeout(None);
                Ok(fired + 1)
            }
        },
    );
    system
        .spawn(Props::new(behavior, 0).receive_timeout(Duration::from_millis(50)))
        .unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(receiver.recv().await, Some(1));
    assert!(receiver.try_recv().is_err());
}

#[tokio::test]
async fn test_identify_stopped_actor_times_out() {
    let (system, _runner) =
        ActorSystem::create(SystemConfig::default(), CancellationToken::new()).unwrap();
    let actor = system
        .spawn(Props::stateless(Behavior::<()>::new().on(
            |ctx: ActorContext<()>, state, _: String| async move {
                ctx.stop(None);
                Ok(state)
            },
        )))
        .unwrap();

    let identity: ActorIdentity = actor
        .ask_as(Identify("first".to_owned()), Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(identity.actor, actor);

    actor.send("stop".to_owned());
    actor.terminated().await;
    assert!(actor.is_terminated());

    let timeout = Duration::from_millis(50);
    let late = actor.ask(Identify("second".to_owned()), timeout).await;
    assert_eq!(late.unwrap_err(), Error::TimedOut(timeout));
}

#[tokio::test]
async fn test_spawn_from_stopping_actor_fails() {
    let (system, _runner) =
        ActorSystem::create(SystemConfig::default(), CancellationToken::new()).unwrap();
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let behavior = Behavior::<()>::new().on(move |ctx: ActorContext<()>, state, _: u8| {
        let sender = sender.clone();
        async move {
            ctx.stop(None);
            let spawned = ctx.spawn(Props::stateless(Behavior::ignore()));
            let _ = sender.send(spawned.map(|_| ()));
            Ok(state)
        }
    });
    let actor = system.spawn(Props::stateless(behavior)).unwrap();
    actor.send(1_u8);

    match receiver.recv().await.unwrap() {
        Err(Error::Terminated(path)) => assert_eq!(path, actor.path().to_string()),
        other => panic!("unexpected result: {:?}", other),
    }
}

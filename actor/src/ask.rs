// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Ask pattern
//!
//! Request and reply on top of plain message passing. A helper actor named `asker-<id>` is
//! spawned under `/user` with a receive timeout equal to the deadline. On start it sends the
//! request to the target as itself, so the target's reply lands in the helper's mailbox. The
//! first message resolves the pending result; its own receive timeout rejects it. Either way
//! the helper stops right after.
//!

use crate::{
    actor::lock, ActorContext, ActorRef, AnyMessage, Behavior, Error, Hooks, Props,
    ReceiveTimeout,
};

use futures::{future::BoxFuture, FutureExt};
use tokio::sync::oneshot;

use tracing::debug;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

type Outcome = Result<AnyMessage, Error>;

/// Where the helper puts the outcome. Taken exactly once.
type Pending = Arc<Mutex<Option<oneshot::Sender<Outcome>>>>;

fn resolve(pending: &Pending, outcome: Outcome) {
    if let Some(sender) = lock(pending).take() {
        // The caller may have given up on the reply.
        let _ = sender.send(outcome);
    }
}

fn asker() -> Behavior<Pending> {
    Behavior::new().otherwise(
        |ctx: ActorContext<Pending>, pending: Pending, message: AnyMessage| async move {
            match message.downcast_ref::<ReceiveTimeout>() {
                Some(ReceiveTimeout(after)) if ctx.sender() == ctx.myself() => {
                    debug!("Ask {} timed out after {:?}.", ctx.path(), after);
                    resolve(&pending, Err(Error::TimedOut(*after)));
                }
                _ => resolve(&pending, Ok(message)),
            }
            ctx.stop(None);
            Ok(pending)
        },
    )
}

/// Sends `message` to `target` through a helper and resolves with the first reply.
pub(crate) fn ask(
    target: &ActorRef,
    message: AnyMessage,
    timeout: Duration,
) -> BoxFuture<'static, Result<AnyMessage, Error>> {
    let system = target.system().clone();
    let (sender, receiver) = oneshot::channel();
    let pending: Pending = Arc::new(Mutex::new(Some(sender)));

    let request = target.clone();
    let hooks = Hooks::new().pre_start(move |helper| {
        request.tell(message.clone(), helper);
        Ok(())
    });
    let props = Props::new(asker(), pending)
        .named(format!("asker-{}", system.next_id()))
        .receive_timeout(timeout)
        .hooks(hooks);
    let spawned = system.spawn(props);

    async move {
        spawned?;
        receiver
            .await
            .map_err(|e| Error::Receive(e.to_string()))?
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{ActorSystem, Identify, ActorIdentity, SystemConfig};

    use tokio_util::sync::CancellationToken;

    #[derive(Debug, Clone)]
    struct Double(u32);

    #[derive(Debug, Clone)]
    struct Ignored;

    fn doubler() -> Behavior<()> {
        Behavior::new()
            .on(|ctx: ActorContext<()>, state, Double(n)| async move {
                ctx.reply(n * 2);
                Ok(state)
            })
            .on(|_, state, _: Ignored| async move { Ok(state) })
    }

    #[tokio::test]
    async fn test_ask_reply() {
        let (system, _runner) =
            ActorSystem::create(SystemConfig::default(), CancellationToken::new())
                .unwrap();
        let target = system.spawn(Props::stateless(doubler())).unwrap();

        let reply: u32 = target
            .ask_as(Double(21), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply, 42);

        let reply = target.ask(Double(2), Duration::from_secs(1)).await.unwrap();
        assert_eq!(reply.downcast::<u32>(), Some(4));
    }

    #[tokio::test]
    async fn test_ask_unexpected_reply() {
        let (system, _runner) =
            ActorSystem::create(SystemConfig::default(), CancellationToken::new())
                .unwrap();
        let target = system.spawn(Props::stateless(doubler())).unwrap();

        let reply = target
            .ask_as::<_, String>(Double(1), Duration::from_secs(1))
            .await;
        assert!(matches!(reply, Err(Error::UnexpectedReply(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ask_timeout_stops_helper() {
        let (system, _runner) =
            ActorSystem::create(SystemConfig::default(), CancellationToken::new())
                .unwrap();
        let target = system.spawn(Props::stateless(doubler()).named("silent")).unwrap();
        let timeout = Duration::from_millis(50);

        let start = tokio::time::Instant::now();
        let reply = target.ask(Ignored, timeout).await;
        assert_eq!(reply.unwrap_err(), Error::TimedOut(timeout));
        assert!(start.elapsed() >= timeout);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let user = system.user_root().unwrap();
        assert_eq!(user.path().children(), vec!["silent".to_owned()]);
    }

    #[tokio::test]
    async fn test_identify() {
        let (system, _runner) =
            ActorSystem::create(SystemConfig::default(), CancellationToken::new())
                .unwrap();
        let target = system.spawn(Props::stateless(doubler())).unwrap();

        let identity: ActorIdentity = target
            .ask_as(Identify("who".to_owned()), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(identity.actor, target);
        assert_eq!(identity.id, "who");
    }
}

use std::panic::AssertUnwindSafe;

use actor::{Actor, SupervisionStrategy};
use actor_ref::{ActorRef, WeakActorRef};
use futures::FutureExt;
use mailbox::bounded_mailbox;

pub mod actor;
pub mod actor_ref;
pub mod handler;
pub mod mailbox;

/// Creates and runs an actor. If the actor panics, it is either restared, resumed
/// or stoped acording to the behavior specified by `Actor::on_fail()`.
///
/// The factory receives a weak reference to the actor itself, which the actor
/// may keep to send messages to itself from spawned tasks. The actor stops
/// once every strong `ActorRef` was dropped.
pub fn run<A, F>(actor_factory: F) -> ActorRef<A>
where
    A: Actor,
    F: 'static + Send + Fn(WeakActorRef<A>) -> A,
{
    run_with_capacity(mailbox::DEFAULT_CAPACITY, actor_factory)
}

pub fn run_with_capacity<A, F>(capacity: usize, actor_factory: F) -> ActorRef<A>
where
    A: Actor,
    F: 'static + Send + Fn(WeakActorRef<A>) -> A,
{
    let (tx, mut rx) = bounded_mailbox(capacity);
    let actor_ref = ActorRef::new(tx);
    let weak_ref = actor_ref.downgrade();
    let mut actor = actor_factory(weak_ref.clone());

    // run actor
    tokio::spawn(async move {
        while let Some(mut message) = rx.recv().await {
            // handle message
            let result = AssertUnwindSafe(message.handle(&mut actor))
                .catch_unwind()
                .await;
            // handler paniced?
            if let Err(why) = result {
                log::error!("actor paniced: {:?}", why);
                match actor.on_fail(why) {
                    SupervisionStrategy::Restart => {
                        actor = actor_factory(weak_ref.clone());
                    }
                    SupervisionStrategy::Resume => {}
                    SupervisionStrategy::Stop => {
                        break;
                    }
                };
            }
        }
        log::debug!("actor stopped");
    });

    actor_ref
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        actor::ActorError,
        handler::{Handler, Message},
    };

    struct Counter {
        count: i64,
    }

    impl Actor for Counter {
        fn on_fail(&mut self, _: Box<dyn Any + Send>) -> SupervisionStrategy {
            SupervisionStrategy::Restart
        }
    }

    struct Add(i64);

    impl Message for Add {
        type Response = ();
    }

    struct Get;

    impl Message for Get {
        type Response = i64;
    }

    struct Explode;

    impl Message for Explode {
        type Response = ();
    }

    #[async_trait]
    impl Handler<Add> for Counter {
        async fn handle(&mut self, message: Add) {
            self.count += message.0;
        }
    }

    #[async_trait]
    impl Handler<Get> for Counter {
        async fn handle(&mut self, _: Get) -> i64 {
            self.count
        }
    }

    #[async_trait]
    impl Handler<Explode> for Counter {
        async fn handle(&mut self, _: Explode) {
            panic!("boom");
        }
    }

    #[tokio::test]
    async fn tell_and_ask_are_processed_in_order() {
        let counter = run(|_| Counter { count: 0 });
        counter.tell(Add(1)).await.unwrap();
        counter.tell(Add(5)).await.unwrap();
        counter.tell(Add(-2)).await.unwrap();
        assert_eq!(counter.ask(Get).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn panicking_handler_restarts_the_actor() {
        let counter = run(|_| Counter { count: 0 });
        counter.tell(Add(3)).await.unwrap();
        assert_eq!(counter.ask(Explode).await, Err(ActorError::NoResponse));
        assert_eq!(counter.ask(Get).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn weak_ref_does_not_keep_the_actor_alive() {
        let counter = run(|_| Counter { count: 0 });
        let weak = counter.downgrade();
        assert!(weak.upgrade().is_some());
        drop(counter);
        assert!(weak.upgrade().is_none());
    }
}

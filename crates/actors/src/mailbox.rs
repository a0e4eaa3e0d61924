use tokio::sync::mpsc;

use crate::{handler::MessageHandler, Actor};

pub const DEFAULT_CAPACITY: usize = 32;

pub(crate) type Envelope<A> = Box<dyn MessageHandler<A>>;

pub(crate) struct Mailbox<A: Actor>(pub(crate) mpsc::Sender<Envelope<A>>);

impl<A: Actor> Clone for Mailbox<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

pub(crate) struct WeakMailbox<A: Actor>(pub(crate) mpsc::WeakSender<Envelope<A>>);

impl<A: Actor> Clone for WeakMailbox<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

pub(crate) struct MailboxReceiver<A: Actor>(mpsc::Receiver<Envelope<A>>);

impl<A: Actor> MailboxReceiver<A> {
    pub(crate) async fn recv(&mut self) -> Option<Envelope<A>> {
        self.0.recv().await
    }
}

pub(crate) fn bounded_mailbox<A: Actor>(buffer: usize) -> (Mailbox<A>, MailboxReceiver<A>) {
    let (tx, rx) = mpsc::channel(buffer);
    (Mailbox(tx), MailboxReceiver(rx))
}

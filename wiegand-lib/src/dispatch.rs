use crate::decode::{Failure, Message};

type ReceiveHandler = Box<dyn FnMut(&Message) + Send>;
type ErrorHandler = Box<dyn FnMut(&Failure) + Send>;
type StateHandler = Box<dyn FnMut(bool) + Send>;

/// Registered handlers, at most one per event.
///
/// Each handler owns the context it was registered with and gets `&mut` access to it on every
/// call. The dispatcher never looks at the context. Boxing happens at registration; firing an
/// event does not allocate.
#[derive(Default)]
pub struct Dispatcher {
    receive: Option<ReceiveHandler>,
    error: Option<ErrorHandler>,
    state: Option<StateHandler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_receive<C, F>(&mut self, mut handler: F, mut context: C)
    where
        F: FnMut(&Message, &mut C) + Send + 'static,
        C: Send + 'static,
    {
        self.receive = Some(Box::new(move |message: &Message| handler(message, &mut context)));
    }

    pub fn on_receive_error<C, F>(&mut self, mut handler: F, mut context: C)
    where
        F: FnMut(&Failure, &mut C) + Send + 'static,
        C: Send + 'static,
    {
        self.error = Some(Box::new(move |failure: &Failure| handler(failure, &mut context)));
    }

    pub fn on_state_change<C, F>(&mut self, mut handler: F, mut context: C)
    where
        F: FnMut(bool, &mut C) + Send + 'static,
        C: Send + 'static,
    {
        self.state = Some(Box::new(move |connected: bool| handler(connected, &mut context)));
    }

    /// Reports a finished frame: exactly one of receive/error is invoked.
    pub fn dispatch(&mut self, result: &Result<Message, Failure>) {
        match result {
            Ok(message) => self.received(message),
            Err(failure) => self.failed(failure),
        }
    }

    pub fn received(&mut self, message: &Message) {
        if let Some(handler) = self.receive.as_mut() {
            handler(message);
        }
    }

    pub fn failed(&mut self, failure: &Failure) {
        if let Some(handler) = self.error.as_mut() {
            handler(failure);
        }
    }

    pub fn state_changed(&mut self, connected: bool) {
        if let Some(handler) = self.state.as_mut() {
            handler(connected);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("receive", &self.receive.is_some())
            .field("error", &self.error.is_some())
            .field("state", &self.state.is_some())
            .finish()
    }
}

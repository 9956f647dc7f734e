//! Message-listener contract for control-plane traffic.
//!
//! The message environment itself (registration, dispatch, transport) is the
//! embedding runtime's concern; runtime passes only reference this surface.

/// One-shot reply channel handed to request handlers.
pub trait MessageContext {
    type Reply;

    /// Deliver the response. Consumes the context: a request is answered at
    /// most once.
    fn reply(self, reply: Self::Reply);
}

/// Handles messages of one type. Listeners are registered in a message
/// environment under a message-type id unique within that environment.
pub trait MessageListener<T> {
    type Reply;

    /// Fire-and-forget delivery.
    fn on_send(&mut self, message: T);

    /// Request/response delivery; answer through `ctx`.
    fn on_request<C: MessageContext<Reply = Self::Reply>>(&mut self, message: T, ctx: C);
}

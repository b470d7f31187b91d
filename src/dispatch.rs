//! Front-door for chat integrations: route a message, then run it if delegated.

use crate::bridge::{CommandRunner, ExecuteOptions, ExecutionBridge, ExecutionResult, ProcessInvoker};
use crate::routing::{Router, RoutingDecision};
use tracing::info;

/// What happened to a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Not for the agent; the caller should answer it.
    Direct(RoutingDecision),
    /// Sent to the agent.
    Delegated {
        decision: RoutingDecision,
        result: ExecutionResult,
    },
}

impl Reply {
    /// Text to send back, or `None` when the caller should handle the message.
    pub fn text(&self) -> Option<String> {
        match self {
            Reply::Direct(_) => None,
            Reply::Delegated { result, .. } => Some(result.reply_text()),
        }
    }

    pub fn decision(&self) -> &RoutingDecision {
        match self {
            Reply::Direct(decision) => decision,
            Reply::Delegated { decision, .. } => decision,
        }
    }
}

/// Router plus bridge. Authorization is the caller's job and happens before
/// a message gets here.
pub struct Dispatcher<R: CommandRunner = ProcessInvoker> {
    router: Router,
    bridge: ExecutionBridge<R>,
    restricted: bool,
    options: ExecuteOptions,
}

impl<R: CommandRunner> Dispatcher<R> {
    pub fn new(router: Router, bridge: ExecutionBridge<R>) -> Self {
        Self {
            router,
            bridge,
            restricted: false,
            options: ExecuteOptions::default(),
        }
    }

    /// Send every delegated message through the read-only capability set.
    pub fn restricted(mut self, restricted: bool) -> Self {
        self.restricted = restricted;
        self
    }

    /// Options applied to every delegated run.
    pub fn options(mut self, options: ExecuteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn bridge(&self) -> &ExecutionBridge<R> {
        &self.bridge
    }

    /// Route `message` and, if it belongs to the agent, execute it for `user_id`.
    pub fn handle(&self, message: &str, user_id: &str) -> Reply {
        let decision = self.router.route(message);
        if !decision.use_delegate {
            info!(user_id, reason = %decision.reason, "message left for direct handling");
            return Reply::Direct(decision);
        }

        info!(user_id, confidence = decision.confidence, "delegating message to agent");
        let result = self.execute(message, user_id);
        Reply::Delegated { decision, result }
    }

    /// Run `message` through the agent without routing it first.
    pub fn execute(&self, message: &str, user_id: &str) -> ExecutionResult {
        if self.restricted {
            self.bridge
                .execute_restricted(message, user_id, &self.options)
        } else {
            self.bridge.execute(message, user_id, &self.options)
        }
    }
}

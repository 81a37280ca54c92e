// Copyright (c) 2025 - Cowboy AI, Inc.
//! Request Flow State Machine
//!
//! The path one client request takes through the declared ingress. The
//! realized infrastructure enforces this; the model exists so the declared
//! policy can be exercised without deploying it.
//!
//! # State Machine Type
//!
//! This is a **Mealy Machine**: outputs depend on both state and input.
//!
//! # States
//!
//! ```text
//! Received ──Inspect──> Filtered ──AllowListVerdict(false)──> Blocked
//!     ^                    │
//!     │          AllowListVerdict(true)
//!     │                    ▼
//!     │           AuthenticationCheck ──SessionVerdict(true)──> Forwarded
//!     │                    │
//!     │           SessionVerdict(false)
//!     │                    ▼
//!     └──LoginCompleted── RedirectToLogin
//! ```
//!
//! `Blocked` and `Forwarded` are terminal. `RedirectToLogin` ends the
//! current request; once the identity provider completes the flow the
//! browser resubmits and the request starts over at `Received`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

use super::{StateMachine, TransitionError, TransitionResult};
use crate::layers::ingress::{FilterAction, FilteringPolicy, IngressDeclaration};

/// Where a request is on its way through the ingress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Received,
    /// Under evaluation by the web ACL
    Filtered,
    Blocked,
    /// Passed the allow-list; the listener checks for a session
    AuthenticationCheck,
    RedirectToLogin,
    Forwarded,
}

impl RequestState {
    /// No input is accepted from here
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Blocked | RequestState::Forwarded)
    }

    /// Whether the current request has received its response
    pub fn is_settled(&self) -> bool {
        self.is_terminal() || *self == RequestState::RedirectToLogin
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestState::Received => "received",
            RequestState::Filtered => "filtered",
            RequestState::Blocked => "blocked",
            RequestState::AuthenticationCheck => "authentication-check",
            RequestState::RedirectToLogin => "redirect-to-login",
            RequestState::Forwarded => "forwarded",
        };
        write!(f, "{name}")
    }
}

/// Inputs observed along the request path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestInput {
    /// The web ACL picks up the request
    Inspect,
    /// Whether the source matched the allow-list
    AllowListVerdict(bool),
    /// Whether the request carries a valid session
    SessionVerdict(bool),
    /// The identity provider finished sign-in and the browser resubmits
    LoginCompleted,
}

/// What the client sees as a result of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Still inside the ingress
    Pending,
    /// Refused by the web ACL
    Rejected,
    /// Sent to the hosted sign-in page
    LoginRequired,
    /// Delivered to the target group
    Delivered,
}

impl StateMachine for RequestState {
    type Input = RequestInput;
    type Output = RequestOutcome;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use RequestInput::*;
        use RequestState::*;

        match (self, input) {
            (Blocked, _) | (Forwarded, _) => Err(TransitionError::Terminal(self.to_string())),

            (Received, Inspect) => Ok((Filtered, RequestOutcome::Pending)),

            (Filtered, AllowListVerdict(true)) => Ok((AuthenticationCheck, RequestOutcome::Pending)),
            (Filtered, AllowListVerdict(false)) => Ok((Blocked, RequestOutcome::Rejected)),

            (AuthenticationCheck, SessionVerdict(true)) => Ok((Forwarded, RequestOutcome::Delivered)),
            (AuthenticationCheck, SessionVerdict(false)) => {
                Ok((RedirectToLogin, RequestOutcome::LoginRequired))
            }

            (RedirectToLogin, LoginCompleted) => Ok((Received, RequestOutcome::Pending)),

            (from, input) => Err(TransitionError::InvalidTransition {
                from: from.to_string(),
                input: format!("{input:?}"),
            }),
        }
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        use RequestInput::*;
        use RequestState::*;

        match self {
            Received => vec![Inspect],
            Filtered => vec![AllowListVerdict(true), AllowListVerdict(false)],
            AuthenticationCheck => vec![SessionVerdict(true), SessionVerdict(false)],
            RedirectToLogin => vec![LoginCompleted],
            Blocked | Forwarded => vec![],
        }
    }
}

/// A client request as seen by the load balancer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientRequest {
    pub source: IpAddr,
    /// Carries a valid session cookie for the identity pool
    pub session: bool,
}

impl ClientRequest {
    pub fn anonymous(source: IpAddr) -> Self {
        Self {
            source,
            session: false,
        }
    }

    pub fn signed_in(source: IpAddr) -> Self {
        Self {
            source,
            session: true,
        }
    }
}

/// Full record of one request's path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTrace {
    pub steps: Vec<(RequestState, RequestInput, RequestState)>,
    pub outcome: RequestOutcome,
}

impl RequestTrace {
    /// Where the request settled
    pub fn final_state(&self) -> RequestState {
        self.steps
            .last()
            .map(|(_, _, to)| *to)
            .unwrap_or(RequestState::Received)
    }
}

/// Evaluates client requests against a declared ingress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressGate {
    policy: FilteringPolicy,
    authenticates: bool,
}

impl IngressGate {
    pub fn from_ingress(ingress: &IngressDeclaration) -> Self {
        Self {
            policy: ingress.policy.clone(),
            authenticates: ingress.default_action.authenticates_before_forward(),
        }
    }

    pub fn policy(&self) -> &FilteringPolicy {
        &self.policy
    }

    /// Run one request until it settles
    pub fn trace(&self, request: &ClientRequest) -> TransitionResult<RequestTrace> {
        let allowed = self.policy.evaluate(request.source) == FilterAction::Allow;
        let session = request.session || !self.authenticates;

        let mut state = RequestState::Received;
        let mut steps = Vec::new();
        let mut outcome = RequestOutcome::Pending;

        while !state.is_settled() {
            let input = match state {
                RequestState::Received => RequestInput::Inspect,
                RequestState::Filtered => RequestInput::AllowListVerdict(allowed),
                RequestState::AuthenticationCheck => RequestInput::SessionVerdict(session),
                other => {
                    return Err(TransitionError::Terminal(other.to_string()));
                }
            };
            let (next, out) = state.transition(&input)?;
            steps.push((state, input, next));
            state = next;
            outcome = out;
        }

        Ok(RequestTrace { steps, outcome })
    }

    /// Where a request settles
    pub fn evaluate(&self, request: &ClientRequest) -> TransitionResult<RequestState> {
        Ok(self.trace(request)?.final_state())
    }
}

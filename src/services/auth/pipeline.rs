//! Per-request authentication state machine.
//!
//! ```text
//! START -> BYPASS_CHECK -> EXTRACT -> RESOLVE -> REISSUE -> ATTACH -> CONTINUE
//!             |              |           |          |
//!             +-> CONTINUE   +-> FAIL    +-> FAIL   +-> FAIL
//!                 (anonymous)   401-2       401-3
//! ```
//!
//! Each stage takes the context built so far and returns `Continue`, `Finish`
//! (skip to CONTINUE) or `Fail`. `AuthGateway::run` drives the fixed stage list.
//! Credential values are never logged.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use super::AuthError;
use super::access_control::route_bypass;
use super::access_token::TokenCodec;
use super::cookie::parse_cookies;
use super::credentials::{self, CredentialPair};
use super::principal::Principal;
use super::reissue::{Reissue, ReissuancePolicy, TokenVerification};
use crate::services::identity::{Identity, IdentityResolver};

/// The parts of an HTTP request the gateway looks at.
#[derive(Debug, Clone, Copy)]
pub struct RequestView<'a> {
    pub path: &'a str,
    pub headers: &'a HeaderMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BypassCheck,
    Extract,
    Resolve,
    Reissue,
    Attach,
}

const STAGES: [Stage; 5] = [
    Stage::BypassCheck,
    Stage::Extract,
    Stage::Resolve,
    Stage::Reissue,
    Stage::Attach,
];

/// State threaded through the stages.
#[derive(Debug, Default)]
pub struct GateContext {
    credentials: CredentialPair,
    verification: TokenVerification,
    identity: Option<Identity>,
    reissued_token: Option<String>,
    principal: Option<Principal>,
}

impl GateContext {
    fn into_outcome(self) -> GateOutcome {
        GateOutcome {
            principal: self.principal,
            reissued_token: self.reissued_token,
        }
    }
}

#[derive(Debug)]
pub enum Step {
    Continue(GateContext),
    Finish(GateContext),
    Fail(AuthError),
}

/// Result of a successful pass: who the caller is (`None` = anonymous) and
/// the token to hand back, if one was minted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub principal: Option<Principal>,
    pub reissued_token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AuthGateway {
    codec: Arc<TokenCodec>,
    resolver: IdentityResolver,
    policy: ReissuancePolicy,
}

impl AuthGateway {
    pub fn new(codec: Arc<TokenCodec>, resolver: IdentityResolver) -> Self {
        let policy = ReissuancePolicy::new(codec.clone());
        Self {
            codec,
            resolver,
            policy,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub async fn run(
        &self,
        req: RequestView<'_>,
        now: DateTime<Utc>,
    ) -> Result<GateOutcome, AuthError> {
        let mut ctx = GateContext::default();

        for stage in STAGES {
            match self.step(stage, req, ctx, now).await {
                Step::Continue(next) => ctx = next,
                Step::Finish(done) => {
                    debug!(?stage, path = req.path, "auth gate finished early");
                    return Ok(done.into_outcome());
                }
                Step::Fail(err) => {
                    debug!(?stage, path = req.path, code = err.result_code(), "auth gate failed");
                    return Err(err);
                }
            }
        }

        Ok(ctx.into_outcome())
    }

    async fn step(
        &self,
        stage: Stage,
        req: RequestView<'_>,
        ctx: GateContext,
        now: DateTime<Utc>,
    ) -> Step {
        match stage {
            Stage::BypassCheck => bypass_check(req, ctx),
            Stage::Extract => extract(req, ctx),
            Stage::Resolve => self.resolve(ctx, now).await,
            Stage::Reissue => self.reissue(ctx, now),
            Stage::Attach => attach(ctx),
        }
    }

    async fn resolve(&self, mut ctx: GateContext, now: DateTime<Utc>) -> Step {
        if ctx.credentials.has_access_token() {
            match self.codec.verify(&ctx.credentials.access_token, now) {
                Ok(payload) => {
                    ctx.verification = TokenVerification::Valid;
                    ctx.identity = Some(Identity::from(payload));
                    return Step::Continue(ctx);
                }
                Err(_) => {
                    debug!("access token rejected, falling back to api key");
                    ctx.verification = TokenVerification::Invalid;
                }
            }
        }

        match self.resolver.find_by_api_key(&ctx.credentials.api_key).await {
            Ok(Some(identity)) => {
                ctx.identity = Some(identity);
                Step::Continue(ctx)
            }
            Ok(None) => {
                warn!("api key did not resolve to a member");
                Step::Fail(AuthError::UnresolvableApiKey)
            }
            Err(err) => {
                error!(error = %err, "identity lookup failed");
                Step::Fail(AuthError::Store(err))
            }
        }
    }

    fn reissue(&self, mut ctx: GateContext, now: DateTime<Utc>) -> Step {
        match self.policy.decide(
            &ctx.credentials,
            ctx.verification,
            ctx.identity.as_ref(),
            now,
        ) {
            Ok(Reissue::IssueAndAttach(token)) => {
                ctx.reissued_token = Some(token);
                Step::Continue(ctx)
            }
            Ok(Reissue::None) => Step::Continue(ctx),
            Err(err) => Step::Fail(AuthError::TokenIssue(err)),
        }
    }
}

fn bypass_check(req: RequestView<'_>, ctx: GateContext) -> Step {
    if route_bypass(req.path) {
        Step::Finish(ctx)
    } else {
        Step::Continue(ctx)
    }
}

fn extract(req: RequestView<'_>, mut ctx: GateContext) -> Step {
    let authorization = match req.headers.get(header::AUTHORIZATION).map(|v| v.to_str()) {
        None => None,
        Some(Ok(v)) => Some(v),
        Some(Err(_)) => {
            warn!(path = req.path, "authorization header is not valid text");
            return Step::Fail(AuthError::MalformedCredential);
        }
    };

    let cookies = parse_cookies(req.headers);
    match credentials::extract(authorization, &cookies) {
        Ok(pair) => {
            debug!(
                from_header = authorization.is_some(),
                has_api_key = !pair.api_key.trim().is_empty(),
                has_access_token = pair.has_access_token(),
                "credentials extracted"
            );
            if pair.is_empty() {
                return Step::Finish(ctx);
            }
            ctx.credentials = pair;
            Step::Continue(ctx)
        }
        Err(err) => {
            warn!(path = req.path, "authorization header is not a bearer credential");
            Step::Fail(err)
        }
    }
}

fn attach(mut ctx: GateContext) -> Step {
    match ctx.identity.take() {
        Some(identity) => {
            ctx.principal = Some(Principal::from_identity(identity));
            Step::Continue(ctx)
        }
        None => Step::Finish(ctx),
    }
}

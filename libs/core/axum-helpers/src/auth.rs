//! Request-scoped principal handling.
//!
//! The authentication middleware that fronts the router (token validation is
//! a deployment concern, not part of this workspace) is expected to insert a
//! [`Principal`] into the request extensions. Handlers then take a
//! [`RequestContext`] argument instead of consulting any process-wide holder,
//! which keeps the services testable without mocking a global.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// The authenticated identity bound to an in-flight request.
///
/// The principal name is the user's email; it says nothing about whether a
/// matching user record still exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Authenticated { email: String },
}

impl Principal {
    /// The principal's email, or `None` when anonymous.
    pub fn name(&self) -> Option<&str> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated { email } => Some(email),
        }
    }
}

/// Explicit request context carried through service calls.
///
/// Replaces the ambient security-context lookup of classic frameworks: every
/// operation that needs the caller's identity receives one of these.
#[derive(Debug, Clone)]
pub struct RequestContext {
    principal: Principal,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self {
            principal: Principal::Anonymous,
        }
    }

    pub fn authenticated(email: impl Into<String>) -> Self {
        Self {
            principal: Principal::Authenticated {
                email: email.into(),
            },
        }
    }

    /// The authenticated caller's email, or `None` for anonymous requests.
    pub fn principal_email(&self) -> Option<&str> {
        self.principal.name()
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self.principal, Principal::Anonymous)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .cloned()
            .unwrap_or(Principal::Anonymous);

        Ok(Self { principal })
    }
}

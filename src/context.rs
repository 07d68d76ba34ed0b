use serde::{Deserialize, Serialize};

/// Identity on whose behalf a retrieval is performed.
///
/// Immutable once constructed. A retrieval call that has no context to offer
/// passes `None`, which the filtering retriever rejects rather than falling
/// back to an unfiltered or default identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessContext {
    pub user_email: String,
}

impl AccessContext {
    pub fn new(user_email: impl Into<String>) -> Self {
        Self {
            user_email: user_email.into(),
        }
    }
}

/// Owned stack of access contexts for one logical task.
///
/// Each task owns its own scope, so concurrent callers cannot observe each
/// other's contexts. [`AccessScope::enter`] pushes a new context and returns a
/// guard; dropping the guard restores the previous context (possibly none),
/// including on early-return and error paths.
#[derive(Debug, Default)]
pub struct AccessScope {
    stack: Vec<AccessContext>,
}

impl AccessScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `user_email` the active context until the returned guard drops.
    pub fn enter(&mut self, user_email: impl Into<String>) -> ScopeGuard<'_> {
        self.stack.push(AccessContext::new(user_email));
        ScopeGuard { scope: self }
    }

    /// The innermost active context, if any.
    pub fn active(&self) -> Option<&AccessContext> {
        self.stack.last()
    }
}

/// Restores the previous context when dropped.
pub struct ScopeGuard<'a> {
    scope: &'a mut AccessScope,
}

impl ScopeGuard<'_> {
    pub fn active(&self) -> Option<&AccessContext> {
        self.scope.active()
    }

    /// Enters a nested context on top of this one.
    pub fn enter(&mut self, user_email: impl Into<String>) -> ScopeGuard<'_> {
        self.scope.enter(user_email)
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.scope.stack.pop();
    }
}

//! View-scoped key routing
//!
//! Every visible view attaches a scope when it appears and detaches it when
//! it goes away. A key is delivered only to the topmost attached scope, so
//! an open dialog consumes Enter before the page underneath can act on it,
//! and a page that has been left can never react to a key press.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Primary action of the visible view
    Enter,
    /// Back out of the visible view
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewScope {
    Home,
    ClaimDetails,
    Upload,
    Summary,
    Dialog,
}

impl fmt::Display for ViewScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewScope::Home => "home",
            ViewScope::ClaimDetails => "claim_details",
            ViewScope::Upload => "upload",
            ViewScope::Summary => "summary",
            ViewScope::Dialog => "dialog",
        };
        f.write_str(name)
    }
}

/// Identifies one attachment. Detaching with a stale handle is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeHandle(u64);

#[derive(Debug, Default)]
pub struct KeyRouter {
    next_id: u64,
    stack: Vec<(ScopeHandle, ViewScope)>,
}

impl KeyRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, scope: ViewScope) -> ScopeHandle {
        let handle = ScopeHandle(self.next_id);
        self.next_id += 1;
        self.stack.push((handle, scope));
        tracing::trace!(%scope, depth = self.stack.len(), "Key scope attached");
        handle
    }

    /// Remove exactly the scope `handle` was issued for.
    pub fn detach(&mut self, handle: ScopeHandle) -> bool {
        let Some(pos) = self.stack.iter().position(|(h, _)| *h == handle) else {
            return false;
        };
        let (_, scope) = self.stack.remove(pos);
        tracing::trace!(%scope, depth = self.stack.len(), "Key scope detached");
        true
    }

    pub fn top(&self) -> Option<ViewScope> {
        self.stack.last().map(|(_, scope)| *scope)
    }

    pub fn is_attached(&self, handle: ScopeHandle) -> bool {
        self.stack.iter().any(|(h, _)| *h == handle)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Scope that receives `key`, if any view is attached.
    pub fn dispatch(&self, key: Key) -> Option<ViewScope> {
        let scope = self.top()?;
        tracing::trace!(?key, %scope, "Key dispatched");
        Some(scope)
    }
}

//! Tenant selection.
//!
//! Replaces row-level security: every repository call receives the company
//! filter derived from the caller's [`TenantScope`].

use uuid::Uuid;

/// Which company's data an operation may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    /// Master access without a selected company: every tenant.
    All,
    /// A single selected company.
    Company(Uuid),
    /// No company selected and no master access; reads are empty.
    Unselected,
}

impl TenantScope {
    /// Repository filter for this scope; `None` when nothing may be read.
    pub fn filter(&self) -> Option<Option<Uuid>> {
        match self {
            TenantScope::All => Some(None),
            TenantScope::Company(id) => Some(Some(*id)),
            TenantScope::Unselected => None,
        }
    }

    pub fn company_id(&self) -> Option<Uuid> {
        match self {
            TenantScope::Company(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, TenantScope::All)
    }
}

/// Scope plus the acting user, passed to every service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub scope: TenantScope,
    pub actor_id: Option<Uuid>,
}

impl TenantContext {
    pub fn new(scope: TenantScope, actor_id: Option<Uuid>) -> Self {
        Self { scope, actor_id }
    }

    /// Unrestricted context for internal callers.
    pub fn system() -> Self {
        Self::new(TenantScope::All, None)
    }

    pub fn company(company_id: Uuid) -> Self {
        Self::new(TenantScope::Company(company_id), None)
    }

    pub fn unselected() -> Self {
        Self::new(TenantScope::Unselected, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters() {
        let id = Uuid::new_v4();
        assert_eq!(TenantScope::All.filter(), Some(None));
        assert_eq!(TenantScope::Company(id).filter(), Some(Some(id)));
        assert_eq!(TenantScope::Unselected.filter(), None);
    }

    #[test]
    fn test_company_id_only_for_selected_company() {
        let id = Uuid::new_v4();
        assert_eq!(TenantScope::Company(id).company_id(), Some(id));
        assert_eq!(TenantScope::All.company_id(), None);
        assert_eq!(TenantScope::Unselected.company_id(), None);
        assert!(TenantContext::system().scope.is_all());
    }
}

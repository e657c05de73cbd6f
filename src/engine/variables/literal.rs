use crate::engine::variables::DomainId;

/// A boolean variable, backed by a 0-1 integer domain.
///
/// The literal is true when the underlying domain is assigned 1 and false when it is assigned 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    domain_id: DomainId,
}

impl Literal {
    pub(crate) fn new(domain_id: DomainId) -> Self {
        Literal { domain_id }
    }

    /// The 0-1 domain backing this literal.
    pub fn domain_id(&self) -> DomainId {
        self.domain_id
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} == 1]", self.domain_id)
    }
}

impl std::fmt::Debug for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} == 1]", self.domain_id)
    }
}

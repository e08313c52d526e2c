use workforce_auth::{OperationAuthorization, Requirement};

/// Small helper wrapper to associate a requirement with an operation.
pub struct OpAuth<C = ()> {
    pub inner: C,
    pub requirement: Requirement,
}

impl OpAuth<()> {
    /// Requirement with no payload attached.
    pub fn require(requirement: Requirement) -> Self {
        Self {
            inner: (),
            requirement,
        }
    }
}

impl<C> OperationAuthorization for OpAuth<C> {
    fn requirement(&self) -> Requirement {
        self.requirement.clone()
    }
}

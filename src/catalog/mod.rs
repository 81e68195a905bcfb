//! Operation catalog: which role may invoke which contract method.
//!
//! Lookups are pure. A denied operation is rejected here, before any
//! ledger traffic; the contracts re-check access on their side.

pub mod operation;
pub mod role;

use std::collections::HashMap;

pub use operation::{ContractKind, Operation, Param, SchemaMismatch};
pub use role::{Role, UnknownRole};

/// `registerIdentity(address user, string name, string role, bytes kyc)`
pub const REGISTER_IDENTITY: Operation = Operation {
    name: "registerIdentity",
    contract: ContractKind::IdentityManager,
    params: &[
        Param::new("user", "address"),
        Param::new("name", "string"),
        Param::new("role", "string"),
        Param::new("kyc", "bytes"),
    ],
    schema_version: 1,
};

/// `generateKeyPair()`
pub const GENERATE_KEY_PAIR: Operation = Operation {
    name: "generateKeyPair",
    contract: ContractKind::BondServiceProvider,
    params: &[],
    schema_version: 1,
};

/// `generateBonds()`
pub const GENERATE_BONDS: Operation = Operation {
    name: "generateBonds",
    contract: ContractKind::BondServiceProvider,
    params: &[],
    schema_version: 1,
};

/// `issueBond(string bondId, uint256 amount)`
pub const ISSUE_BOND: Operation = Operation {
    name: "issueBond",
    contract: ContractKind::BondServiceProvider,
    params: &[Param::new("bondId", "string"), Param::new("amount", "uint256")],
    schema_version: 1,
};

/// `redeemBond(string bondId)`, the institution-side redemption.
pub const REDEEM_BOND: Operation = Operation {
    name: "redeemBond",
    contract: ContractKind::BondServiceProvider,
    params: &[Param::new("bondId", "string")],
    schema_version: 1,
};

/// `redeem()`, the beneficiary-side redemption of the caller's own bonds.
pub const REDEEM: Operation = Operation {
    name: "redeem",
    contract: ContractKind::BondServiceProvider,
    params: &[],
    schema_version: 1,
};

/// `shencBond(string bondId, bytes publicKey)`
pub const SHENC_BOND: Operation = Operation {
    name: "shencBond",
    contract: ContractKind::BondServiceProvider,
    params: &[Param::new("bondId", "string"), Param::new("publicKey", "bytes")],
    schema_version: 1,
};

/// `rti()`
pub const RTI: Operation = Operation {
    name: "rti",
    contract: ContractKind::BondServiceProvider,
    params: &[],
    schema_version: 1,
};

/// The requested operation is not in the role's allowed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role {role} is not authorized to invoke {operation}")]
pub struct NotAuthorized {
    pub role: Role,
    pub operation: String,
}

/// Static mapping from role to allowed operations.
#[derive(Debug, Clone, Default)]
pub struct OperationCatalog {
    entries: HashMap<Role, Vec<&'static Operation>>,
}

impl OperationCatalog {
    /// An empty catalog that denies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog for the currently deployed contracts.
    pub fn standard() -> Self {
        Self::new()
            .allow(
                Role::Institution,
                &[&GENERATE_KEY_PAIR, &GENERATE_BONDS, &ISSUE_BOND, &REDEEM_BOND, &SHENC_BOND],
            )
            .allow(
                Role::Authority,
                &[&REGISTER_IDENTITY, &GENERATE_KEY_PAIR, &SHENC_BOND, &RTI],
            )
            .allow(Role::Beneficiary, &[&REGISTER_IDENTITY, &REDEEM])
            .allow(Role::Auditor, &[&RTI])
            .allow(Role::User, &[&REGISTER_IDENTITY])
    }

    /// Grant `ops` to `role`. Re-granting an operation name replaces it.
    pub fn allow(mut self, role: Role, ops: &[&'static Operation]) -> Self {
        let entry = self.entries.entry(role).or_default();
        for op in ops {
            entry.retain(|existing| existing.name != op.name);
            entry.push(op);
        }
        self
    }

    /// Look up `operation` for `role`.
    pub fn resolve(&self, role: Role, operation: &str) -> Result<&'static Operation, NotAuthorized> {
        self.operations(role)
            .iter()
            .find(|op| op.name == operation)
            .copied()
            .ok_or_else(|| NotAuthorized {
                role,
                operation: operation.to_string(),
            })
    }

    /// Every operation `role` may invoke.
    pub fn operations(&self, role: Role) -> &[&'static Operation] {
        self.entries.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(catalog: &OperationCatalog, role: Role) -> Vec<&'static str> {
        let mut names: Vec<_> = catalog.operations(role).iter().map(|op| op.name).collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn test_standard_catalog_is_exact() {
        let catalog = OperationCatalog::standard();
        assert_eq!(
            names(&catalog, Role::Institution),
            ["generateBonds", "generateKeyPair", "issueBond", "redeemBond", "shencBond"]
        );
        assert_eq!(
            names(&catalog, Role::Authority),
            ["generateKeyPair", "registerIdentity", "rti", "shencBond"]
        );
        assert_eq!(names(&catalog, Role::Beneficiary), ["redeem", "registerIdentity"]);
        assert_eq!(names(&catalog, Role::Auditor), ["rti"]);
        assert_eq!(names(&catalog, Role::User), ["registerIdentity"]);
    }

    #[test]
    fn test_resolve_is_total() {
        let catalog = OperationCatalog::standard();
        let every = [
            &REGISTER_IDENTITY,
            &GENERATE_KEY_PAIR,
            &GENERATE_BONDS,
            &ISSUE_BOND,
            &REDEEM_BOND,
            &REDEEM,
            &SHENC_BOND,
            &RTI,
        ];
        for role in Role::ALL {
            let allowed = names(&catalog, role);
            for op in every {
                let result = catalog.resolve(role, op.name);
                assert_eq!(result.is_ok(), allowed.contains(&op.name), "{} {}", role, op.name);
            }
        }
    }

    #[test]
    fn test_resolve_binds_contract() {
        let catalog = OperationCatalog::standard();
        let op = catalog.resolve(Role::Institution, "issueBond").unwrap();
        assert_eq!(op.contract, ContractKind::BondServiceProvider);
        assert_eq!(op.signature(), "issueBond(string,uint256)");

        let op = catalog.resolve(Role::Authority, "registerIdentity").unwrap();
        assert_eq!(op.contract, ContractKind::IdentityManager);
    }

    #[test]
    fn test_beneficiary_cannot_redeem_bond() {
        let err = OperationCatalog::standard()
            .resolve(Role::Beneficiary, "redeemBond")
            .unwrap_err();
        assert_eq!(err.role, Role::Beneficiary);
        assert_eq!(err.to_string(), "role beneficiary is not authorized to invoke redeemBond");
    }

    #[test]
    fn test_allow_replaces_same_name() {
        const REDEEM_V2: Operation = Operation {
            name: "redeem",
            contract: ContractKind::BondServiceProvider,
            params: &[Param::new("bondId", "string")],
            schema_version: 2,
        };
        let catalog = OperationCatalog::standard().allow(Role::Beneficiary, &[&REDEEM_V2]);
        let op = catalog.resolve(Role::Beneficiary, "redeem").unwrap();
        assert_eq!(op.schema_version, 2);
        assert_eq!(catalog.operations(Role::Beneficiary).len(), 2);
    }

    #[test]
    fn test_authority_runs_disclosure_user_only_registers() {
        let catalog = OperationCatalog::standard();
        for op in ["rti", "shencBond", "generateKeyPair"] {
            assert!(catalog.resolve(Role::Authority, op).is_ok(), "{}", op);
            let err = catalog.resolve(Role::User, op).unwrap_err();
            assert_eq!(err.role, Role::User);
        }
        assert!(catalog.resolve(Role::User, "registerIdentity").is_ok());
    }

    #[test]
    fn test_empty_catalog_denies() {
        assert!(OperationCatalog::new().resolve(Role::Auditor, "rti").is_err());
    }
}

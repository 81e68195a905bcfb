//! Contract operations and their parameter schemas.

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::keccak256;
use serde::Serialize;
use std::fmt;

/// Contract an operation is dispatched to. Addresses come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    /// Identity registry.
    IdentityManager,
    /// ElectoralBondServiceProvider.
    BondServiceProvider,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractKind::IdentityManager => f.write_str("IdentityManager"),
            ContractKind::BondServiceProvider => f.write_str("ElectoralBondServiceProvider"),
        }
    }
}

/// A named, typed method parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: &'static str,
    /// Solidity type, e.g. `uint256`.
    pub ty: &'static str,
}

impl Param {
    pub const fn new(name: &'static str, ty: &'static str) -> Self {
        Self { name, ty }
    }
}

/// A role-scoped remote capability bound to a contract method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Operation {
    /// Method name as deployed.
    pub name: &'static str,
    pub contract: ContractKind,
    pub params: &'static [Param],
    /// Bumped whenever the deployed method signature changes.
    pub schema_version: u32,
}

/// Raised when arguments do not fit an operation's parameter schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaMismatch {
    #[error("expected {expected} arguments, got {actual}")]
    Arity { expected: usize, actual: usize },

    #[error("argument {index} ({name}) must be {expected}")]
    Type {
        index: usize,
        name: &'static str,
        expected: &'static str,
    },

    #[error("argument {index} ({name}): {reason}")]
    Parse {
        index: usize,
        name: &'static str,
        reason: String,
    },

    #[error("invalid parameter type '{0}' in catalog")]
    BadSchema(&'static str),
}

impl Operation {
    /// Canonical signature, e.g. `issueBond(string,uint256)`.
    pub fn signature(&self) -> String {
        let types: Vec<&str> = self.params.iter().map(|p| p.ty).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// First four bytes of the keccak hash of the signature.
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Resolve the parameter types.
    pub fn param_types(&self) -> Result<Vec<DynSolType>, SchemaMismatch> {
        self.params
            .iter()
            .map(|p| DynSolType::parse(p.ty).map_err(|_| SchemaMismatch::BadSchema(p.ty)))
            .collect()
    }

    /// Check argument count and types against the schema.
    pub fn check_args(&self, args: &[DynSolValue]) -> Result<(), SchemaMismatch> {
        if args.len() != self.params.len() {
            return Err(SchemaMismatch::Arity {
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        for (index, (ty, arg)) in self.param_types()?.iter().zip(args).enumerate() {
            if !ty.matches(arg) {
                return Err(SchemaMismatch::Type {
                    index,
                    name: self.params[index].name,
                    expected: self.params[index].ty,
                });
            }
        }
        Ok(())
    }

    /// Coerce textual arguments (as typed on a command line) into ABI values.
    pub fn parse_args<S: AsRef<str>>(&self, raw: &[S]) -> Result<Vec<DynSolValue>, SchemaMismatch> {
        if raw.len() != self.params.len() {
            return Err(SchemaMismatch::Arity {
                expected: self.params.len(),
                actual: raw.len(),
            });
        }
        self.param_types()?
            .iter()
            .zip(raw)
            .enumerate()
            .map(|(index, (ty, s))| {
                ty.coerce_str(s.as_ref()).map_err(|e| SchemaMismatch::Parse {
                    index,
                    name: self.params[index].name,
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.contract, self.signature())
    }
}

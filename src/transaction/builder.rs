//! Call encoding and envelope assembly.
//!
//! Encoding is split from assembly so arguments are validated before a
//! nonce is allocated. Limits are taken as given; nothing is estimated.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Bytes};

use crate::catalog::{Operation, SchemaMismatch};
use crate::transaction::types::{ResourceLimits, UnsignedTransaction};

/// Builds unsigned transactions for one chain.
#[derive(Debug, Clone, Copy)]
pub struct TxBuilder {
    chain_id: u64,
}

impl TxBuilder {
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Validate `args` against the operation schema and ABI-encode the call.
    ///
    /// The result is the 4-byte selector followed by the encoded params and
    /// is byte-identical for identical inputs.
    pub fn encode_call(
        &self,
        operation: &Operation,
        args: &[DynSolValue],
    ) -> Result<Bytes, SchemaMismatch> {
        operation.check_args(args)?;

        let mut data = operation.selector().to_vec();
        data.extend(DynSolValue::Tuple(args.to_vec()).abi_encode_params());
        Ok(data.into())
    }

    /// Wrap an encoded call into an envelope.
    pub fn assemble(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
        nonce: u64,
        limits: &ResourceLimits,
    ) -> UnsignedTransaction {
        UnsignedTransaction {
            from,
            chain_id: self.chain_id,
            nonce,
            to,
            input,
            gas_limit: limits.gas_limit,
            gas_price: limits.gas_price,
        }
    }

    /// `encode_call` followed by `assemble`.
    pub fn build(
        &self,
        operation: &Operation,
        from: Address,
        to: Address,
        args: &[DynSolValue],
        nonce: u64,
        limits: &ResourceLimits,
    ) -> Result<UnsignedTransaction, SchemaMismatch> {
        let input = self.encode_call(operation, args)?;
        Ok(self.assemble(from, to, input, nonce, limits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{GENERATE_BONDS, ISSUE_BOND, REGISTER_IDENTITY};
    use alloy::primitives::U256;
    use alloy::sol;
    use alloy::sol_types::SolCall;

    sol! {
        function issueBond(string bondId, uint256 amount);
        function registerIdentity(address user, string name, string role, bytes kyc);
    }

    fn issue_args() -> Vec<DynSolValue> {
        vec![
            DynSolValue::String("B1".into()),
            DynSolValue::Uint(U256::from(1000), 256),
        ]
    }

    #[test]
    fn test_encoding_matches_contract_abi() {
        let builder = TxBuilder::new(31337);
        let encoded = builder.encode_call(&ISSUE_BOND, &issue_args()).unwrap();
        let expected = issueBondCall {
            bondId: "B1".into(),
            amount: U256::from(1000),
        }
        .abi_encode();
        assert_eq!(encoded.as_ref(), expected.as_slice());

        let user = Address::repeat_byte(0x42);
        let encoded = builder
            .encode_call(
                &REGISTER_IDENTITY,
                &[
                    DynSolValue::Address(user),
                    DynSolValue::String("Alice".into()),
                    DynSolValue::String("voter".into()),
                    DynSolValue::Bytes(b"kyc-blob".to_vec()),
                ],
            )
            .unwrap();
        let expected = registerIdentityCall {
            user,
            name: "Alice".into(),
            role: "voter".into(),
            kyc: b"kyc-blob".to_vec().into(),
        }
        .abi_encode();
        assert_eq!(encoded.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_no_arg_call_is_selector_only() {
        let encoded = TxBuilder::new(1).encode_call(&GENERATE_BONDS, &[]).unwrap();
        assert_eq!(encoded.len(), 4);
        assert_eq!(encoded.as_ref(), &GENERATE_BONDS.selector()[..]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = TxBuilder::new(31337);
        let from = Address::repeat_byte(0x01);
        let to = Address::repeat_byte(0x02);
        let limits = ResourceLimits::default();

        let a = builder.build(&ISSUE_BOND, from, to, &issue_args(), 7, &limits).unwrap();
        let b = builder.build(&ISSUE_BOND, from, to, &issue_args(), 7, &limits).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.signing_hash(), b.signing_hash());
        assert_eq!(a.nonce, 7);
        assert_eq!(a.gas_limit, 800_000);
        assert_eq!(a.to, to);
    }

    #[test]
    fn test_schema_mismatch() {
        let builder = TxBuilder::new(31337);
        let err = builder
            .encode_call(&ISSUE_BOND, &[DynSolValue::String("B1".into())])
            .unwrap_err();
        assert!(matches!(err, SchemaMismatch::Arity { expected: 2, actual: 1 }));

        let err = builder
            .encode_call(
                &ISSUE_BOND,
                &[DynSolValue::String("B1".into()), DynSolValue::Bool(true)],
            )
            .unwrap_err();
        assert!(matches!(err, SchemaMismatch::Type { index: 1, .. }));
    }
}

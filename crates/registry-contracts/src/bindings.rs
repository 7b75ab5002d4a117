// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Solidity interfaces for the contracts the migration and the contract tests talk to.

use alloy::sol;

sol! {
    /// The current TixToken registry. Holds the `repository` mapping from service
    /// name to registration and charges a registration fee in TIX.
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface ITixToken {
        struct Service {
            address destination;
            address owner;
            string spec;
        }

        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);

        function SERVICE_WORKER() external view returns (bytes32);
        function grantRole(bytes32 role, address account) external;

        function setRegistrationFee(uint256 fee) external;
        function _registrationFee() external view returns (uint256);

        function registerService(string name, string spec, address destination, address owner) external;
        function registerServices(bytes32[] names, Service[] services) external;
        function repository(bytes32 name) external view returns (address destination, address owner, string spec);
        function areServicesRegistered(bytes32[] names, address[] destinations) external view returns (bool);
    }
}

sol! {
    /// The registry being migrated away from. Only the lookup is bound; the
    /// `ServiceRegistered` event is decoded through the ABI document shipped
    /// with the deployment, since its indexed layout is not fixed here.
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface ILegacyServiceRegistry {
        function repository(bytes32 name) external view returns (address destination, address owner);
    }
}

sol! {
    /// Deploys a workflow contract and registers it with TixToken on behalf of the caller.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IServiceDeployer {
        function deploy(string name, string spec, bytes bytecode) external;
    }
}

sol! {
    /// Test harness around `WorkflowBase` exposing its id bookkeeping.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IWorkflowBaseMock {
        function addItems(uint256 count) external;
        function getLatestIds(uint256 cnt) external view returns (uint256[]);
    }
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{keccak256, Address, Bytes},
        providers::{mock::Asserter, ProviderBuilder},
    };

    use super::*;

    #[test]
    fn test_service_deployer_deploy_targets_deploy_function() {
        let provider = ProviderBuilder::new().connect_mocked_client(Asserter::new());
        let deployer = IServiceDeployer::new(Address::ZERO, provider);

        // `deploy` is exposed as `deploy_call` next to the generated constructor helper
        let call = deployer.deploy_call(
            "TestService".to_owned(),
            "TestSpec".to_owned(),
            Bytes::from_static(&[0x60, 0x80]),
        );

        assert_eq!(
            &call.calldata()[..4],
            &keccak256("deploy(string,string,bytes)")[..4]
        );
    }
}

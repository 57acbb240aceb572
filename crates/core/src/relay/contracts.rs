use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface ILocalGateway {
        event ContractCall(
            address indexed sender,
            string destinationChain,
            string destinationContractAddress,
            bytes32 indexed payloadHash,
            bytes payload
        );

        event ContractCallWithToken(
            address indexed sender,
            string destinationChain,
            string destinationContractAddress,
            bytes32 indexed payloadHash,
            bytes payload,
            string symbol,
            uint256 amount
        );

        function execute(bytes calldata input) external;

        function isCommandExecuted(bytes32 commandId) external view returns (bool);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IGasReceiver {
        event NativeGasPaidForContractCall(
            address indexed sourceAddress,
            string destinationChain,
            string destinationAddress,
            bytes32 indexed payloadHash,
            uint256 gasFeeAmount,
            address refundAddress
        );

        event NativeGasPaidForContractCallWithToken(
            address indexed sourceAddress,
            string destinationChain,
            string destinationAddress,
            bytes32 indexed payloadHash,
            string symbol,
            uint256 amount,
            uint256 gasFeeAmount,
            address refundAddress
        );
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IExecutable {
        function execute(
            bytes32 commandId,
            string calldata sourceChain,
            string calldata sourceAddress,
            bytes calldata payload
        ) external;

        function executeWithToken(
            bytes32 commandId,
            string calldata sourceChain,
            string calldata sourceAddress,
            bytes calldata payload,
            string calldata tokenSymbol,
            uint256 amount
        ) external;
    }
}

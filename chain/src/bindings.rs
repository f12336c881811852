//! Contract bindings generated from the collaborator call and event surfaces.

use ethers::contract::abigen;

abigen!(
    Erc20,
    r#"[
        function balanceOf(address owner) external view returns (uint256)
    ]"#
);

abigen!(
    GovernanceRootPublisher,
    r#"[
        function getSnapshot(uint256 proposalId) external view returns (uint64 snapshotBlock, uint256 snapshotER)
        function getWindow(uint256 proposalId) external view returns (uint64 votingStart, uint64 votingEnd)
        function getDeadline(uint256 proposalId) external view returns (uint256)
        function proposals(uint256 proposalId) external view returns (bytes32 actionDataHash, uint64 votingStart, uint64 votingEnd, uint256 snapshotBlock, uint256 snapshotER, uint256 deadline, bytes32 powerRoot, uint256 totalPower, uint256 quorum, uint256 threshold, bool frozen)
        function publishRoot(uint256 proposalId, bytes32 powerRoot, uint256 totalPower, uint256 quorum, uint256 threshold) external
    ]"#
);

abigen!(
    GovernanceExecutor,
    r#"[
        function commitAction(bytes32 actionDataHash) external
        function executeIfAuthorized(bytes actionData) external returns (bool)
    ]"#
);

abigen!(
    VoteVerifier,
    r#"[
        function freezeProposal(uint256 proposalId, bytes32 powerRoot, bytes32 actionDataHash, uint64 votingStart, uint64 votingEnd, uint256 quorum, uint256 threshold) external
        function getNextNonce(uint256 proposalId, address voter) external view returns (uint256)
        struct Vote { uint256 proposalId; bool support; address voter; uint256 power; uint256 nonce; uint256 deadline; bool abstain; bytes signature; }
        function batchVerifyAndTally(Vote[] votes, bytes32[] leaves, bytes32[] proof, bool[] proofFlags) external
        event ProposalPassed(uint256 indexed proposalId, bytes32 actionDataHash)
    ]"#
);

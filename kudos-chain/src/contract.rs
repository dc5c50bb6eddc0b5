//! ABI bindings for the read-only surface of the Kudos ERC-721 contract.

#![allow(clippy::too_many_arguments)]

use alloy::sol;

sol! {
    #[derive(Debug)]
    #[sol(rpc)]
    contract Kudos {
        event Transfer(address indexed _from, address indexed _to, uint256 indexed _tokenId);

        function totalSupply() external view returns (uint256);
        function ownerOf(uint256 _tokenId) external view returns (address);
        function tokenURI(uint256 _tokenId) external view returns (string);
        function getKudosById(uint256 _tokenId)
            external
            view
            returns (
                uint256 priceFinney,
                uint256 numClonesAllowed,
                uint256 numClonesInWild,
                uint256 clonedFromId
            );
    }
}

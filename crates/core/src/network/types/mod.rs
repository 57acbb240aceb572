mod chain_id;
pub use chain_id::{ChainId, ParseChainIdError};

mod chain_info;
pub use chain_info::{
    token_metadata, ChainCloneData, ChainInfoError, ChainInfoTables, ForkEnvironment,
    TokenMetadata,
};

mod network;
pub use network::{Network, NetworkError};

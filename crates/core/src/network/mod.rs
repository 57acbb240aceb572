pub mod anvil;
pub use anvil::{AnvilConfig, AnvilError, AnvilInstance};

mod factory;
pub use factory::{
    AnvilNetworkFactory, CreateNetworkError, CreateNetworkOptions, ForkNetworkOptions,
    LocalContractArtifacts, NetworkFactory, FIRST_LOCAL_CHAIN_ID,
};

mod registry;
pub use registry::NetworkRegistry;

mod types;
pub use types::*;

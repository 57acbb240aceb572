mod execute_input;
pub use execute_input::{
    get_signed_execute_input, get_signed_multisig_execute_input, sign_execute_data, SigningError,
};

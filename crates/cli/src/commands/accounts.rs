use localnet_core::{WalletError, WalletRole, default_accounts, format_wei_to_eth};

use crate::console::print_table;

/// What the account at `index` is used for on every network.
fn role(index: usize) -> String {
    WalletRole::of(index).map(|role| role.to_string()).unwrap_or_default()
}

pub fn handle_accounts(count: usize, seed: &str) -> Result<(), WalletError> {
    let accounts = default_accounts(count, seed);

    let mut rows = Vec::with_capacity(accounts.len());
    for (index, account) in accounts.iter().enumerate() {
        rows.push(vec![
            index.to_string(),
            role(index),
            account.address()?.to_string(),
            account.secret_key.to_string(),
            format_wei_to_eth(&account.balance),
        ]);
    }

    let title = format!("{} accounts for seed {:?}:", accounts.len(), seed);
    print_table(
        vec!["Index", "Role", "Address", "Private Key", "Balance (ETH)"],
        rows,
        Some(&title),
        None,
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_follow_the_wallet_split() {
        assert_eq!(role(0), "owner");
        assert_eq!(role(2), "relayer");
        assert_eq!(role(3), "admin");
        assert_eq!(role(6), "admin");
        assert_eq!(role(7), "");
        assert_eq!(role(8), "");
        assert_eq!(role(10), "user");
        assert_eq!(role(20), "");

        let admins = (0..20).filter(|index| role(*index) == "admin").count();
        assert_eq!(admins, 4);
    }
}

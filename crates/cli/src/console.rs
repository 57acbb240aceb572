use colored::Colorize;
use localnet_core::ChainExportInfo;
use prettytable::{Cell, Row, Table, format};

pub fn print_error_message(error_message: &str) {
    println!("{}", error_message.red());
}

pub fn print_warn_message(warn_message: &str) {
    println!("{}", warn_message.yellow());
}

pub fn print_success_message(success_message: &str) {
    println!("{}", success_message.green());
}

pub fn print_table<T: AsRef<str>>(
    headers: Vec<T>,
    rows: Vec<Vec<String>>,
    title: Option<&str>,
    footer: Option<&str>,
) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

    let header_cells =
        headers.into_iter().map(|h| Cell::new(h.as_ref()).style_spec("Fb")).collect();
    table.add_row(Row::new(header_cells));

    for row_data in rows {
        let cells = row_data.into_iter().map(|cell| Cell::new(cell.as_ref())).collect();
        table.add_row(Row::new(cells));
    }

    if let Some(title_text) = title {
        println!("\n{}", title_text);
    }

    table.printstd();

    if let Some(footer_text) = footer {
        println!("\n{}", footer_text);
    }
}

/// Prints the exported networks, the way other tooling will find them in `output`.
pub fn print_exported_chains(chains: &[ChainExportInfo], output: &str) {
    if chains.is_empty() {
        print_warn_message("No networks were started.");
        return;
    }

    let rows = chains
        .iter()
        .map(|chain| {
            vec![
                chain.name.clone(),
                chain.chain_id.to_string(),
                chain.rpc.clone(),
                chain.gateway.to_string(),
                chain.gas_receiver.to_string(),
                chain.token_symbol.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let title = format!("{} networks running:", chains.len());
    let footer = format!("Chain details written to {}, press ctrl-c to stop", output);
    print_table(
        vec!["Name", "Chain ID", "RPC", "Gateway", "Gas Receiver", "Token"],
        rows,
        Some(&title),
        Some(&footer),
    );
}

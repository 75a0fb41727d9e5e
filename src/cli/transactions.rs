use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::db::{find_user, list_transactions};
use crate::error::Result;
use crate::fmt::signed_money;
use crate::settings::load_settings;

pub fn run(user: Option<&str>, limit: usize) -> Result<()> {
    let settings = load_settings();
    let username = settings.resolve_user(user)?;
    let conn = open_db(&settings)?;
    let user_id = find_user(&conn, &username)?;

    let txns = list_transactions(&conn, user_id, limit)?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Category", "Amount", "Description"]);
    for t in &txns {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(t.date.format("%Y-%m-%d")),
            Cell::new(&t.category_name),
            Cell::new(signed_money(t.amount, t.kind)),
            Cell::new(&t.description),
        ]);
    }
    println!("Transactions for {username}\n{table}");
    Ok(())
}

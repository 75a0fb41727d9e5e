use crate::db::{count, get_connection};
use crate::error::Result;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("User:       {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        println!();
        println!("Users:         {}", count(&conn, "users")?);
        println!("Categories:    {}", count(&conn, "categories")?);
        println!("Transactions:  {}", count(&conn, "transactions")?);
    } else {
        println!();
        println!("Database not found. Run `buget init` to set up.");
    }

    Ok(())
}

use std::path::PathBuf;

use crate::db::{ensure_user, get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<String>, user: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(name) = user {
        settings.user_name = name.trim().to_lowercase();
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;

    let conn = get_connection(&settings.db_path())?;
    init_db(&conn)?;
    if !settings.user_name.is_empty() {
        ensure_user(&conn, &settings.user_name)?;
    }

    println!("Initialized buget at {}", resolved.display());
    Ok(())
}

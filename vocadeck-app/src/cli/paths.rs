use directories::ProjectDirs;
use std::path::PathBuf;

pub fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("com", "vocadeck", "Vocadeck") {
        pd.data_dir().to_path_buf()
    } else {
        // Fallback: current dir
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

/// Used when neither `--database-url` nor `DATABASE_URL` is given.
pub fn default_database_url() -> String {
    let file = data_root().join("vocadeck.sqlite3");
    format!("sqlite://{}", file.display())
}

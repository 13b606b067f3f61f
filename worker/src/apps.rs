use common::{App, Error, Result};

pub const APPS: &[&str] = &["wc", "indexer"];

pub fn load(app_name: &str) -> Result<App> {
    match app_name.trim() {
        "wc" => Ok(App::new("wc", app_wc::map, app_wc::reduce)),
        "indexer" => Ok(App::new("indexer", app_indexer::map, app_indexer::reduce)),
        other => Err(Error::UnknownApp(other.to_string())),
    }
}

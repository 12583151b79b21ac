use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{self, CatalogError, DataProvider, MemoryCatalog, RestCatalog};
use crate::config::{CatalogSource, Settings};

/// Where the catalog should come from once CLI and config are combined.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogChoice {
    Demo,
    Library(PathBuf),
    Remote(String),
    File(PathBuf),
}

/// A CLI argument wins over `catalog.source`: an `http(s)://` URL selects the
/// REST API, anything else is a music directory.
pub fn choose_catalog(settings: &Settings, arg: Option<&str>) -> CatalogChoice {
    if let Some(arg) = arg.map(str::trim).filter(|a| !a.is_empty()) {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            return CatalogChoice::Remote(arg.to_string());
        }
        return CatalogChoice::Library(PathBuf::from(arg));
    }

    let c = &settings.catalog;
    match c.source {
        CatalogSource::Demo => CatalogChoice::Demo,
        CatalogSource::Remote => CatalogChoice::Remote(c.base_url.clone()),
        CatalogSource::File => match &c.path {
            Some(p) => CatalogChoice::File(p.clone()),
            None => CatalogChoice::Demo,
        },
        CatalogSource::Library => {
            let dir = settings
                .library
                .dir
                .clone()
                .or_else(|| std::env::current_dir().ok())
                .unwrap_or_else(|| PathBuf::from("Music"));
            CatalogChoice::Library(dir)
        }
    }
}

/// Build the data provider and a label for the header.
pub fn open_catalog(
    settings: &Settings,
    choice: CatalogChoice,
) -> Result<(Arc<dyn DataProvider>, String), CatalogError> {
    let provider: Arc<dyn DataProvider> = match &choice {
        CatalogChoice::Demo => Arc::new(MemoryCatalog::seeded()),
        CatalogChoice::Library(dir) => Arc::new(catalog::scan(dir, &settings.library)),
        CatalogChoice::Remote(url) => Arc::new(RestCatalog::new(
            url,
            Duration::from_millis(settings.catalog.request_timeout_ms),
        )?),
        CatalogChoice::File(path) => Arc::new(MemoryCatalog::from_toml_file(path)?),
    };
    log::info!("catalog source: {}", label(&choice));
    Ok((provider, label(&choice)))
}

fn label(choice: &CatalogChoice) -> String {
    match choice {
        CatalogChoice::Demo => "demo".to_string(),
        CatalogChoice::Library(dir) => format!("library {}", display(dir)),
        CatalogChoice::Remote(url) => format!("api {url}"),
        CatalogChoice::File(path) => format!("file {}", display(path)),
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

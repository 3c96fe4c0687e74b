#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

//! Facetstore
//! A client-side store for the parameters of a faceted Solr search. It keeps track of which
//! parameter names may repeat, turns the whole parameter set into a query string and back, and
//! saves a chosen ("exposed") subset of names to a [`Persistence`] so a search can be bookmarked
//! and restored later.

use slog::Logger;

pub use error::{Error, ErrorResponse};
pub use parameter::Parameter;
pub use persist::{FileStore, FragmentStore, NoPersistence, Persistence};
pub use store::{Found, Multiplicity, ParameterStore, Slot, SlotMut, StoreBuilder, DEFAULT_MULTIPLE};
pub use value::{Pattern, Scalar, Value};

/// Errors from persistence, configuration and logging
mod error;

/// The `name=value` codec
mod parameter;

/// Where exposed state lives between sessions
mod persist;

/// The store and its multiplicity policy
mod store;

/// Parameter values and how they compare
mod value;

pub mod settings;

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(not(debug_assertions))]
pub fn setup_logging_from_file(path: &str) -> Result<Logger> {
    use sloggers::{Config, LoggerConfig};
    let file = std::fs::read_to_string(path)?;
    let cfg: LoggerConfig = toml::from_str(&file)?;
    Ok(cfg.build_logger()?)
}

#[cfg(debug_assertions)]
pub fn setup_logging_from_file(_: &str) -> Result<Logger> {
    use slog::{Drain, Level};
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let format = slog_term::FullFormat::new(decorator)
        .use_local_timestamp()
        .use_original_order()
        .build()
        .fuse();
    let sink = slog_async::Async::new(format).build().filter_level(Level::Trace).fuse();
    let filter = slog::o!("facetstore" => settings::VERSION);
    Ok(Logger::root(sink, filter))
}

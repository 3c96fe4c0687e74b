use std::str::FromStr;

use log::{info, warn};
use structopt::StructOpt;

use facetstore::settings::{settings, Settings};
use facetstore::{setup_logging_from_file, ErrorResponse, FileStore, ParameterStore, Pattern, Value};

#[derive(Debug, StructOpt)]
#[structopt(name = "facetstore", about = "Inspect and edit a persisted search parameter store")]
struct Cli {
    #[structopt(flatten)]
    settings: Settings,
    /// Print errors as JSON
    #[structopt(long)]
    json: bool,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Print the whole store as a query string
    Show,
    /// Print only the exposed names as a query string
    Exposed,
    /// Print what was last saved
    Stored,
    /// Print the values of a name as JSON
    Values { name: String },
    /// Add one value, or one value per argument for a repeatable name
    Add {
        name: String,
        #[structopt(required = true)]
        values: Vec<String>,
    },
    /// Remove a whole name, or just the values matching
    Remove {
        name: String,
        value: Option<String>,
        /// Treat the value as a regular expression
        #[structopt(short, long)]
        regex: bool,
    },
    /// Add every parameter of a query string
    Parse { query: String },
    /// Clear the exposed names
    Reset,
}

pub fn main() {
    let cli = Cli::from_args();
    let json = cli.json;
    if let Err(e) = run(cli) {
        if json {
            let resp = ErrorResponse::new(&e);
            println!("{}", serde_json::to_string(&resp).unwrap_or_else(|_| resp.message.clone()));
        } else {
            eprintln!("Error Encountered - {}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = settings(cli.settings)?;
    let logger = setup_logging_from_file(&settings.logging_config)?;
    let _scope = slog_scope::set_global_logger(logger);
    slog_stdlog::init_with_level(log::Level::from_str(&settings.log_level)?)?;

    let mut store = settings.store();
    store.load(true)?;
    info!("Loaded {} exposed names from {}", store.exposed().len(), settings.state_path);

    match cli.command {
        Command::Show => println!("{}", store),
        Command::Exposed => println!("{}", store.exposed_string()),
        Command::Stored => println!("{}", store.stored_string()?),
        Command::Values { name } => println!("{}", serde_json::to_string(&store.values(&name))?),
        Command::Add { name, mut values } => {
            let value = if values.len() == 1 {
                Value::from(values.remove(0))
            } else {
                Value::from(values)
            };
            let added = store.add_by_value(&name, value);
            if added.iter().any(|added| !added) {
                warn!("Some values of {} were already present", name);
            }
            save(&mut store)?;
        }
        Command::Remove { name, value, regex } => {
            let removed = match value {
                None => store.remove(&name, None),
                Some(value) if regex => store.remove_by_value(&name, Pattern::regex(&value)?).is_some(),
                Some(value) => store.remove_by_value(&name, value).is_some(),
            };
            if !removed {
                warn!("Nothing matched in {}", name);
            }
            save(&mut store)?;
        }
        Command::Parse { query } => {
            store.parse_string(&query);
            save(&mut store)?;
        }
        Command::Reset => {
            store.exposed_reset();
            save(&mut store)?;
        }
    }
    Ok(())
}

fn save(store: &mut ParameterStore<FileStore>) -> anyhow::Result<()> {
    store.save()?;
    println!("{}", store);
    Ok(())
}

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dmport",
    about = "dmport — import entity packages into a data modelling store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the document store API
    #[arg(long, global = true, default_value = "http://localhost:5000")]
    pub url: String,

    /// Access token sent with every request
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Replace existing remote targets instead of failing
    #[arg(short, long, global = true)]
    pub force: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import or delete entities
    #[command(subcommand)]
    Entities(EntitiesCommand),
    /// Import, initialize, or reset data sources
    #[command(subcommand, name = "data-source")]
    DataSource(DataSourceCommand),
}

#[derive(Subcommand)]
pub enum EntitiesCommand {
    /// Import a file or package directory into a destination
    Import(ImportArgs),
    /// Delete the entity at a remote target
    Delete(DeleteArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    /// File or directory to import. A trailing '/' imports the
    /// directory's content instead of the directory itself
    pub source: String,
    /// Destination: <data-source>[/<package>...]
    pub destination: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Remote target: <data-source>/<package>/.../<entity>
    pub target: String,
}

#[derive(Subcommand)]
pub enum DataSourceCommand {
    /// Import a single data source definition file
    Import(DataSourceImportArgs),
    /// Import every data source definition found in a directory
    ImportAll(DataSourceImportAllArgs),
    /// Initialize all data sources and import their packages
    Init(InitArgs),
    /// Reset one data source (delete and re-upload its root packages)
    Reset(ResetArgs),
}

#[derive(Args)]
pub struct DataSourceImportArgs {
    /// Path to a data source definition (JSON)
    pub path: String,
}

#[derive(Args)]
pub struct DataSourceImportAllArgs {
    /// Directory containing data source definitions
    pub path: String,
}

#[derive(Args)]
pub struct InitArgs {
    /// Application directory containing 'data_sources' and 'data'
    pub path: String,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Name of the data source to reset
    pub data_source: String,
    /// Application directory containing 'data_sources' and 'data'
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_entities_import() {
        let cli = Cli::try_parse_from(["dmport", "entities", "import", "./pkg", "ds/Root"]).unwrap();
        match cli.command {
            Command::Entities(EntitiesCommand::Import(args)) => {
                assert_eq!(args.source, "./pkg");
                assert_eq!(args.destination, "ds/Root");
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn parse_entities_delete() {
        let cli = Cli::try_parse_from(["dmport", "entities", "delete", "ds/Root/doc"]).unwrap();
        match cli.command {
            Command::Entities(EntitiesCommand::Delete(args)) => {
                assert_eq!(args.target, "ds/Root/doc");
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn parse_force_flag() {
        let cli =
            Cli::try_parse_from(["dmport", "--force", "entities", "import", "p", "ds"]).unwrap();
        assert!(cli.force);
    }

    #[test]
    fn parse_url_and_token() {
        let cli = Cli::try_parse_from([
            "dmport",
            "--url",
            "http://dmss:8000",
            "--token",
            "secret",
            "entities",
            "delete",
            "ds/x",
        ])
        .unwrap();
        assert_eq!(cli.url, "http://dmss:8000");
        assert_eq!(cli.token.as_deref(), Some("secret"));
    }

    #[test]
    fn url_defaults_to_localhost() {
        let cli = Cli::try_parse_from(["dmport", "entities", "delete", "ds/x"]).unwrap();
        assert_eq!(cli.url, "http://localhost:5000");
        assert!(!cli.force);
    }

    #[test]
    fn parse_data_source_import() {
        let cli =
            Cli::try_parse_from(["dmport", "data-source", "import", "ds.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::DataSource(DataSourceCommand::Import(_))
        ));
    }

    #[test]
    fn parse_data_source_import_all() {
        let cli =
            Cli::try_parse_from(["dmport", "data-source", "import-all", "./data_sources"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::DataSource(DataSourceCommand::ImportAll(_))
        ));
    }

    #[test]
    fn parse_data_source_init() {
        let cli = Cli::try_parse_from(["dmport", "data-source", "init", "./app"]).unwrap();
        match cli.command {
            Command::DataSource(DataSourceCommand::Init(args)) => assert_eq!(args.path, "./app"),
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn parse_data_source_reset() {
        let cli =
            Cli::try_parse_from(["dmport", "data-source", "reset", "DemoDS", "./app"]).unwrap();
        match cli.command {
            Command::DataSource(DataSourceCommand::Reset(args)) => {
                assert_eq!(args.data_source, "DemoDS");
                assert_eq!(args.path, "./app");
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["dmport", "-v", "entities", "delete", "ds/x"]).unwrap();
        assert!(cli.verbose);
    }
}

use anyhow::Result;
use clap::Parser;
use folio_fetch::config::Config;
use folio_fetch::importer::{self, ImportOptions};
use folio_fetch::runtime::RealRuntime;
use std::path::PathBuf;

/// folio-fetch - portfolio data importer
///
/// Fetches GitHub profile data and Medium blog data at build time and
/// writes the raw JSON payloads into the site's public directory.
///
/// Feature toggles and credentials come from the environment:
/// USE_GITHUB_DATA, GITHUB_USERNAME, GITHUB_TOKEN, USE_MEDIUM_DATA,
/// MEDIUM_USERNAME.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Output directory for the fetched JSON files
    #[arg(
        long = "output-dir",
        short = 'o',
        env = "FOLIO_OUTPUT_DIR",
        value_name = "PATH",
        default_value = "./public"
    )]
    output_dir: PathBuf,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "github-api-url", value_name = "URL")]
    github_api_url: Option<String>,

    /// rss2json API URL (defaults to https://api.rss2json.com)
    #[arg(long = "medium-api-url", value_name = "URL")]
    medium_api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    let config = Config::from_runtime(&runtime)?;

    let options = ImportOptions {
        output_dir: cli.output_dir,
        github_api_url: cli.github_api_url,
        medium_api_url: cli.medium_api_url,
    };
    importer::import(&runtime, &config, &options).await
}

use std::path::PathBuf;

use crate::prelude::*;
use clap::Parser;

mod api;
mod cache;
mod clipboard;
mod download;
mod error;
mod notify;
mod pages;
mod poll;
mod prelude;
#[cfg(test)]
mod testing;
mod widgets;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Terminal console for the NAMASTE / ICD-11 TM2 terminology service"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Base URL of the terminology backend
    #[clap(long, env = "NAMASTE_API_URL", global = true)]
    api_url: Option<String>,

    /// Directory downloaded files are written to
    #[clap(long, env = "NAMASTE_OUTPUT_DIR", global = true, default_value = ".")]
    output_dir: PathBuf,

    /// Whether to display additional information.
    #[clap(long, env = "NAMASTE_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Translate a code between NAMASTE and ICD-11 TM2
    Translate(crate::pages::translation::TranslateOptions),

    /// Search terminology by label, synonym or code
    Search(crate::pages::search::SearchOptions),

    /// Total terms, quick statistics and backend health
    Dashboard(crate::pages::dashboard::DashboardOptions),

    /// CSV ingestion, sample data and statistics
    Admin(crate::pages::admin::App),

    /// FHIR CodeSystem / ConceptMap resources
    Fhir(crate::pages::fhir::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Translate(options) => {
            crate::pages::translation::run(options, app.global).await
        }
        SubCommands::Search(options) => crate::pages::search::run(options, app.global).await,
        SubCommands::Dashboard(options) => {
            crate::pages::dashboard::run(options, app.global).await
        }
        SubCommands::Admin(sub_app) => crate::pages::admin::run(sub_app, app.global).await,
        SubCommands::Fhir(sub_app) => crate::pages::fhir::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}

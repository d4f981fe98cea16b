use std::path::{Path, PathBuf};
use std::sync::Mutex;

use colored::Colorize;
use namaste_core::admin::{
    csv_preview, ensure_csv_content, ensure_csv_media_type, media_type_for, CsvPreview,
    UploadStatus, PREVIEW_LINES, SAMPLE_CSV, SAMPLE_CSV_FILE_NAME,
};
use namaste_core::query::{QueryKey, RequestStatus, DATA_MUTATION_KEYS};
use namaste_core::statistics::StatisticsResponse;
use tokio::io::AsyncReadExt;

use super::PageContext;
use crate::prelude::{println, *};
use crate::widgets::{print_heading, print_stat_cards};

#[derive(Debug, clap::Parser)]
#[command(name = "admin")]
#[command(about = "Data management: CSV ingestion, sample data and statistics")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Show data-store statistics
    #[clap(name = "stats")]
    Stats(StatsOptions),

    /// Upload a NAMASTE CSV file for ingestion
    #[clap(name = "ingest")]
    Ingest(IngestOptions),

    /// Ask the backend to load its bundled sample data
    #[clap(name = "load-sample")]
    LoadSample,

    /// Remove all terminology data from the backend
    #[clap(name = "clear")]
    Clear,

    /// Save the sample CSV template to the output directory
    #[clap(name = "sample-csv")]
    SampleCsv,
}

#[derive(Debug, clap::Args, Clone)]
pub struct StatsOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # Upload a CSV file:
  namaste admin ingest terms.csv

  # Pipe CSV content from another command:
  cat terms.csv | namaste admin ingest -")]
pub struct IngestOptions {
    /// CSV file to upload, or '-' to read CSV content from stdin
    pub file: PathBuf,

    /// Only show the preview; do not upload
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Default)]
struct AdminState {
    file_name: Option<String>,
    content: String,
    upload: UploadStatus,
    load_sample: RequestStatus,
    clear: RequestStatus,
}

/// Admin page.
///
/// The three mutations (upload, load sample, clear) share one lock: while one
/// is in flight the others are refused with [`namaste_core::Error::Busy`]
/// rather than queued.
pub struct AdminController {
    ctx: PageContext,
    state: Mutex<AdminState>,
    mutation: tokio::sync::Mutex<()>,
}

impl AdminController {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(AdminState::default()),
            mutation: tokio::sync::Mutex::new(()),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut AdminState) -> R) -> R {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    pub fn upload_status(&self) -> UploadStatus {
        self.with_state(|s| s.upload)
    }

    pub fn load_sample_status(&self) -> RequestStatus {
        self.with_state(|s| s.load_sample)
    }

    pub fn clear_status(&self) -> RequestStatus {
        self.with_state(|s| s.clear)
    }

    pub fn file_name(&self) -> Option<String> {
        self.with_state(|s| s.file_name.clone())
    }

    pub fn content(&self) -> String {
        self.with_state(|s| s.content.clone())
    }

    /// Select a CSV file. The media type is checked from the file name
    /// before anything is read.
    pub async fn select_file(&self, path: &Path) -> Result<(), Error> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Err(err) = ensure_csv_media_type(media_type_for(&file_name)) {
            log::debug!("rejected {}: {err:?}", path.display());
            self.ctx.error(err.to_string());
            return Err(err.into());
        }

        let content = match tokio::fs::read(path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                let err = Error::Io(format!("Failed to read {}: {e}", path.display()));
                self.ctx.report_failure("Failed to read file", &err);
                return Err(err);
            }
        };

        self.with_state(|s| {
            s.file_name = Some(file_name);
            s.content = content;
            s.upload = UploadStatus::Idle;
        });
        Ok(())
    }

    /// Use CSV text directly, without a file.
    pub fn set_content(&self, content: impl Into<String>) {
        let content = content.into();
        self.with_state(|s| {
            s.file_name = None;
            s.content = content;
            s.upload = UploadStatus::Idle;
        });
    }

    pub fn preview(&self) -> CsvPreview {
        self.with_state(|s| csv_preview(&s.content, PREVIEW_LINES))
    }

    fn lock_mutation(&self) -> Result<tokio::sync::MutexGuard<'_, ()>, Error> {
        self.mutation.try_lock().map_err(|_| {
            let err = namaste_core::Error::Busy;
            self.ctx.error(err.to_string());
            Error::Input(err)
        })
    }

    pub async fn upload(&self) -> Result<(), Error> {
        let content = self.content();
        if let Err(err) = ensure_csv_content(&content) {
            self.ctx.error(err.to_string());
            return Err(err.into());
        }

        let _guard = self.lock_mutation()?;
        self.with_state(|s| s.upload = UploadStatus::Uploading);

        match self.ctx.api.ingest_csv(content).await {
            Ok(response) => {
                log::debug!("ingest acknowledged: {:?}", response.message);
                self.with_state(|s| s.upload = UploadStatus::Success);
                self.ctx.cache.invalidate_all(&DATA_MUTATION_KEYS);
                self.ctx.success("CSV uploaded and processed successfully!");
                Ok(())
            }
            Err(err) => {
                self.with_state(|s| s.upload = UploadStatus::Error);
                self.ctx.report_failure("Failed to upload CSV", &err);
                Err(err)
            }
        }
    }

    pub async fn load_sample(&self) -> Result<(), Error> {
        let _guard = self.lock_mutation()?;
        self.with_state(|s| s.load_sample = RequestStatus::Loading);

        match self.ctx.api.load_sample_data().await {
            Ok(_) => {
                self.with_state(|s| s.load_sample = RequestStatus::Success);
                self.ctx.cache.invalidate_all(&DATA_MUTATION_KEYS);
                self.ctx.success("Sample data loaded successfully!");
                Ok(())
            }
            Err(err) => {
                self.with_state(|s| s.load_sample = RequestStatus::Error);
                self.ctx.report_failure("Failed to load sample data", &err);
                Err(err)
            }
        }
    }

    pub async fn clear_all(&self) -> Result<(), Error> {
        let _guard = self.lock_mutation()?;
        self.with_state(|s| s.clear = RequestStatus::Loading);

        match self.ctx.api.clear_data().await {
            Ok(_) => {
                self.with_state(|s| s.clear = RequestStatus::Success);
                self.ctx.cache.invalidate_all(&DATA_MUTATION_KEYS);
                self.ctx.success("All data cleared successfully!");
                Ok(())
            }
            Err(err) => {
                self.with_state(|s| s.clear = RequestStatus::Error);
                self.ctx.report_failure("Failed to clear data", &err);
                Err(err)
            }
        }
    }

    /// Write the sample template to `dir`. Nothing is fetched.
    pub async fn download_sample(&self, dir: &Path) -> Result<PathBuf, Error> {
        match crate::download::save(dir, SAMPLE_CSV_FILE_NAME, SAMPLE_CSV.as_bytes()).await {
            Ok(path) => {
                self.ctx.success("Sample CSV downloaded!");
                Ok(path)
            }
            Err(err) => {
                self.ctx.report_failure("Failed to download sample CSV", &err);
                Err(err)
            }
        }
    }

    /// Statistics through the shared cache.
    pub async fn statistics(&self) -> Result<StatisticsResponse, Error> {
        let api = self.ctx.api.clone();
        let result = self
            .ctx
            .cache
            .fetch(QueryKey::Statistics, "", || async move { api.statistics().await })
            .await;

        if let Err(err) = &result {
            self.ctx.report_failure("Failed to load statistics", err);
        }
        result
    }

    /// Print the selected content's preview.
    pub fn render_preview(&self) {
        let preview = self.preview();
        let title = self
            .file_name()
            .map(|name| f!("Preview: {name}"))
            .unwrap_or_else(|| "Preview".to_string());

        print_heading(&title, None);
        for line in &preview.lines {
            println!("  {}", line.bright_black());
        }
        if let Some(footer) = preview.footer() {
            println!("  {}", footer.italic());
        }
    }
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let ctx = PageContext::from_global(&global)?;
    let page = AdminController::new(ctx);

    match app.command {
        Commands::Stats(options) => {
            let response = page.statistics().await?;
            if options.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_heading("Database Statistics", None);
                print_stat_cards(&response.statistics_or_default());
            }
        }
        Commands::Ingest(options) => {
            if options.file.as_os_str() == "-" {
                let mut content = String::new();
                tokio::io::stdin().read_to_string(&mut content).await?;
                page.set_content(content);
            } else {
                page.select_file(&options.file).await?;
            }

            page.render_preview();

            if !options.dry_run {
                page.upload().await?;
                if let Some(banner) = page.upload_status().banner() {
                    println!("{}", banner.bold());
                }
            }
        }
        Commands::LoadSample => page.load_sample().await?,
        Commands::Clear => page.clear_all().await?,
        Commands::SampleCsv => {
            let path = page.download_sample(&global.output_dir).await?;
            if global.verbose {
                println!("Saved {}", path.display());
            }
        }
    }

    Ok(())
}

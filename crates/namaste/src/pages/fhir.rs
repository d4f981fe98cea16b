use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use namaste_core::fhir::{parse_bundle, pretty_json, FhirResourceKind, ResourcePanel};
use namaste_core::query::DATA_MUTATION_KEYS;
use serde_json::Value;

use super::PageContext;
use crate::clipboard::{Clipboard, CopyIndicator, TerminalClipboard};
use crate::prelude::{println, *};
use crate::widgets::{highlight_json, print_heading};

const BUNDLE_PARSE_ERROR: &str = "Error processing FHIR Bundle. Please ensure it is valid JSON.";

#[derive(Debug, clap::Parser)]
#[command(name = "fhir")]
#[command(about = "FHIR CodeSystem / ConceptMap resources and bundle ingestion")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Generate a resource and print it
    #[clap(name = "show")]
    Show(ShowOptions),

    /// Generate a resource and save it as namaste-<kind>.json
    #[clap(name = "download")]
    Download(ResourceOptions),

    /// Generate a resource and copy it to the clipboard
    #[clap(name = "copy")]
    Copy(ResourceOptions),

    /// Send a FHIR Bundle JSON file to the backend
    #[clap(name = "ingest")]
    Ingest(IngestOptions),
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ResourceArg {
    #[value(name = "codesystem")]
    CodeSystem,
    #[value(name = "conceptmap")]
    ConceptMap,
}

impl From<ResourceArg> for FhirResourceKind {
    fn from(arg: ResourceArg) -> Self {
        match arg {
            ResourceArg::CodeSystem => FhirResourceKind::CodeSystem,
            ResourceArg::ConceptMap => FhirResourceKind::ConceptMap,
        }
    }
}

#[derive(Debug, clap::Args, Clone)]
pub struct ResourceOptions {
    /// Resource to generate
    #[arg(value_enum)]
    pub kind: ResourceArg,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ShowOptions {
    /// Resource to generate
    #[arg(value_enum)]
    pub kind: ResourceArg,

    /// Print the raw JSON without colors or summary
    #[arg(long)]
    pub json: bool,

    /// Only print the summary line
    #[arg(long)]
    pub summary: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct IngestOptions {
    /// FHIR Bundle JSON file
    pub file: PathBuf,
}

/// FHIR page: one panel per resource kind. Copy and download work on the
/// payload already fetched and never go back to the backend.
pub struct FhirController {
    ctx: PageContext,
    clipboard: Arc<dyn Clipboard>,
    copied: CopyIndicator,
    panels: HashMap<FhirResourceKind, ResourcePanel>,
}

impl FhirController {
    pub fn new(ctx: PageContext, clipboard: Arc<dyn Clipboard>) -> Self {
        let panels = FhirResourceKind::ALL
            .into_iter()
            .map(|kind| (kind, ResourcePanel::default()))
            .collect();

        Self {
            ctx,
            clipboard,
            copied: CopyIndicator::new(),
            panels,
        }
    }

    fn panel_mut(&mut self, kind: FhirResourceKind) -> &mut ResourcePanel {
        self.panels.entry(kind).or_default()
    }

    pub fn panel(&self, kind: FhirResourceKind) -> Option<&ResourcePanel> {
        self.panels.get(&kind)
    }

    pub fn payload(&self, kind: FhirResourceKind) -> Option<&Value> {
        self.panel(kind).and_then(ResourcePanel::payload)
    }

    pub async fn generate(&mut self, kind: FhirResourceKind) -> Result<(), Error> {
        self.panel_mut(kind).begin();

        match self.ctx.api.fhir_resource(kind).await {
            Ok(resource) => {
                self.panel_mut(kind).complete(resource);
                self.ctx.success(f!("{kind} generated successfully!"));
                Ok(())
            }
            Err(err) => {
                self.panel_mut(kind).fail();
                self.ctx.report_failure(&f!("Failed to generate {kind}"), &err);
                Err(err)
            }
        }
    }

    /// Show or hide a panel; returns the new visibility.
    pub fn toggle(&mut self, kind: FhirResourceKind) -> bool {
        self.panel_mut(kind).toggle()
    }

    fn require_payload(&self, kind: FhirResourceKind) -> Result<String, Error> {
        match self.payload(kind) {
            Some(resource) => Ok(pretty_json(resource)),
            None => {
                let err = namaste_core::Error::MissingPayload(kind.label().to_string());
                self.ctx.error(err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn copy(&self, kind: FhirResourceKind) -> Result<(), Error> {
        let text = self.require_payload(kind)?;

        if let Err(err) = self.clipboard.write_text(&text) {
            self.ctx.report_failure("Failed to copy to clipboard", &err);
            return Err(err);
        }

        self.copied.mark(kind.slug());
        self.ctx.success(f!("{kind} copied to clipboard!"));
        Ok(())
    }

    pub fn is_copied(&self, kind: FhirResourceKind) -> bool {
        self.copied.is_copied(kind.slug())
    }

    pub async fn download(&self, kind: FhirResourceKind, dir: &Path) -> Result<PathBuf, Error> {
        let text = self.require_payload(kind)?;

        match crate::download::save(dir, &kind.file_name(), text.as_bytes()).await {
            Ok(path) => {
                self.ctx.success(f!("{kind} downloaded!"));
                Ok(path)
            }
            Err(err) => {
                self.ctx.report_failure(&f!("Failed to download {kind}"), &err);
                Err(err)
            }
        }
    }

    /// Read a bundle file, check it parses, then send it.
    pub async fn ingest_bundle(&self, path: &Path) -> Result<(), Error> {
        let content = match tokio::fs::read(path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                let err = Error::Io(format!("Failed to read {}: {e}", path.display()));
                self.ctx.report_failure("Please select a FHIR Bundle JSON file", &err);
                return Err(err);
            }
        };

        let bundle = match parse_bundle(&content) {
            Ok(bundle) => bundle,
            Err(err) => {
                log::debug!("bundle {} did not parse: {err}", path.display());
                self.ctx.error(BUNDLE_PARSE_ERROR);
                return Err(err.into());
            }
        };

        match self.ctx.api.ingest_bundle(bundle).await {
            Ok(response) => {
                let message = match response.message {
                    Some(message) => f!("Bundle Ingestion successful: {message}"),
                    None => "Bundle Ingestion successful".to_string(),
                };
                self.ctx.cache.invalidate_all(&DATA_MUTATION_KEYS);
                self.ctx.success(message);
                Ok(())
            }
            Err(err) => {
                self.ctx.report_failure("Bundle ingestion failed", &err);
                Err(err)
            }
        }
    }

    /// Print the panel for `kind`: summary line, then the JSON when shown.
    pub fn render(&self, kind: FhirResourceKind) {
        let Some(panel) = self.panel(kind) else {
            return;
        };

        let subtitle = panel.payload().map(|resource| kind.summary(resource));
        print_heading(&f!("NAMASTE {kind}"), subtitle.as_deref());

        if let Some(resource) = panel.visible_payload() {
            println!("{}", highlight_json(&pretty_json(resource)));
        }
    }
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let ctx = PageContext::from_global(&global)?;
    let mut page = FhirController::new(ctx, Arc::new(TerminalClipboard::new()));

    match app.command {
        Commands::Show(options) => {
            let kind = options.kind.into();
            page.generate(kind).await?;

            if options.json {
                if let Some(resource) = page.payload(kind) {
                    println!("{}", pretty_json(resource));
                }
            } else {
                if options.summary {
                    page.toggle(kind);
                }
                page.render(kind);
            }
        }
        Commands::Download(options) => {
            let kind = options.kind.into();
            page.generate(kind).await?;
            let path = page.download(kind, &global.output_dir).await?;
            println!("{}", path.display().to_string().bright_black());
        }
        Commands::Copy(options) => {
            let kind = options.kind.into();
            page.generate(kind).await?;
            page.copy(kind)?;
        }
        Commands::Ingest(options) => page.ingest_bundle(&options.file).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{code_system_fixture, concept_map_fixture, http_error, Call, Harness};
    use namaste_core::query::RequestStatus;
    use serde_json::json;

    fn page(harness: &Harness) -> FhirController {
        FhirController::new(harness.ctx.clone(), harness.clipboard.clone())
    }

    // ============================================================================
    // generate tests
    // ============================================================================

    #[tokio::test]
    async fn test_generate_shows_panel_and_notifies() {
        let harness = Harness::new();
        let mut page = page(&harness);

        page.generate(FhirResourceKind::ConceptMap).await.unwrap();

        let panel = page.panel(FhirResourceKind::ConceptMap).unwrap();
        assert!(panel.is_visible());
        assert_eq!(panel.payload(), Some(&concept_map_fixture()));
        assert_eq!(
            FhirResourceKind::ConceptMap.summary(panel.payload().unwrap()),
            "2 mappings"
        );
        assert_eq!(harness.api.calls(), vec![Call::ConceptMap]);
        assert_eq!(
            harness.notifier.last().unwrap().message,
            "ConceptMap generated successfully!"
        );
    }

    #[tokio::test]
    async fn test_failed_generate_keeps_previous_payload() {
        let harness = Harness::new();
        let mut page = page(&harness);

        page.generate(FhirResourceKind::CodeSystem).await.unwrap();
        harness.api.fail_with(http_error(500, None));
        assert!(page.generate(FhirResourceKind::CodeSystem).await.is_err());

        let panel = page.panel(FhirResourceKind::CodeSystem).unwrap();
        assert_eq!(panel.status(), RequestStatus::Error);
        assert_eq!(panel.payload(), Some(&code_system_fixture()));
        assert_eq!(
            harness.notifier.last().unwrap().message,
            "Failed to generate CodeSystem"
        );
    }

    #[tokio::test]
    async fn test_toggle_hides_and_shows() {
        let harness = Harness::new();
        let mut page = page(&harness);
        page.generate(FhirResourceKind::CodeSystem).await.unwrap();

        assert!(!page.toggle(FhirResourceKind::CodeSystem));
        assert!(page
            .panel(FhirResourceKind::CodeSystem)
            .unwrap()
            .visible_payload()
            .is_none());
        assert!(page.toggle(FhirResourceKind::CodeSystem));
    }

    // ============================================================================
    // copy / download tests
    // ============================================================================

    #[tokio::test]
    async fn test_copy_uses_fetched_payload_without_refetch() {
        let harness = Harness::new();
        let mut page = page(&harness);
        page.generate(FhirResourceKind::CodeSystem).await.unwrap();

        page.copy(FhirResourceKind::CodeSystem).unwrap();

        assert_eq!(
            harness.clipboard.writes(),
            vec![serde_json::to_string_pretty(&code_system_fixture()).unwrap()]
        );
        assert_eq!(harness.api.call_count(), 1);
        assert!(page.is_copied(FhirResourceKind::CodeSystem));
        assert_eq!(
            harness.notifier.last().unwrap().message,
            "CodeSystem copied to clipboard!"
        );
    }

    #[tokio::test]
    async fn test_copy_without_payload_does_nothing() {
        let harness = Harness::new();
        let page = page(&harness);

        let err = page.copy(FhirResourceKind::ConceptMap).unwrap_err();

        assert!(matches!(
            err,
            Error::Input(namaste_core::Error::MissingPayload(_))
        ));
        assert!(harness.clipboard.writes().is_empty());
        assert_eq!(harness.api.call_count(), 0);
        assert!(harness.notifier.last().unwrap().is_error());
    }

    #[tokio::test]
    async fn test_download_writes_pretty_json() {
        let harness = Harness::new();
        let mut page = page(&harness);
        let tmp = tempfile::tempdir().unwrap();
        page.generate(FhirResourceKind::ConceptMap).await.unwrap();

        let path = page
            .download(FhirResourceKind::ConceptMap, tmp.path())
            .await
            .unwrap();

        assert_eq!(path, tmp.path().join("namaste-conceptmap.json"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            serde_json::to_string_pretty(&concept_map_fixture()).unwrap()
        );
        assert!(written.contains("\n  \"group\""));
        assert_eq!(harness.api.call_count(), 1);
        assert_eq!(
            harness.notifier.last().unwrap().message,
            "ConceptMap downloaded!"
        );
    }

    #[tokio::test]
    async fn test_download_without_payload_writes_nothing() {
        let harness = Harness::new();
        let page = page(&harness);
        let tmp = tempfile::tempdir().unwrap();

        assert!(page
            .download(FhirResourceKind::CodeSystem, tmp.path())
            .await
            .is_err());
        assert!(!tmp.path().join("namaste-codesystem.json").exists());
    }

    // ============================================================================
    // bundle ingest tests
    // ============================================================================

    #[tokio::test]
    async fn test_malformed_bundle_is_not_sent() {
        let harness = Harness::new();
        let page = page(&harness);
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bundle.json");
        std::fs::write(&path, "{\"resourceType\": \"Bundle\",").unwrap();

        let err = page.ingest_bundle(&path).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Input(namaste_core::Error::MalformedJson(_))
        ));
        assert_eq!(harness.api.call_count(), 0);
        assert_eq!(harness.notifier.last().unwrap().message, BUNDLE_PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_non_utf8_bundle_is_decoded_lossily() {
        let harness = Harness::new();
        let page = page(&harness);
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bundle.json");
        std::fs::write(&path, b"{\"resourceType\": \"Bundle\", \"note\": \"caf\xe9\"}").unwrap();

        page.ingest_bundle(&path).await.unwrap();

        assert_eq!(
            harness.api.calls(),
            vec![Call::IngestBundle(
                json!({"resourceType": "Bundle", "note": "caf\u{FFFD}"})
            )]
        );
    }

    #[tokio::test]
    async fn test_bundle_is_posted_as_parsed() {
        let harness = Harness::new();
        let page = page(&harness);
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bundle.json");
        let bundle = json!({"resourceType": "Bundle", "type": "transaction", "entry": []});
        std::fs::write(&path, bundle.to_string()).unwrap();

        page.ingest_bundle(&path).await.unwrap();

        assert_eq!(harness.api.calls(), vec![Call::IngestBundle(bundle)]);
        assert_eq!(
            harness.notifier.last().unwrap().message,
            "Bundle Ingestion successful: Bundle stored"
        );
    }
}

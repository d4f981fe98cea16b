use std::sync::Arc;

use colored::Colorize;
use namaste_core::terminology::CodeSystem;
use namaste_core::translation::{empty_state_message, ResultView, TranslationState};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::PageContext;
use crate::clipboard::{Clipboard, CopyIndicator, TerminalClipboard};
use crate::prelude::{eprintln, println, *};

/// Options for translating a code
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # Translate a NAMASTE code into ICD-11 TM2:
  namaste translate AY001

  # Translate an ICD-11 TM2 code back into NAMASTE:
  namaste translate TM2-AY134 --system ICD-11-TM2

  # Interactive session (:swap, :copy <n>, :quit):
  namaste translate --interactive")]
pub struct TranslateOptions {
    /// Code to translate (e.g., "AY001" or "TM2-AY134")
    pub code: Option<String>,

    /// Source code system (NAMASTE or ICD-11-TM2)
    #[arg(short, long, default_value = "NAMASTE")]
    pub system: CodeSystem,

    /// Copy the n-th translated code (1-indexed) to the clipboard
    #[arg(long)]
    pub copy: Option<usize>,

    /// Let the backend work out the source system (ignores --system)
    #[arg(long)]
    pub detect: bool,

    /// Read codes from stdin interactively
    #[arg(short, long)]
    pub interactive: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Translation page: one input, one source system, one displayed result.
pub struct TranslationController {
    ctx: PageContext,
    clipboard: Arc<dyn Clipboard>,
    copied: CopyIndicator,
    state: TranslationState,
    detect_system: bool,
}

impl TranslationController {
    pub fn new(ctx: PageContext, clipboard: Arc<dyn Clipboard>, source: CodeSystem) -> Self {
        Self {
            ctx,
            clipboard,
            copied: CopyIndicator::new(),
            state: TranslationState::new(source),
            detect_system: false,
        }
    }

    pub fn state(&self) -> &TranslationState {
        &self.state
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.state.set_input(input);
    }

    pub fn select_source(&mut self, system: CodeSystem) {
        self.state.select_source(system);
    }

    pub fn swap_systems(&mut self) {
        self.state.swap_systems();
    }

    /// Send codes without a system and let the backend recognise it.
    pub fn set_detect_system(&mut self, detect: bool) {
        self.detect_system = detect;
    }

    /// Submit the current input.
    ///
    /// Blank input is rejected without touching the network. On failure the
    /// previously displayed result stays.
    pub async fn translate(&mut self) -> Result<(), Error> {
        let request = match self.state.begin_submit() {
            Ok(request) => request,
            Err(err) => {
                self.ctx.error(err.to_string());
                return Err(err.into());
            }
        };

        let result = if self.detect_system {
            self.ctx.api.translate(&request.code).await
        } else {
            self.ctx
                .api
                .translate_code(&request.code, request.system)
                .await
        };

        match result {
            Ok(response) => {
                self.state.complete(response);
                self.ctx.success("Translation completed!");
                Ok(())
            }
            Err(err) => {
                self.state.fail();
                self.ctx.report_failure(
                    "Translation failed. Please check the code and try again.",
                    &err,
                );
                Err(err)
            }
        }
    }

    /// Copy a code to the clipboard and flag it as copied for two seconds.
    pub fn copy(&self, code: &str) -> Result<(), Error> {
        if let Err(err) = self.clipboard.write_text(code) {
            self.ctx.report_failure("Failed to copy to clipboard", &err);
            return Err(err);
        }
        self.copied.mark(code);
        self.ctx.success("Copied to clipboard!");
        Ok(())
    }

    /// Copy the n-th (1-indexed) translation of the displayed result.
    pub fn copy_nth(&self, n: usize) -> Result<(), Error> {
        let code = self
            .state
            .displayed()
            .and_then(|d| n.checked_sub(1).and_then(|i| d.response.translations.get(i)))
            .map(|t| t.code.clone());

        match code {
            Some(code) => self.copy(&code),
            None => {
                let err = namaste_core::Error::validation(f!("No translation number {n} to copy"));
                self.ctx.error(err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn is_copied(&self, code: &str) -> bool {
        self.copied.is_copied(code)
    }

    /// Print the system selector line and the result area.
    pub fn render(&self) {
        let source = self.state.source();
        println!(
            "{} {} {}",
            source.display_name().green(),
            "→".bright_black(),
            source.target().display_name().blue()
        );

        match self.state.result_view() {
            ResultView::Nothing => {
                if self.state.input().trim().is_empty() {
                    println!("{}", source.placeholder().bright_black());
                }
            }
            ResultView::Empty(displayed) => {
                println!("\n{}", "No translations found".bold());
                println!(
                    "{}",
                    empty_state_message(&displayed.code, displayed.system).bright_black()
                );
                self.render_footer(displayed);
            }
            ResultView::Matches(displayed) => {
                println!(
                    "\n{} {}",
                    displayed.code.bold().bright_white(),
                    f!("({} translation(s) found)", displayed.response.total).bright_black()
                );
                for (i, t) in displayed.response.translations.iter().enumerate() {
                    let marker = if self.is_copied(&t.code) {
                        "✓".green().to_string()
                    } else {
                        f!("{}.", i + 1).bright_black().to_string()
                    };
                    let system = match t.system {
                        CodeSystem::Namaste => t.system.as_str().green(),
                        CodeSystem::Icd11Tm2 => t.system.as_str().blue(),
                    };
                    println!("  {marker} {system} {} {}", t.code.bold(), t.display);
                    if let Some(url) = t.browser_url() {
                        println!("     {}", url.bright_black().underline());
                    }
                }
                self.render_footer(displayed);
            }
        }
    }

    fn render_footer(&self, displayed: &namaste_core::translation::DisplayedTranslation) {
        println!(
            "{}",
            f!(
                "Translation completed at {}  |  Source: {} → Target: {}",
                displayed.response.completed_at(),
                displayed.response.source.system,
                displayed.response.target_label()
            )
            .bright_black()
        );
    }
}

/// Handle the translate command
pub async fn run(options: TranslateOptions, global: crate::Global) -> Result<()> {
    let ctx = PageContext::from_global(&global)?;
    let mut page = TranslationController::new(ctx, Arc::new(TerminalClipboard::new()), options.system);
    page.set_detect_system(options.detect);

    if options.interactive {
        return interactive(page).await;
    }

    let code = options
        .code
        .ok_or_eyre("A code is required unless --interactive is set")?;
    page.set_input(code);
    page.translate().await?;

    if let Some(n) = options.copy {
        page.copy_nth(n)?;
    }

    if options.json {
        if let Some(displayed) = page.state().displayed() {
            println!("{}", serde_json::to_string_pretty(&displayed.response)?);
        }
    } else {
        page.render();
    }

    Ok(())
}

/// Line-oriented session: each line is a code, or one of `:swap`,
/// `:system <name>`, `:copy <n>`, `:quit`.
async fn interactive(mut page: TranslationController) -> Result<()> {
    page.render();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let mut parts = line.splitn(2, char::is_whitespace);

        match (parts.next().unwrap_or_default(), parts.next().map(str::trim)) {
            (":quit" | ":q", _) => break,
            (":swap", _) => page.swap_systems(),
            (":system", Some(name)) => match name.parse::<CodeSystem>() {
                Ok(system) => page.select_source(system),
                Err(err) => eprintln!("{}", err.red()),
            },
            (":copy", Some(n)) => match n.parse::<usize>() {
                Ok(n) => {
                    // Failures are already reported as notifications.
                    let _ = page.copy_nth(n);
                }
                Err(_) => eprintln!("{}", "Usage: :copy <n>".red()),
            },
            (cmd, _) if cmd.starts_with(':') => {
                eprintln!("{}", "Commands: :swap, :system <name>, :copy <n>, :quit".red())
            }
            _ => {
                page.set_input(line);
                let _ = page.translate().await;
            }
        }

        page.render();
    }

    Ok(())
}

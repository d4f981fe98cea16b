use namaste_core::query::{QueryKey, RequestStatus};
use namaste_core::terminology::{prepare_search_query, SearchResponse};

use super::PageContext;
use crate::prelude::{println, *};

#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  namaste search amlapitta
  namaste search \"vata dosha\" --json")]
pub struct SearchOptions {
    /// Term to search for (label, synonym or code)
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Search page. Results are cached per query until data changes.
pub struct SearchController {
    ctx: PageContext,
    status: RequestStatus,
    query: Option<String>,
    results: Option<SearchResponse>,
}

impl SearchController {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            status: RequestStatus::Idle,
            query: None,
            results: None,
        }
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn results(&self) -> Option<&SearchResponse> {
        self.results.as_ref()
    }

    pub async fn search(&mut self, input: &str) -> Result<(), Error> {
        let query = match prepare_search_query(input) {
            Ok(query) => query,
            Err(err) => {
                self.ctx.error(err.to_string());
                return Err(err.into());
            }
        };

        self.status = RequestStatus::Loading;
        let api = self.ctx.api.clone();
        let q = query.clone();
        let result = self
            .ctx
            .cache
            .fetch(QueryKey::Search, &query, || async move { api.search(&q).await })
            .await;

        match result {
            Ok(response) => {
                self.status = RequestStatus::Success;
                self.query = Some(query);
                self.results = Some(response);
                Ok(())
            }
            Err(err) => {
                self.status = RequestStatus::Error;
                self.ctx
                    .report_failure("Failed to fetch search results", &err);
                Err(err)
            }
        }
    }

    pub fn render(&self) {
        let Some(response) = &self.results else {
            return;
        };

        if response.results.is_empty() {
            println!("{}", "No results found.".bright_black());
            return;
        }

        if let Some(query) = &self.query {
            println!(
                "{}",
                f!("{} result(s) for \"{query}\"", response.results.len()).bright_black()
            );
        }

        let mut table = new_table();
        table.add_row(header_row(&[
            "id",
            "term",
            "category",
            "ICD-11 TM2",
            "description",
        ]));
        for term in &response.results {
            table.add_row(prettytable::row![
                term.term_id.green(),
                term.term_label.bold(),
                term.category,
                term.tm2_code().unwrap_or("-").blue(),
                term.description_or_default()
            ]);
        }
        table.printstd();
    }
}

pub async fn run(options: SearchOptions, global: crate::Global) -> Result<()> {
    let ctx = PageContext::from_global(&global)?;
    let mut page = SearchController::new(ctx);

    page.search(&options.query).await?;

    if options.json {
        if let Some(response) = page.results() {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
    } else {
        page.render();
    }

    Ok(())
}

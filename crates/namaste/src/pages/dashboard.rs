//! Read-only overview: total terms, quick statistics and backend health.
//!
//! Health is polled every 30 seconds and statistics every 60 seconds while the
//! pollers run. Statistics are also refetched as soon as a mutation
//! invalidates them.

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use namaste_core::query::{QueryKey, RequestStatus};
use namaste_core::statistics::{Health, Statistics, StatisticsResponse};
use serde::Serialize;
use tokio::sync::watch;

use super::PageContext;
use crate::poll::{spawn_poll, PollHandle};
use crate::prelude::{println, *};
use crate::widgets::{print_heading, print_stat_cards};

pub const HEALTH_INTERVAL: Duration = Duration::from_secs(30);
pub const STATISTICS_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, clap::Args, Clone)]
pub struct DashboardOptions {
    /// Keep polling and re-render on every update until Ctrl-C
    #[arg(short, long)]
    pub watch: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything the dashboard shows. Data from the last successful fetch stays
/// in place when a later fetch fails.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub health: Option<Health>,
    pub health_status: RequestStatus,
    pub statistics: Option<Statistics>,
    pub statistics_status: RequestStatus,
}

pub struct DashboardController {
    ctx: PageContext,
    snapshot: Arc<watch::Sender<DashboardSnapshot>>,
    pollers: Vec<PollHandle>,
}

impl DashboardController {
    pub fn new(ctx: PageContext) -> Self {
        let (snapshot, _) = watch::channel(DashboardSnapshot::default());
        Self {
            ctx,
            snapshot: Arc::new(snapshot),
            pollers: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that is woken on every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        !self.pollers.is_empty()
    }

    /// Fetch both queries once, concurrently, reading through the cache.
    pub async fn load_once(&self) {
        futures::join!(
            update_health(&self.ctx, &self.snapshot, false),
            update_statistics(&self.ctx, &self.snapshot, false),
        );
    }

    /// Start both pollers. Calling it again while running does nothing.
    pub fn start(&mut self) {
        if self.is_polling() {
            return;
        }

        let ctx = self.ctx.clone();
        let snapshot = self.snapshot.clone();
        let health = spawn_poll("health", HEALTH_INTERVAL, None, move || {
            let ctx = ctx.clone();
            let snapshot = snapshot.clone();
            async move { update_health(&ctx, &snapshot, true).await }
        });

        let ctx = self.ctx.clone();
        let snapshot = self.snapshot.clone();
        let statistics = spawn_poll(
            "statistics",
            STATISTICS_INTERVAL,
            Some(self.ctx.cache.subscribe(QueryKey::Statistics)),
            move || {
                let ctx = ctx.clone();
                let snapshot = snapshot.clone();
                async move { update_statistics(&ctx, &snapshot, true).await }
            },
        );

        self.pollers = vec![health, statistics];
    }

    /// Stop polling; the last snapshot stays readable.
    pub fn stop(&mut self) {
        self.pollers.clear();
    }

    pub fn render(&self) {
        let snapshot = self.snapshot();
        let statistics = snapshot.statistics.unwrap_or_default();

        print_heading(
            "NAMASTE Terminology Dashboard",
            Some("Traditional medicine terminology mapped to ICD-11 TM2"),
        );

        println!(
            "\n  {}  {}",
            statistics.total_terms.to_string().bold().bright_white(),
            "Total Terms".bright_black()
        );
        if snapshot.statistics_status.is_loading() && snapshot.statistics.is_none() {
            println!("  {}", "Loading statistics...".bright_black());
        }

        print_heading("Quick Stats", None);
        print_stat_cards(&statistics);

        print_heading("System Health", None);
        match &snapshot.health {
            Some(health) if health.is_healthy() => {
                println!("  {} {}", "●".green(), health.status.green().bold())
            }
            Some(health) => println!("  {} {}", "●".red(), health.status.red().bold()),
            None if snapshot.health_status == RequestStatus::Error => {
                println!("  {} {}", "●".red(), "Unreachable".red().bold())
            }
            None => println!("  {} {}", "●".bright_black(), "Checking...".bright_black()),
        }

        if let Some(health) = &snapshot.health {
            if !health.details.is_empty() {
                let mut table = new_table();
                for (key, value) in &health.details {
                    let value = match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    table.add_row(prettytable::row![key.cyan(), value]);
                }
                table.printstd();
            }
        }
    }
}

async fn update_health(ctx: &PageContext, snapshot: &watch::Sender<DashboardSnapshot>, force: bool) {
    let was_error = snapshot.borrow().health_status == RequestStatus::Error;
    snapshot.send_modify(|s| s.health_status = RequestStatus::Loading);

    let api = ctx.api.clone();
    let fetch = || async move { api.health().await };
    let result = if force {
        ctx.cache.refresh(QueryKey::Health, "", fetch).await
    } else {
        ctx.cache.fetch(QueryKey::Health, "", fetch).await
    };

    match result {
        Ok(health) => snapshot.send_modify(|s| {
            s.health = Some(health);
            s.health_status = RequestStatus::Success;
        }),
        Err(err) => {
            log::warn!("health check failed: {err}");
            snapshot.send_modify(|s| s.health_status = RequestStatus::Error);
            // Only the first failure of a streak is surfaced.
            if !was_error {
                ctx.report_failure("Failed to fetch health status", &err);
            }
        }
    }
}

async fn update_statistics(
    ctx: &PageContext,
    snapshot: &watch::Sender<DashboardSnapshot>,
    force: bool,
) {
    let was_error = snapshot.borrow().statistics_status == RequestStatus::Error;
    snapshot.send_modify(|s| s.statistics_status = RequestStatus::Loading);

    let api = ctx.api.clone();
    let fetch = || async move { api.statistics().await };
    let result: Result<StatisticsResponse, Error> = if force {
        ctx.cache.refresh(QueryKey::Statistics, "", fetch).await
    } else {
        ctx.cache.fetch(QueryKey::Statistics, "", fetch).await
    };

    match result {
        Ok(response) => snapshot.send_modify(|s| {
            s.statistics = Some(response.statistics_or_default());
            s.statistics_status = RequestStatus::Success;
        }),
        Err(err) => {
            log::warn!("statistics fetch failed: {err}");
            snapshot.send_modify(|s| s.statistics_status = RequestStatus::Error);
            if !was_error {
                ctx.report_failure("Failed to fetch statistics", &err);
            }
        }
    }
}

pub async fn run(options: DashboardOptions, global: crate::Global) -> Result<()> {
    let ctx = PageContext::from_global(&global)?;
    let mut page = DashboardController::new(ctx);

    if !options.watch {
        page.load_once().await;
        let snapshot = page.snapshot();

        if options.json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        } else {
            page.render();
        }

        if snapshot.health_status == RequestStatus::Error
            && snapshot.statistics_status == RequestStatus::Error
        {
            return Err(eyre!("Backend unreachable at {}", global_api_url(&global)));
        }
        return Ok(());
    }

    let mut updates = page.subscribe();
    page.start();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if snapshot.health_status.is_loading() || snapshot.statistics_status.is_loading() {
                    continue;
                }
                if options.json {
                    println!("{}", serde_json::to_string(&snapshot)?);
                } else {
                    page.render();
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    page.stop();
    Ok(())
}

fn global_api_url(global: &crate::Global) -> String {
    crate::api::ApiConfig::from_env()
        .with_overrides(global.api_url.clone())
        .base_url
}

//! Headless portal host: loads the first page of news through the gateway and
//! prints it in the saved language.
use std::process::ExitCode;
use std::time::{Duration, Instant};

use bilimcert_app::logging::{self, LogDestination};
use bilimcert_app::{page_msg, AppContext, HostEvent, SiteConfig};
use bilimcert_core::format::format_relative_time;
use bilimcert_core::listing::{
    parse_published_at, update_listing, ListState, NewsItem, DEFAULT_PAGE_SIZE,
};
use bilimcert_core::ListingStatus;
use chrono::Utc;
use log::LevelFilter;
use portal_logging::{portal_error, portal_info};

const NEWS_ENDPOINT: &str = "news/";
const FETCH_DEADLINE: Duration = Duration::from_secs(45);

fn main() -> ExitCode {
    logging::initialize(LogDestination::Both, LevelFilter::Info);

    let config = match SiteConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            portal_error!("Invalid configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let mut ctx = match AppContext::init(config) {
        Ok(ctx) => ctx,
        Err(err) => {
            portal_error!("Startup failed: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let (mut news, effects) = ListState::<NewsItem>::new_remote(DEFAULT_PAGE_SIZE, Utc::now());
    ctx.runner().run_list_effects(NEWS_ENDPOINT, effects);

    let deadline = Instant::now() + FETCH_DEADLINE;
    while ctx.runner().has_pending() && Instant::now() < deadline {
        let (runner, translator) = ctx.runner_and_translator();
        for event in runner.wait(Duration::from_millis(250), translator) {
            match event {
                HostEvent::Page { seq, result, .. } => {
                    let msg = page_msg::<NewsItem>(seq, result, translator);
                    let (next, effects) = update_listing(news, msg);
                    news = next;
                    runner.run_list_effects(NEWS_ENDPOINT, effects);
                }
                HostEvent::SessionExpired { login_path } => {
                    portal_info!("Session expired; sign in again at {}", login_path);
                }
                HostEvent::Form(_) | HostEvent::LoggedOut => {}
            }
        }
    }

    let view = news.view();
    let translator = ctx.translator();
    match view.status {
        ListingStatus::Ready => {
            let now = Utc::now();
            for item in &view.items {
                let when = item
                    .published_at
                    .as_deref()
                    .and_then(parse_published_at)
                    .map(|at| format_relative_time(at, now, ctx.language()))
                    .unwrap_or_default();
                println!("{}  {}", item.title, when);
            }
            println!(
                "{}/{} ({})",
                view.pagination.current_page,
                view.pagination.total_pages,
                view.pagination.total_items
            );
            ExitCode::SUCCESS
        }
        ListingStatus::Empty => {
            println!("{}", translator.t("listing.empty"));
            ExitCode::SUCCESS
        }
        ListingStatus::Loading => {
            println!("{}", translator.t("errors.timeout"));
            ExitCode::FAILURE
        }
        ListingStatus::Error(message) => {
            println!("{} {}", translator.t("listing.error"), message);
            ExitCode::FAILURE
        }
    }
}

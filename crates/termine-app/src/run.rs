//! One refresh of the schedule page.

use chrono::NaiveDateTime;
use termine_core::config::Settings;
use termine_service::feed::read_events;
use termine_service::schedule::{WallClock, assemble};
use termine_service::wiki::render_table;

use crate::error::AppResult;
use crate::feed::{Feed, FeedSource};
use crate::publish::MediaWikiPublisher;

/// Per-invocation switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Reference instant on the display wall clock; the current time if unset.
    pub now: Option<NaiveDateTime>,
    /// Never publish, even when the wiki is configured.
    pub dry_run: bool,
}

/// What happened to the rendered page.
#[derive(Debug)]
pub enum Outcome {
    Published { title: String },
    /// Publishing was skipped; the page text is handed back.
    Rendered(String),
}

/// ## Summary
/// Fetches the feed, builds the schedule and publishes or returns the page.
///
/// ## Errors
/// Returns an error if the display zone is unknown, the feed cannot be
/// fetched or parsed, or publishing fails.
#[tracing::instrument(skip_all, fields(feed = %settings.calendar.url, dry_run = options.dry_run))]
pub async fn run(settings: &Settings, options: RunOptions) -> AppResult<Outcome> {
    let clock = WallClock::from_tzid(&settings.calendar.timezone)?;
    let reference = options.now.unwrap_or_else(|| clock.now());
    tracing::info!(%reference, zone = %clock.zone(), "Building schedule");

    let bytes = Feed::from_location(&settings.calendar.url)?.fetch().await?;
    let events = read_events(&bytes, &clock)?;
    let schedule = assemble(&events, reference, &clock);

    let info = settings.wiki.as_ref().and_then(|wiki| wiki.info.as_deref());
    let text = render_table(&schedule, info, &settings.calendar.replace_links);

    match settings.publish_target() {
        Some(wiki) if !options.dry_run => {
            MediaWikiPublisher::new(wiki)?
                .publish(&wiki.page_title, &text, &wiki.edit_summary)
                .await?;
            Ok(Outcome::Published {
                title: wiki.page_title.clone(),
            })
        }
        Some(_) => Ok(Outcome::Rendered(text)),
        None => {
            tracing::info!("Wiki settings incomplete, not publishing");
            Ok(Outcome::Rendered(text))
        }
    }
}

//! Passenger trip search

use tracing::{info, instrument};

use crate::engine::{ElementActions, Locator, Readiness, Resolution, WaitCondition};
use crate::scenario::BookingPage;
use crate::{Config, Error, Result};

/// What confirmed that results were shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingEvidence {
    ResultsUrl { url: String },
    ResultsMarker(Locator),
}

/// Booking search orchestration for one session
pub struct BookingFlow<'a> {
    actions: &'a ElementActions,
    config: &'a Config,
    page: &'a BookingPage,
}

impl<'a> BookingFlow<'a> {
    pub fn new(actions: &'a ElementActions, config: &'a Config, page: &'a BookingPage) -> Self {
        Self {
            actions,
            config,
            page,
        }
    }

    /// Open the search page and wait for its form
    pub async fn open(&self) -> Result<()> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), self.page.path);
        self.actions.navigate(&url).await?;

        if !self.actions.is_present(&self.page.from).await {
            let current = self.actions.current_url().await.unwrap_or_default();
            return Err(Error::assertion(
                "booking page",
                format!("{} not found on {}", self.page.from, current),
            ));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn search(&self, from: &str, to: &str) -> Result<()> {
        self.actions.enter_text(&self.page.from, from).await?;
        self.actions.enter_text(&self.page.to, to).await?;
        self.actions.click(&self.page.search).await?;
        info!("Searching trips {} -> {}", from, to);
        Ok(())
    }

    /// Results URL or a results marker within the explicit wait
    pub async fn verify_results(&self) -> Result<BookingEvidence> {
        let mut signals = vec![WaitCondition::url_contains(self.page.results_fragment.clone())];
        signals.extend(
            self.page
                .results
                .iter()
                .cloned()
                .map(WaitCondition::ElementVisible),
        );

        let outcome = self.actions.wait_for(&WaitCondition::Any(signals)).await;
        let url = self.actions.current_url().await?;

        if !outcome.is_satisfied() {
            return Err(Error::assertion(
                "trip results",
                format!(
                    "no URL containing '{}' and {} not shown, at {}",
                    self.page.results_fragment, self.page.results, url
                ),
            ));
        }

        if url.contains(&self.page.results_fragment) {
            return Ok(BookingEvidence::ResultsUrl { url });
        }

        match self
            .actions
            .resolver()
            .resolve_now(&self.page.results, Readiness::Visible)
            .await
        {
            Resolution::Found(found) => Ok(BookingEvidence::ResultsMarker(found.locator)),
            Resolution::NotFound => Err(Error::assertion(
                "trip results",
                format!("{} disappeared before it could be read", self.page.results),
            )),
        }
    }
}

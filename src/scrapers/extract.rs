//! Per-listing field extraction and record assembly.
//!
//! Each field is pulled through a fixed CSS locator and post-processed
//! independently; no field's failure aborts the listing.

use tracing::debug;

use super::page::SearchPage;
use crate::models::BusinessRecord;

/// CSS locators into the map UI.
///
/// The `data-item-id` attributes have been stable across UI redesigns; the
/// headline class is the most likely to rot.
pub mod locators {
    /// Search input on the maps landing page.
    pub const SEARCH_INPUT: &str = "input#searchboxinput";
    /// Scrollable results feed.
    pub const RESULTS_FEED: &str = "div[role='feed']";
    /// Listing links inside the results feed.
    pub const LISTING_LINKS: &str = "a[href*='/maps/place/']";
    /// Business name headline in the detail panel.
    pub const NAME: &str = "h1.DUwDvf";
    /// Address button in the detail panel.
    pub const ADDRESS: &str = "button[data-item-id='address']";
    /// Website link in the detail panel.
    pub const WEBSITE: &str = "a[data-item-id='authority']";
    /// Phone button in the detail panel.
    pub const PHONE: &str = "button[data-item-id*='phone']";
    /// Review-count button under the rating chart.
    pub const REVIEWS_COUNT: &str = "div[jsaction*='reviewChart.moreReviews'] button";
    /// Rating element whose label carries the average.
    pub const REVIEWS_AVERAGE: &str = "div[jsaction*='reviewChart.moreReviews'] div[role='img']";
    /// Attribute holding the average, e.g. "4,5 stars".
    pub const REVIEWS_AVERAGE_ATTR: &str = "aria-label";
}

/// Assemble one record from the currently focused listing.
///
/// Every field is extracted independently; a field that cannot be located
/// or parsed is absent. Assembly itself never fails - the worst case is a
/// record with every field absent.
pub async fn assemble(panel: &dyn SearchPage) -> BusinessRecord {
    let reviews_count = panel
        .extract(locators::REVIEWS_COUNT, None)
        .await
        .and_then(|raw| parse_reviews_count(&raw));
    let reviews_average = panel
        .extract(
            locators::REVIEWS_AVERAGE,
            Some(locators::REVIEWS_AVERAGE_ATTR),
        )
        .await
        .and_then(|raw| parse_reviews_average(&raw));

    let record = BusinessRecord {
        name: panel.extract(locators::NAME, None).await,
        address: panel.extract(locators::ADDRESS, None).await,
        website: panel.extract(locators::WEBSITE, None).await,
        phone_number: panel.extract(locators::PHONE, None).await,
        reviews_count,
        reviews_average,
    };

    if record.is_empty() {
        debug!("assembled record with every field absent");
    }

    record
}

/// Parse a raw review-count string ("1,234 reviews") into an integer.
///
/// Strips everything that is not an ASCII digit; an empty remainder means
/// the field is absent.
pub fn parse_reviews_count(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parse a raw review-average label ("4,5 stars" / "4.5 stars") into a
/// float.
///
/// Takes the first whitespace-delimited token and accepts a comma decimal
/// separator, which the map UI emits under some locales.
pub fn parse_reviews_average(raw: &str) -> Option<f64> {
    let token = raw.split_whitespace().next()?;
    token.replace(',', ".").parse().ok()
}

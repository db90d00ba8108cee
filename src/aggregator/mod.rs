//! Background aggregation: the per-tick scrape cycle and the timer driving it.

mod scheduler;
mod scraper;

pub use scheduler::Scheduler;
pub use scraper::{scrape_feeds, ScrapeError, ScrapeReport};

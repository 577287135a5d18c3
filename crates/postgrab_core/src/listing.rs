use std::collections::HashSet;
use std::fmt;

use serde_json::Value;
use url::Url;

use crate::{PacingConfig, PostRecord};

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    New,
    Hot,
    Rising,
    Controversial,
    #[default]
    Top,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::New => "new",
            Category::Hot => "hot",
            Category::Rising => "rising",
            Category::Controversial => "controversial",
            Category::Top => "top",
        }
    }
}

/// Time window applied to `top` and `controversial` listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Hour,
    Day,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Hour => "hour",
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
            TimeRange::All => "all",
        }
    }
}

/// Which listing to walk and how many posts to keep (0 = no limit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub source: String,
    pub category: Category,
    pub range: TimeRange,
    pub limit: usize,
}

impl ListingRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            category: Category::default(),
            range: TimeRange::default(),
            limit: 10,
        }
    }

    /// `{api_base}/r/{source}/{category}/.json?t={range}[&after={cursor}]`
    ///
    /// `source` is percent-encoded as a single path segment.
    pub fn page_url(&self, api_base: &str, cursor: Option<&str>) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(api_base)?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["r", self.source.as_str(), self.category.as_str(), ".json"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("t", self.range.as_str());
            if let Some(cursor) = cursor {
                query.append_pair("after", cursor);
            }
        }
        Ok(url)
    }
}

/// Posts and next cursor carried by one listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub posts: Vec<PostRecord>,
    pub after: Option<String>,
}

impl ListingPage {
    /// Reads the `data` envelope of a listing document.
    ///
    /// Returns `None` when the envelope is missing, which marks the end of the listing.
    pub fn from_document(document: &Value) -> Option<Self> {
        let data = document.get("data").filter(|data| !data.is_null())?;
        let posts = data
            .get("children")
            .and_then(Value::as_array)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|child| child.get("data"))
                    .filter(|post| post.is_object())
                    .map(|post| PostRecord::new(post.clone()))
                    .collect()
            })
            .unwrap_or_default();
        let after = data
            .get("after")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);
        Some(Self { posts, after })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    LimitReached,
    EndOfData,
    Stalled,
    TransportFailure,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::LimitReached => write!(f, "limit reached"),
            StopReason::EndOfData => write!(f, "end of listing"),
            StopReason::Stalled => write!(f, "no new posts"),
            StopReason::TransportFailure => write!(f, "fetch failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStep {
    Continue { cursor: String },
    Stop(StopReason),
}

/// What applying one page did to the accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub added: usize,
    pub total: usize,
    /// Set when this page counted as a stall.
    pub stalls: Option<u32>,
    pub step: PageStep,
}

/// Accumulator driven by the paginator, one page at a time.
#[derive(Debug, Clone)]
pub struct ListingState {
    posts: Vec<PostRecord>,
    seen: HashSet<String>,
    limit: usize,
    stalls: u32,
    stall_threshold: u32,
    pages: u32,
}

impl ListingState {
    pub fn new(limit: usize, pacing: &PacingConfig) -> Self {
        Self {
            posts: Vec::new(),
            seen: HashSet::new(),
            limit,
            stalls: 0,
            stall_threshold: pacing.stall_threshold,
            pages: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn stalls(&self) -> u32 {
        self.stalls
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Folds a page into the accumulator and decides whether to keep going.
    ///
    /// The limit check comes first: reaching the limit always ends the run
    /// successfully, even on a page that also exhausted the stall budget. The
    /// stall counter is never reset.
    pub fn apply_page(&mut self, page: ListingPage) -> PageOutcome {
        self.pages += 1;
        let before = self.posts.len();
        for post in page.posts {
            if let Some(name) = post.fullname() {
                if !self.seen.insert(name.to_string()) {
                    continue;
                }
            }
            self.posts.push(post);
        }
        let added = self.posts.len() - before;

        if self.limit > 0 && self.posts.len() >= self.limit {
            self.posts.truncate(self.limit);
            return self.outcome(added, None, PageStep::Stop(StopReason::LimitReached));
        }

        let mut stalls = None;
        if added == 0 {
            self.stalls += 1;
            stalls = Some(self.stalls);
            if self.stalls > self.stall_threshold {
                return self.outcome(added, stalls, PageStep::Stop(StopReason::Stalled));
            }
        }

        let step = match page.after {
            Some(cursor) => PageStep::Continue { cursor },
            None => PageStep::Stop(StopReason::EndOfData),
        };
        self.outcome(added, stalls, step)
    }

    pub fn finish(self) -> Vec<PostRecord> {
        self.posts
    }

    fn outcome(&self, added: usize, stalls: Option<u32>, step: PageStep) -> PageOutcome {
        PageOutcome {
            added,
            total: self.posts.len(),
            stalls,
            step,
        }
    }
}

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};
use postgrab_core::{Category, ListingRequest, TimeRange};

use super::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "postgrab", version, about = "Download videos and images from Reddit posts")]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["subreddit", "post", "file", "web"])
))]
pub struct Cli {
    /// Subreddit whose listing is downloaded
    #[arg(short, long, value_name = "NAME")]
    pub subreddit: Option<String>,

    /// Single post permalink
    #[arg(short, long, value_name = "LINK")]
    pub post: Option<String>,

    /// Text file with one post link per line
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Read post links from the clipboard
    #[arg(short, long)]
    pub web: bool,

    #[arg(short, long, value_enum, default_value_t = CategoryArg::Top)]
    pub category: CategoryArg,

    /// Time window for top and controversial listings
    #[arg(short, long, value_enum, default_value_t = RangeArg::All)]
    pub range: RangeArg,

    /// Posts to collect from a listing, 0 for no limit
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    #[arg(short, long, value_name = "DIR", default_value = "output")]
    pub output: PathBuf,

    /// RON settings file (defaults to ./postgrab.ron when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogDestination::Both)]
    pub log: LogDestination,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Where the posts of this run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Listing(ListingRequest),
    Post(String),
    File(PathBuf),
    Clipboard,
}

impl Cli {
    pub fn source(&self) -> Source {
        if let Some(name) = &self.subreddit {
            let mut request = ListingRequest::new(name.trim());
            request.category = self.category.into();
            request.range = self.range.into();
            request.limit = self.limit;
            Source::Listing(request)
        } else if let Some(link) = &self.post {
            Source::Post(link.clone())
        } else if let Some(path) = &self.file {
            Source::File(path.clone())
        } else {
            Source::Clipboard
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    New,
    Hot,
    Rising,
    Controversial,
    Top,
}

impl From<CategoryArg> for Category {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::New => Category::New,
            CategoryArg::Hot => Category::Hot,
            CategoryArg::Rising => Category::Rising,
            CategoryArg::Controversial => Category::Controversial,
            CategoryArg::Top => Category::Top,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangeArg {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

impl From<RangeArg> for TimeRange {
    fn from(value: RangeArg) -> Self {
        match value {
            RangeArg::Hour => TimeRange::Hour,
            RangeArg::Day => TimeRange::Day,
            RangeArg::Week => TimeRange::Week,
            RangeArg::Month => TimeRange::Month,
            RangeArg::Year => TimeRange::Year,
            RangeArg::All => TimeRange::All,
        }
    }
}

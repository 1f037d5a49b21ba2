use crate::prelude::{println, *};
use serde::Serialize;
use threadview_core::search::{build_search_query, build_search_url, SearchSort};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct QueryOptions {
    /// Anime title as it appears in the discussion thread (e.g., "Frieren")
    pub title: String,

    /// Episode number
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub episode: u32,

    /// Result ordering
    #[arg(short, long, value_enum, env = "THREADVIEW_SORT", default_value = "relevance")]
    pub sort: SortMode,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Relevance,
    New,
    Top,
    Comments,
}

impl From<SortMode> for SearchSort {
    fn from(mode: SortMode) -> Self {
        match mode {
            SortMode::Relevance => SearchSort::Relevance,
            SortMode::New => SearchSort::New,
            SortMode::Top => SearchSort::Top,
            SortMode::Comments => SearchSort::Comments,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryOutput {
    pub query: String,
    pub sort: String,
    pub url: String,
}

pub fn run(options: QueryOptions, _global: crate::Global) -> Result<()> {
    let output = query_data(&options.title, options.episode, options.sort.into())?;

    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output)
                .map_err(|e| eyre!("JSON serialization failed: {}", e))?
        );
    } else {
        println!("{}", output.url);
    }

    Ok(())
}

pub fn query_data(title: &str, episode: u32, sort: SearchSort) -> Result<QueryOutput> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("title must not be empty".to_string()).into());
    }

    Ok(QueryOutput {
        query: build_search_query(title, episode),
        sort: sort.to_string(),
        url: build_search_url(title, episode, sort),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_data() {
        let output = query_data("Frieren", 5, SearchSort::Top).unwrap();

        assert_eq!(
            output.query,
            "Frieren - \"Episode 5\" discussion author:AutoLovepon"
        );
        assert_eq!(output.sort, "top");
        assert!(output.url.contains("&sort=top"));
    }

    #[test]
    fn test_query_data_empty_title() {
        let err = query_data("   ", 1, SearchSort::default()).unwrap_err();
        assert!(err.to_string().contains("title must not be empty"));
    }

    #[test]
    fn test_sort_mode_conversion() {
        assert_eq!(SearchSort::from(SortMode::Comments), SearchSort::Comments);
        assert_eq!(SearchSort::from(SortMode::Relevance), SearchSort::Relevance);
    }
}

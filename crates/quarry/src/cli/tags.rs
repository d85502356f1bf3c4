//! Tags command - Show the tags a job selects and excludes by

use crate::cli::load_job;
use crate::cli::output::{print_json, print_table};
use comfy_table::Color;
use quarry_finder::{BlacklistTags, FinderConfig, Location};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug)]
pub struct TagsArgs {
    pub job: PathBuf,
    pub json: bool,
}

/// Resolved tags of a job. `blacklist` is `null` when not configured.
#[derive(Debug, Serialize)]
pub struct TagsResult {
    pub store_root: Location,
    pub whitelist: Location,
    pub blacklist: Option<Vec<Location>>,
}

impl TagsResult {
    fn from_config(config: &FinderConfig) -> Self {
        let blacklist = match config.blacklist_tags() {
            BlacklistTags::NotConfigured => None,
            BlacklistTags::Configured(tags) => Some(tags.clone()),
        };
        Self {
            store_root: config.store_root().clone(),
            whitelist: config.whitelist_tag().clone(),
            blacklist,
        }
    }
}

pub fn run(args: TagsArgs) -> anyhow::Result<()> {
    let config = load_job(&args.job)?;
    let result = TagsResult::from_config(&config);

    if args.json {
        return print_json(&result);
    }

    let mut rows = vec![vec![
        ("whitelist".to_string(), Some(Color::Green)),
        (result.whitelist.to_string(), None),
    ]];
    match &result.blacklist {
        None => rows.push(vec![
            ("blacklist".to_string(), Some(Color::DarkGrey)),
            ("(not configured)".to_string(), Some(Color::DarkGrey)),
        ]),
        Some(tags) if tags.is_empty() => rows.push(vec![
            ("blacklist".to_string(), Some(Color::Red)),
            ("(empty)".to_string(), Some(Color::DarkGrey)),
        ]),
        Some(tags) => {
            for tag in tags {
                rows.push(vec![
                    ("blacklist".to_string(), Some(Color::Red)),
                    (tag.to_string(), None),
                ]);
            }
        }
    }

    println!("Store: {}", result.store_root);
    print_table(&["KIND", "TAG"], rows);
    Ok(())
}

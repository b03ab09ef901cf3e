//! Command line host for the client.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use exn::ResultExt;
use r34v_client::Client;
use r34v_config::Config;
use r34v_thumbnail::{Level, Scratch, ThumbnailAsset};
use tracing::{debug, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::output::{RecordView, ThumbnailView, print_json};

/// Resolve rule34video references into metadata, direct links and censored
/// thumbnails. Results are printed as JSON.
///
/// Bare numeric IDs only resolve after a listing in the same invocation has
/// mapped them; use `id/slug` references or full URLs otherwise.
#[derive(Debug, Parser)]
#[command(name = "r34v", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON) layered over the platform default.
    #[arg(long, short, global = true, env = "R34V_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Log more (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct Paging {
    /// 1-based listing page.
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// At most this many results (capped by `max_search_results`).
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show a video's metadata.
    Detail {
        /// `id/slug`, a detail page URL, or a bare ID.
        reference: String,
    },
    /// Search videos.
    Search {
        query: String,
        #[command(flatten)]
        paging: Paging,
    },
    /// Show a random video from the front page.
    Random,
    /// Newest videos.
    Latest {
        #[command(flatten)]
        paging: Paging,
    },
    /// Most viewed videos.
    Popular {
        #[command(flatten)]
        paging: Paging,
    },
    /// Show a video's tags.
    Tags {
        /// `id/slug`, a detail page URL, or a bare ID.
        reference: String,
    },
    /// List the site's tags.
    TagIndex {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Print a direct link.
    Url {
        reference: String,
        /// `best`, `worst` or a label such as `720p`; defaults to `default_quality`.
        quality: Option<String>,
    },
    /// List categories.
    Categories,
    /// Videos carrying a tag.
    ByTag {
        tag: String,
        #[command(flatten)]
        paging: Paging,
    },
    /// Videos in a category.
    ByCategory {
        category: String,
        #[command(flatten)]
        paging: Paging,
    },
    /// Fetch and censor a video's thumbnail.
    Thumb {
        reference: String,
        /// Mosaic level, 0 to 100.
        #[arg(long, allow_negative_numbers = true)]
        mosaic: Option<i64>,
        /// Blur level, 0 to 100.
        #[arg(long, allow_negative_numbers = true)]
        blur: Option<i64>,
        /// Write here instead of the scratch directory.
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn request(err: r34v_client::error::Error) -> Error {
    let kind = ErrorKind::Request((*err).to_string());
    err.raise(kind)
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load(self.config.as_deref()).map_err(|err| {
            let kind = ErrorKind::Config((*err).to_string());
            err.raise(kind)
        })?;
        debug!(?config, "configuration loaded");
        let client = Client::from_config(&config).map_err(request)?;

        match self.command {
            Command::Detail { reference } => {
                let record = client.detail(&reference).await.map_err(request)?;
                let mut view = RecordView::new(&record);
                if config.show_thumbnail && record.thumbnail.is_some() {
                    view.thumbnail_file = preview(&client, &record.address().to_string()).await;
                }
                print_json(&view)
            },
            Command::Random => {
                let record = client.random().await.map_err(request)?;
                print_json(&RecordView::new(&record))
            },
            Command::Search { query, paging } => {
                print_json(&client.search(&query, paging.page, paging.limit).await.map_err(request)?)
            },
            Command::Latest { paging } => print_json(&client.latest(paging.page, paging.limit).await.map_err(request)?),
            Command::Popular { paging } => print_json(&client.popular(paging.page, paging.limit).await.map_err(request)?),
            Command::ByTag { tag, paging } => {
                print_json(&client.by_tag(&tag, paging.page, paging.limit).await.map_err(request)?)
            },
            Command::ByCategory { category, paging } => {
                print_json(&client.by_category(&category, paging.page, paging.limit).await.map_err(request)?)
            },
            Command::Tags { reference } => print_json(&client.video_tags(&reference).await.map_err(request)?),
            Command::TagIndex { page } => print_json(&client.tag_index(page).await.map_err(request)?),
            Command::Categories => print_json(&client.categories().await.map_err(request)?),
            Command::Url { reference, quality } => {
                print_json(&client.direct_url(&reference, quality.as_deref()).await.map_err(request)?)
            },
            Command::Thumb { reference, mosaic, blur, output } => {
                let address = client.resolve(&reference).map_err(request)?;
                let asset = client
                    .thumbnail(&address.to_string(), mosaic.map(Level::clamped), blur.map(Level::clamped))
                    .await
                    .map_err(request)?;
                let file = materialize(&asset, output.as_deref())?;
                print_json(&ThumbnailView::new(address.id, &asset, file))
            },
        }
    }
}

/// Best-effort thumbnail alongside a detail view; failures only cost the preview.
async fn preview(client: &Client, reference: &str) -> Option<PathBuf> {
    let asset = match client.thumbnail(reference, None, None).await {
        Ok(asset) => asset,
        Err(err) => {
            warn!(error = ?err, "thumbnail unavailable");
            return None;
        },
    };
    match materialize(&asset, None) {
        Ok(file) => file,
        Err(err) => {
            warn!(error = ?err, "thumbnail could not be written");
            None
        },
    }
}

/// Write the transformed image to `output`, or to a scratch file that
/// replaces whatever an earlier run left in the scratch directory.
fn materialize(asset: &ThumbnailAsset, output: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = output {
        std::fs::write(path, &asset.transformed_bytes).or_raise(|| ErrorKind::Thumbnail)?;
        return Ok(Some(path.to_path_buf()));
    }
    let dir = std::env::temp_dir().join("r34v");
    std::fs::create_dir_all(&dir).or_raise(|| ErrorKind::Thumbnail)?;
    let mut scratch = Scratch::in_dir(dir);
    scratch.sweep().or_raise(|| ErrorKind::Thumbnail)?;
    scratch.store(asset).or_raise(|| ErrorKind::Thumbnail)?;
    scratch.persist().or_raise(|| ErrorKind::Thumbnail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["r34v", "detail", "3055012/ankha-animation-minus82"])]
    #[case(&["r34v", "search", "anime", "--page", "2", "-n", "5"])]
    #[case(&["r34v", "-vv", "random"])]
    #[case(&["r34v", "url", "3055012/ankha-animation-minus82", "720p"])]
    #[case(&["r34v", "by-tag", "big ears"])]
    #[case(&["r34v", "by-category", "animal-crossing", "--limit", "3"])]
    #[case(&["r34v", "thumb", "3055012/ankha", "--mosaic", "-5", "--blur", "20"])]
    #[case(&["r34v", "tags", "3055012/ankha-animation-minus82"])]
    #[case(&["r34v", "tag-index", "--page", "3"])]
    fn test_parses(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_ok());
    }

    #[test]
    fn test_paging_defaults() {
        let cli = Cli::try_parse_from(["r34v", "latest"]).unwrap();
        let Command::Latest { paging } = cli.command else {
            panic!("expected latest");
        };
        assert_eq!(paging.page, 1);
        assert_eq!(paging.limit, None);
        assert_eq!(cli.verbose, 0);
    }

    #[rstest]
    #[case(&["r34v", "detail"])]
    #[case(&["r34v", "tags"])]
    fn test_missing_reference_is_rejected(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_materialize_to_explicit_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumb.jpg");
        let asset = ThumbnailAsset::new(b"\xFF\xD8\xFFbytes".to_vec(), Level::OFF, Level::OFF);
        assert_eq!(materialize(&asset, Some(&path)).unwrap(), Some(path.clone()));
        assert_eq!(std::fs::read(&path).unwrap(), b"\xFF\xD8\xFFbytes");
    }
}

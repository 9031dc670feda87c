use std::path::PathBuf;

use clap::Parser;

/// SickBeard invokes post-processing scripts with
/// `full_path original_name tvdbid season episode air_date`, so those are
/// accepted positionally; only the show id matters here.
#[derive(Debug, Parser)]
#[command(
    name = "showprune",
    version,
    about = "Remove SickBeard episodes using a threshold on downloaded or wiping archived episodes"
)]
pub struct Cli {
    /// No action performed on files or database, verbose logging to stderr
    #[arg(short, long)]
    pub debug: bool,

    /// Custom configuration json file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show id (tvdbid) to force operations on one show
    #[arg(long, value_name = "ID")]
    pub tvdbid_forced: Option<String>,

    pub full_path: Option<String>,
    pub original_name: Option<String>,
    pub tvdbid: Option<String>,
    pub season: Option<String>,
    pub episode: Option<String>,
    pub air_date: Option<String>,
}

impl Cli {
    pub fn show_id(&self) -> Option<&str> {
        self.tvdbid_forced
            .as_deref()
            .or(self.tvdbid.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

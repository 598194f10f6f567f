use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a page to the link catalog
    Add {
        /// Page url
        url: String,

        /// Page title
        #[clap(short, long)]
        title: String,

        /// Main heading
        #[clap(long)]
        h1: String,

        /// Subheadings (repeat the flag for several)
        #[clap(long)]
        h2: Vec<String>,

        /// Meta description
        #[clap(short, long, default_value = "")]
        meta_description: String,
    },

    /// List all catalog records
    List {},

    /// Delete a catalog record by url
    Delete {
        /// Page url
        url: String,
    },

    /// Remove every catalog record
    Clear {
        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },

    /// Import catalog records from a CSV file
    Import {
        /// Path to a CSV file with columns url,title,h1[,h2][,meta_description]
        file: PathBuf,
    },

    /// Export the catalog to a CSV file
    Export {
        /// Destination path
        file: PathBuf,
    },

    /// Suggest internal links for a document
    Suggest {
        /// Document to analyze; reads stdin when omitted
        file: Option<PathBuf>,

        /// Maximum number of suggestions
        #[clap(short, long)]
        max: Option<usize>,

        /// Minimum combined score [0.0, 1.0]
        #[clap(short, long)]
        threshold: Option<f32>,

        /// Review each suggestion and write a linked copy of the document
        #[clap(short, long, default_value = "false")]
        interactive: bool,

        /// Where to write the linked document (interactive mode)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

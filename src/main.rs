use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use readview::alignment::{AlignmentReader, DecodedRead, ReadPage, decode_batch};
use readview::config::ViewConfig;
use readview::region::Region;
use readview::session::ReadSession;
use readview::variant::{VariantPage, layout_variants};
use readview::view::ViewLevel;

#[derive(Parser)]
#[command(
    name = "readview",
    about = "Decode aligned reads, lay them out in lanes and keep a windowed read cache",
    version
)]
struct Cli {
    /// Optional TOML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a page of reads and print the bulk lane layout
    Layout {
        /// JSON read page ({"reads": [...]})
        #[arg(short, long)]
        reads: PathBuf,

        /// Print the pileup and alleles at this position
        #[arg(short, long)]
        position: Option<u64>,
    },

    /// Push a page of reads through a windowed cache and print what stays resident
    Window {
        /// JSON read page ({"reads": [...]})
        #[arg(short, long)]
        reads: PathBuf,

        /// Window to view (format: chr:start-end, 0-based half-open)
        #[arg(short = 'L', long)]
        region: String,

        /// Keep per-base detail
        #[arg(long)]
        bases: bool,
    },

    /// Load reads from an indexed BAM into a windowed cache
    Bam {
        /// Path to BAM file (must be sorted and indexed)
        #[arg(short, long)]
        bam: PathBuf,

        /// Window to view (format: chr:start-end, 0-based half-open)
        #[arg(short = 'L', long)]
        region: String,

        /// Keep per-base detail
        #[arg(long)]
        bases: bool,
    },

    /// Print the call layout of a page of variants
    Variants {
        /// JSON variant page ({"variants": [...]})
        #[arg(long)]
        variants: PathBuf,
    },
}

fn read_json(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_read_page(path: &Path) -> Result<ReadPage> {
    ReadPage::from_json(&read_json(path)?)
        .with_context(|| format!("failed to parse read page: {}", path.display()))
}

fn level_for(bases: bool) -> ViewLevel {
    if bases { ViewLevel::Bases } else { ViewLevel::Reads }
}

fn print_read(read: &DecodedRead) {
    println!(
        "{:>4}  {:<30} {:>12} {:>12}  {}  {}",
        read.lane,
        read.name,
        read.position,
        read.end,
        if read.reverse { '-' } else { '+' },
        read.cigar.as_deref().unwrap_or("*"),
    );
}

fn print_session(session: &mut ReadSession) {
    let mut reads: Vec<&DecodedRead> = session.cache().reads().collect();
    reads.sort_by(|a, b| a.lane.cmp(&b.lane).then(a.position.cmp(&b.position)));

    let lanes = reads.iter().map(|r| r.lane + 1).max().unwrap_or(0);
    println!(
        "Window [{}, {}) bases={}: {} reads in {} lanes",
        session.cache().start(),
        session.cache().end(),
        session.cache().want_bases(),
        reads.len(),
        lanes
    );
    for read in reads {
        print_read(read);
    }
    for notice in session.take_notices() {
        eprintln!("warning: {notice}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = ViewConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Layout { reads, position } => {
            let page = load_read_page(&reads)?;
            let batch = decode_batch(&page.reads);

            println!("Decoded {} reads into {} lanes", batch.reads.len(), batch.lane_count);
            for read in &batch.reads {
                print_read(read);
            }
            for warning in &batch.warnings {
                eprintln!("warning: {warning}");
            }

            if let Some(position) = position {
                println!("\nPileup at {position}: {}", batch.base_stats.summary(position));
                match batch.base_stats.alleles(position, config.min_allele_fraction) {
                    Some((a1, a2)) => println!("Alleles: {}/{}", a1 as char, a2 as char),
                    None => println!("Alleles: none"),
                }
            }
        }

        Commands::Window {
            reads,
            region,
            bases,
        } => {
            let region: Region = region.parse().context("failed to parse region")?;
            let page = load_read_page(&reads)?;

            let mut session = ReadSession::new(config);
            session.set_view(region, level_for(bases));
            session.receive_page(page);
            print_session(&mut session);
        }

        Commands::Bam {
            bam,
            region,
            bases,
        } => {
            let region: Region = region.parse().context("failed to parse region")?;
            let records = AlignmentReader::read_bam(&bam, &region)?;

            let mut session = ReadSession::new(config);
            session.set_view(region, level_for(bases));
            session.receive_page(ReadPage {
                reads: records,
                next_page_token: None,
            });
            print_session(&mut session);
        }

        Commands::Variants { variants } => {
            let page = VariantPage::from_json(&read_json(&variants)?)
                .with_context(|| format!("failed to parse variant page: {}", variants.display()))?;
            let layout = layout_variants(&page.variants)?;

            println!("{} calls in {} tracks", layout.calls.len(), layout.track_count);
            for call in &layout.calls {
                println!(
                    "{:>4}  {:>12}  {:<20} {}",
                    call.lane, call.position, call.callset_name, call.genotype
                );
            }
        }
    }

    Ok(())
}

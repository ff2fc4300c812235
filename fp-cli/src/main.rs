use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};

use audiofp::{Engine, MatchOutcome, TrackAttributes};

#[derive(Parser)]
#[command(name = "fpctl", about = "Ingest and query the audio fingerprinting catalog")]
struct Cli {
    /// Path to the SQLite catalog file.
    #[arg(long, global = true, default_value = "fingerprints.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalog database if it doesn't exist yet.
    InitDb,
    /// Fingerprint a WAV/FLAC file and add it to the catalog.
    Ingest {
        /// Path to the audio file to ingest.
        file: PathBuf,

        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        artist: String,
        #[arg(long, default_value = "")]
        album: String,
        #[arg(long, default_value = "")]
        year: String,
    },
    /// Fingerprint a WAV/FLAC clip and match it against the catalog.
    Query {
        /// Path to the audio clip to identify.
        file: PathBuf,

        /// Minimum modal score required to report a match.
        #[arg(long, default_value_t = 5)]
        min_score: u32,
    },
}

fn load_pcm(path: &PathBuf) -> fp_core::types::Pcm {
    let bytes = std::fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        exit(1);
    });
    fp_core::load_audio(&bytes).unwrap_or_else(|e| {
        log::error!("failed to decode {}: {e}", path.display());
        eprintln!("Error decoding {}: {e}", path.display());
        exit(1);
    })
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("db = {}", cli.db.display());

    match cli.command {
        Commands::InitDb => {
            Engine::open(&cli.db).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                exit(1);
            });
            println!("Initialized catalog at {}", cli.db.display());
        }

        Commands::Ingest {
            file,
            title,
            artist,
            album,
            year,
        } => {
            let engine = Engine::open(&cli.db).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                exit(1);
            });
            let pcm = load_pcm(&file);
            let attributes = TrackAttributes {
                title,
                artist,
                album,
                year,
                source_locator: file.display().to_string(),
            };
            let track_id = engine.ingest(&pcm, &attributes).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                exit(1);
            });
            println!("Ingested track {track_id}: {}", file.display());
        }

        Commands::Query { file, min_score } => {
            let engine = Engine::open(&cli.db)
                .unwrap_or_else(|e| {
                    eprintln!("Error: {e}");
                    exit(1);
                })
                .with_matcher_config(audiofp::MatcherConfig { min_score });
            let pcm = load_pcm(&file);
            match engine.query(&pcm) {
                Ok(MatchOutcome::Matched { track_id, score }) => {
                    match engine.store().get_track(track_id) {
                        Ok(Some(track)) => println!(
                            "Match: {} — {} (score {score})",
                            track.attributes.title, track.attributes.artist
                        ),
                        Ok(None) => println!("Match: track {track_id} (score {score})"),
                        Err(e) => eprintln!("Error fetching track metadata: {e}"),
                    }
                }
                Ok(MatchOutcome::NoMatch) => println!("No match"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    exit(1);
                }
            }
        }
    }
}

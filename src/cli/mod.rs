use crate::bencode::encode;
use crate::codec::Codec;
use crate::config::{CodecConfig, ShapePolicy};
use crate::error::Result;
use crate::torrent::{load_torrent_file, parse_torrent, InfoHashes};
use bytes::Bytes;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "bencode-bridge")]
#[command(
    about = "Convert bencoded torrent metainfo to friendly JSON and back",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    options: CodecArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CodecArgs {
    /// JSON file with codec settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum nesting depth accepted when decoding
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Reject dictionaries whose keys are not sorted
    #[arg(long, global = true)]
    strict_key_order: bool,

    /// Drop JSON values bencode cannot represent instead of failing
    #[arg(long, global = true)]
    lenient: bool,

    /// Hex-escape text that looks like a <hex>..</hex> literal
    #[arg(long, global = true)]
    escape_hex_lookalikes: bool,
}

impl CodecArgs {
    async fn load(&self) -> Result<CodecConfig> {
        let mut config = match &self.config {
            Some(path) => CodecConfig::load(path).await?,
            None => CodecConfig::default(),
        };

        if let Some(max_depth) = self.max_depth {
            config.decoder.max_depth = max_depth;
        }
        if self.strict_key_order {
            config.decoder.require_sorted_keys = true;
        }
        if self.lenient {
            config.bridge.unsupported_shapes = ShapePolicy::Lenient;
        }
        if self.escape_hex_lookalikes {
            config.bridge.escape_hex_lookalikes = true;
        }

        debug!("Codec configuration: {:?}", config);
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a bencoded file into friendly JSON
    ToJson {
        /// Path to the .torrent file
        input: PathBuf,

        /// Write JSON here instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit JSON on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Encode a friendly JSON file into a bencoded file
    FromJson {
        /// Path to the JSON file
        input: PathBuf,

        /// Path of the .torrent file to write
        output: PathBuf,
    },

    /// Show the info hash of a torrent file
    InfoHash {
        /// Path to the .torrent file
        torrent: PathBuf,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub async fn run(&self) -> Result<()> {
        let codec = Codec::new(self.options.load().await?);

        match &self.command {
            Commands::ToJson {
                input,
                output,
                compact,
            } => {
                let torrent = load_torrent_file(input, codec.decoder()).await?;
                let tree = codec.bridge().to_friendly(&torrent);
                let text = render_json(&tree, *compact)?;

                match output {
                    Some(path) => {
                        fs::write(path, &text).await?;
                        info!("Wrote JSON file {}", path.display());
                    }
                    None => {
                        let mut stdout = tokio::io::stdout();
                        stdout.write_all(&text).await?;
                        stdout.flush().await?;
                    }
                }
            }

            Commands::FromJson { input, output } => {
                let encoded = self.encode_json_file(&codec, input).await?;
                fs::write(output, &encoded).await?;
                info!("Wrote torrent file {} ({} bytes)", output.display(), encoded.len());
            }

            Commands::InfoHash { torrent } => {
                let hashes = self.show_info_hash(&codec, torrent).await?;
                println!("{}", hashes);
            }
        }

        Ok(())
    }

    async fn encode_json_file(&self, codec: &Codec, input: &Path) -> Result<Vec<u8>> {
        let text = fs::read(input).await?;
        let tree: JsonValue = serde_json::from_slice(&text)?;
        codec.encode_friendly_object(&tree)
    }

    async fn show_info_hash(&self, codec: &Codec, torrent_path: &Path) -> Result<InfoHashes> {
        let data = Bytes::from(fs::read(torrent_path).await?);
        let torrent = parse_torrent(data.clone(), codec.decoder())?;

        if encode(&torrent) != data {
            warn!(
                "{} is not canonically encoded; hashes are of the canonical form",
                torrent_path.display()
            );
        }

        InfoHashes::from_torrent(&torrent)
    }
}

/// Four-space indented JSON, or a single line when `compact`
fn render_json(tree: &JsonValue, compact: bool) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if compact {
        serde_json::to_writer(&mut out, tree)?;
    } else {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        tree.serialize(&mut serializer)?;
    }
    out.push(b'\n');
    Ok(out)
}

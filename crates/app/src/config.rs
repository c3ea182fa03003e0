//! Configuration for the catc application.
//!
//! Handles parsing command-line arguments and filling in defaults. The
//! positional layout follows the classic `catc compress <in> <out> <cats>`
//! form; everything else is an optional flag.

use log::LevelFilter;
use std::path::PathBuf;

/// Carrier file looked up inside the cat folder.
pub const DEFAULT_CARRIER_NAME: &str = "cat.png";

/// Output carrier written into the output folder.
pub const DEFAULT_OUTPUT_NAME: &str = "compressed_with_catc.png";

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Compress a folder of text files into one carrier
    Compress {
        input_folder: PathBuf,
        output_folder: PathBuf,
        cat_folder: PathBuf,
    },

    /// Extract and decompress every carrier in a folder
    Extract {
        input_folder: PathBuf,
        output_folder: PathBuf,
    },

    /// Compress one file into a standalone block file
    Pack { input: PathBuf, output: PathBuf },

    /// Decompress a standalone block file
    Unpack { input: PathBuf, output: PathBuf },

    /// Print usage and exit
    Help,
}

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub command: Command,

    // === Discovery ===
    /// Extension of files to compress (with leading dot)
    pub text_ext: String,

    /// Extension of carrier files to extract (with leading dot)
    pub carrier_ext: String,

    // === Carrier ===
    /// Explicit carrier path (default: `<cat_folder>/cat.png`)
    pub carrier: Option<PathBuf>,

    /// Output carrier file name
    pub out_name: String,

    // === Behavior ===
    /// Log level for env_logger (RUST_LOG still overrides)
    pub log_level: LevelFilter,

    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print detailed metrics summary
    pub print_metrics: bool,

    /// Write `key=value` metrics to this file after the run
    pub metrics_file: Option<PathBuf>,
}

impl Config {
    /// Parse configuration from command-line arguments (program name excluded).
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut positional: Vec<&str> = Vec::new();
        let mut text_ext: Option<String> = None;
        let mut carrier_ext: Option<String> = None;
        let mut carrier: Option<PathBuf> = None;
        let mut out_name: Option<String> = None;
        let mut log_level = LevelFilter::Info;
        let mut print_config = false;
        let mut print_metrics = true;
        let mut metrics_file: Option<PathBuf> = None;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--ext" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--ext requires an extension".to_string());
                    }
                    text_ext = Some(normalize_ext(&args[i])?);
                }
                "--carrier-ext" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--carrier-ext requires an extension".to_string());
                    }
                    carrier_ext = Some(normalize_ext(&args[i])?);
                }
                "--carrier" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--carrier requires a path".to_string());
                    }
                    carrier = Some(PathBuf::from(&args[i]));
                }
                "--out-name" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--out-name requires a file name".to_string());
                    }
                    out_name = Some(args[i].clone());
                }
                "--verbose" | "-v" => {
                    log_level = LevelFilter::Debug;
                }
                "--quiet" | "-q" => {
                    log_level = LevelFilter::Warn;
                }
                "--print-config" => {
                    print_config = true;
                }
                "--no-metrics" => {
                    print_metrics = false;
                }
                "--metrics-file" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--metrics-file requires a path".to_string());
                    }
                    metrics_file = Some(PathBuf::from(&args[i]));
                }
                "--help" | "-h" => {
                    positional.clear();
                    positional.push("help");
                    break;
                }
                arg if arg.starts_with('-') && arg.len() > 1 => {
                    return Err(format!("unknown argument: {arg}"));
                }
                arg => positional.push(arg),
            }
            i += 1;
        }

        let command = parse_command(&positional)?;

        Ok(Config {
            command,
            text_ext: text_ext.unwrap_or_else(|| ".txt".to_string()),
            carrier_ext: carrier_ext.unwrap_or_else(|| ".png".to_string()),
            carrier,
            out_name: out_name.unwrap_or_else(|| DEFAULT_OUTPUT_NAME.to_string()),
            log_level,
            print_config,
            print_metrics,
            metrics_file,
        })
    }

    /// Carrier image to attach to, for `compress`.
    pub fn carrier_path(&self) -> Option<PathBuf> {
        match (&self.carrier, &self.command) {
            (Some(path), _) => Some(path.clone()),
            (None, Command::Compress { cat_folder, .. }) => Some(cat_folder.join(DEFAULT_CARRIER_NAME)),
            _ => None,
        }
    }

    /// Carrier file to write, for `compress`.
    pub fn output_path(&self) -> Option<PathBuf> {
        match &self.command {
            Command::Compress { output_folder, .. } => Some(output_folder.join(&self.out_name)),
            _ => None,
        }
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.command {
            Command::Compress {
                input_folder,
                output_folder,
                cat_folder,
            } => {
                println!("Mode: compress");
                println!("Input folder:  {}", input_folder.display());
                println!("Output folder: {}", output_folder.display());
                println!("Cat folder:    {}", cat_folder.display());
            }
            Command::Extract {
                input_folder,
                output_folder,
            } => {
                println!("Mode: extract");
                println!("Input folder:  {}", input_folder.display());
                println!("Output folder: {}", output_folder.display());
            }
            Command::Pack { input, output } | Command::Unpack { input, output } => {
                let mode = if matches!(self.command, Command::Pack { .. }) { "pack" } else { "unpack" };
                println!("Mode: {mode}");
                println!("Input:  {}", input.display());
                println!("Output: {}", output.display());
            }
            Command::Help => println!("Mode: help"),
        }
        println!();
        println!("Text extension:    {}", self.text_ext);
        println!("Carrier extension: {}", self.carrier_ext);
        if let Some(carrier) = self.carrier_path() {
            println!("Carrier: {}", carrier.display());
        }
        if let Some(output) = self.output_path() {
            println!("Output carrier: {}", output.display());
        }
        println!("Log level: {}", self.log_level);
        if let Some(path) = &self.metrics_file {
            println!("Metrics file: {}", path.display());
        }
        println!();
    }
}

fn parse_command(positional: &[&str]) -> Result<Command, String> {
    let Some((&mode, rest)) = positional.split_first() else {
        return Err("missing mode (compress, extract, pack, unpack)".to_string());
    };

    let paths_for = |n: usize, usage: &str| -> Result<Vec<PathBuf>, String> {
        if rest.len() != n {
            return Err(format!("usage: catc {mode} {usage}"));
        }
        Ok(rest.iter().map(PathBuf::from).collect())
    };

    match mode {
        "compress" => {
            let mut paths = paths_for(3, "<input_folder> <output_folder> <cat_folder>")?.into_iter();
            Ok(Command::Compress {
                input_folder: paths.next().unwrap_or_default(),
                output_folder: paths.next().unwrap_or_default(),
                cat_folder: paths.next().unwrap_or_default(),
            })
        }
        "extract" => {
            let mut paths = paths_for(2, "<input_folder> <output_folder>")?.into_iter();
            Ok(Command::Extract {
                input_folder: paths.next().unwrap_or_default(),
                output_folder: paths.next().unwrap_or_default(),
            })
        }
        "pack" | "unpack" => {
            let mut paths = paths_for(2, "<input_file> <output_file>")?.into_iter();
            let input = paths.next().unwrap_or_default();
            let output = paths.next().unwrap_or_default();
            Ok(if mode == "pack" {
                Command::Pack { input, output }
            } else {
                Command::Unpack { input, output }
            })
        }
        "help" => Ok(Command::Help),
        other => Err(format!("unknown mode: {other}")),
    }
}

/// Accept `txt` or `.txt`, store `.txt`.
fn normalize_ext(ext: &str) -> Result<String, String> {
    let trimmed = ext.trim_start_matches('.');
    if trimmed.is_empty() {
        return Err(format!("invalid extension: {ext:?}"));
    }
    Ok(format!(".{trimmed}"))
}

pub fn print_help() {
    println!("catc: hide Huffman-compressed text files inside a carrier image");
    println!();
    println!("USAGE:");
    println!("    catc compress <input_folder> <output_folder> <cat_folder> [OPTIONS]");
    println!("    catc extract  <input_folder> <output_folder> [OPTIONS]");
    println!("    catc pack     <input_file> <output_file>");
    println!("    catc unpack   <input_file> <output_file>");
    println!();
    println!("OPTIONS:");
    println!("    --ext <EXT>             Files to compress (default: .txt)");
    println!("    --carrier-ext <EXT>     Carriers to extract (default: .png)");
    println!("    --carrier <PATH>        Carrier image (default: <cat_folder>/cat.png)");
    println!("    --out-name <NAME>       Output carrier name (default: compressed_with_catc.png)");
    println!();
    println!("    --verbose, -v           Debug logging");
    println!("    --quiet, -q             Warnings and errors only");
    println!("    --print-config          Print resolved configuration");
    println!("    --no-metrics            Don't print metrics summary");
    println!("    --metrics-file <PATH>   Write key=value metrics to PATH");
    println!("    --help, -h              Print this help");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG                Overrides the log level (e.g. RUST_LOG=catc_core=debug)");
    println!();
    println!("EXAMPLES:");
    println!("    catc compress notes/ out/ cats/            # notes/*.txt -> out/compressed_with_catc.png");
    println!("    catc extract out/ restored/                # out/*.png -> restored/<stem>/*.txt");
    println!("    catc pack report.txt report.huf            # single file block");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_compress_defaults() {
        let config = Config::from_args(&args(&["compress", "in", "out", "cats"])).unwrap();
        assert_eq!(
            config.command,
            Command::Compress {
                input_folder: "in".into(),
                output_folder: "out".into(),
                cat_folder: "cats".into(),
            }
        );
        assert_eq!(config.text_ext, ".txt");
        assert_eq!(config.carrier_path(), Some(PathBuf::from("cats/cat.png")));
        assert_eq!(
            config.output_path(),
            Some(PathBuf::from("out/compressed_with_catc.png"))
        );
        assert_eq!(config.log_level, LevelFilter::Info);
        assert!(config.print_metrics);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_args(&args(&[
            "compress", "in", "out", "cats", "--ext", "md", "--carrier", "pic.jpg", "--out-name",
            "x.jpg", "-q", "--no-metrics",
        ]))
        .unwrap();
        assert_eq!(config.text_ext, ".md");
        assert_eq!(config.carrier_path(), Some(PathBuf::from("pic.jpg")));
        assert_eq!(config.output_path(), Some(PathBuf::from("out/x.jpg")));
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert!(!config.print_metrics);
    }

    #[test]
    fn test_extract() {
        let config =
            Config::from_args(&args(&["extract", "in", "out", "--carrier-ext", ".bmp", "-v"])).unwrap();
        assert_eq!(
            config.command,
            Command::Extract {
                input_folder: "in".into(),
                output_folder: "out".into(),
            }
        );
        assert_eq!(config.carrier_ext, ".bmp");
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.output_path(), None);
        assert_eq!(config.metrics_file, None);
    }

    #[test]
    fn test_metrics_file() {
        let config =
            Config::from_args(&args(&["pack", "a.txt", "a.huf", "--metrics-file", "run.txt"])).unwrap();
        assert_eq!(config.metrics_file, Some(PathBuf::from("run.txt")));
        assert!(Config::from_args(&args(&["pack", "a.txt", "a.huf", "--metrics-file"])).is_err());
    }

    #[test]
    fn test_pack_unpack() {
        let config = Config::from_args(&args(&["pack", "a.txt", "a.huf"])).unwrap();
        assert!(matches!(config.command, Command::Pack { .. }));
        let config = Config::from_args(&args(&["unpack", "a.huf", "a.txt"])).unwrap();
        assert!(matches!(config.command, Command::Unpack { .. }));
    }

    #[test]
    fn test_help() {
        let config = Config::from_args(&args(&["compress", "--help"])).unwrap();
        assert_eq!(config.command, Command::Help);
    }

    #[test]
    fn test_errors() {
        assert!(Config::from_args(&args(&[])).is_err());
        assert!(Config::from_args(&args(&["compress", "in", "out"])).is_err());
        assert!(Config::from_args(&args(&["shrink", "in", "out"])).is_err());
        assert!(Config::from_args(&args(&["extract", "in", "out", "--bogus"])).is_err());
        assert!(Config::from_args(&args(&["extract", "in", "out", "--ext"])).is_err());
        assert!(Config::from_args(&args(&["extract", "in", "out", "--ext", "."])).is_err());
    }
}

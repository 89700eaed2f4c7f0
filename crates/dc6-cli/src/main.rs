use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use dc6_core::{Animation, DecodeOptions, Dc6Error, ErrorKind, Frame};
use glob::glob;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod export;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("DC6_BUILD_COMMIT"),
    ", ",
    env!("DC6_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = concat!(
    "Examples:\n",
    "  dc6 info sprite.dc6 -o report.json\n",
    "  dc6 export sprite.dc6 -o frames/ --palette act1.json\n",
    "  dc6 reencode sprite.dc6 -o canonical.dc6 --verify"
);

#[derive(Parser, Debug)]
#[command(name = "dc6")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Inspect, export and re-encode DC6 sprite sheets.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a sprite sheet and write a JSON report.
    Info {
        /// Path to a .dc6 file (a glob pattern must match exactly one file)
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Include each frame's palette indices in the report
        #[arg(long)]
        pixels: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        #[command(flatten)]
        decode: DecodeArgs,
    },
    /// Write every frame as a PNG image.
    Export {
        /// Path to a .dc6 file (a glob pattern must match exactly one file)
        input: PathBuf,

        /// Output directory, created if missing
        #[arg(short = 'o', long = "out-dir")]
        out_dir: PathBuf,

        /// Palette JSON (256 [r, g, b, a] entries); grayscale when omitted
        #[arg(long)]
        palette: Option<PathBuf>,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        #[command(flatten)]
        decode: DecodeArgs,
    },
    /// Decode then encode with canonical run-length streams.
    Reencode {
        /// Path to a .dc6 file (a glob pattern must match exactly one file)
        input: PathBuf,

        /// Output .dc6 path
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Decode the written bytes and check every frame matches
        #[arg(long)]
        verify: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        #[command(flatten)]
        decode: DecodeArgs,
    },
    /// Write the default grayscale palette as JSON.
    Palette {
        /// Output palette path (JSON)
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Fail on bytes left after the last frame
    #[arg(long)]
    strict: bool,

    /// Reject frames with more than this many pixels
    #[arg(long, value_name = "N")]
    max_frame_pixels: Option<usize>,
}

impl DecodeArgs {
    fn options(&self) -> DecodeOptions {
        let defaults = DecodeOptions::default();
        DecodeOptions {
            max_frame_pixels: self.max_frame_pixels.unwrap_or(defaults.max_frame_pixels),
            allow_trailing_bytes: !self.strict,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Info {
            input,
            report,
            stdout,
            pretty,
            compact,
            pixels,
            quiet,
            decode,
        } => cmd_info(
            input,
            report,
            stdout,
            pretty,
            compact,
            pixels,
            quiet,
            decode.options(),
        ),
        Commands::Export {
            input,
            out_dir,
            palette,
            quiet,
            decode,
        } => cmd_export(input, out_dir, palette, quiet, decode.options()),
        Commands::Reencode {
            input,
            output,
            verify,
            quiet,
            decode,
        } => cmd_reencode(input, output, verify, quiet, decode.options()),
        Commands::Palette { output, quiet } => cmd_palette(output, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn decode_failed(input: &Path, err: Dc6Error) -> CliError {
    let hint = match err.kind() {
        ErrorKind::TruncatedInput => "the file ends early; it may be truncated or not a DC6 file",
        ErrorKind::InvalidCount => "check the header counts or raise --max-frame-pixels",
        ErrorKind::BoundsViolation => "a frame's scanline data does not fit its dimensions",
        ErrorKind::TrailingData => "drop --strict to accept trailing bytes",
        ErrorKind::PaletteShapeMismatch | ErrorKind::Io => "check the input file",
    };
    CliError::new(
        format!("failed to decode {}: {}", input.display(), err),
        Some(hint.to_string()),
    )
}

fn cmd_info(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    pixels: bool,
    quiet: bool,
    options: DecodeOptions,
) -> Result<(), CliError> {
    let input = resolve_input_path(&input)?;
    validate_input_file(&input)?;
    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };
    if let Some(report_path) = report.as_ref() {
        ensure_distinct(&input, report_path)?;
    }

    let (bytes, animation) = read_animation(&input, &options)?;
    let rep = dc6_core::make_report(
        &input.display().to_string(),
        bytes.len() as u64,
        &animation,
        pixels,
    );
    let json = serialize_json(&rep, pretty, compact)?;

    match report {
        None => print!("{}", json),
        Some(report) => {
            write_output(&report, json.as_bytes())?;
            if !quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
    }
    Ok(())
}

fn cmd_export(
    input: PathBuf,
    out_dir: PathBuf,
    palette: Option<PathBuf>,
    quiet: bool,
    options: DecodeOptions,
) -> Result<(), CliError> {
    let input = resolve_input_path(&input)?;
    validate_input_file(&input)?;
    let palette = palette
        .as_deref()
        .map(export::load_palette)
        .transpose()
        .map_err(|err| {
            CliError::new(
                format!("{:#}", err),
                Some("a palette is a JSON array of 256 [r, g, b, a] entries".to_string()),
            )
        })?;

    let (_, mut animation) = read_animation(&input, &options)?;
    animation.replace_palette(palette);
    let written = export::export_frames(&animation, &animation.effective_palette(), &out_dir)?;

    if !quiet {
        eprintln!(
            "OK: saved {} frames -> {}",
            written.len(),
            out_dir.display()
        );
    }
    Ok(())
}

fn cmd_reencode(
    input: PathBuf,
    output: PathBuf,
    verify: bool,
    quiet: bool,
    options: DecodeOptions,
) -> Result<(), CliError> {
    let input = resolve_input_path(&input)?;
    validate_input_file(&input)?;
    ensure_distinct(&input, &output)?;

    let (original, animation) = read_animation(&input, &options)?;
    let bytes = dc6_core::encode(&animation).map_err(|err| {
        CliError::new(
            format!("failed to encode {}: {}", input.display(), err),
            None,
        )
    })?;
    if verify {
        verify_reencoded(&animation, &bytes)?;
    }
    write_output(&output, &bytes)?;

    if !quiet {
        eprintln!(
            "OK: {} -> {} ({} -> {} bytes)",
            input.display(),
            output.display(),
            original.len(),
            bytes.len()
        );
    }
    Ok(())
}

fn verify_reencoded(expected: &Animation, bytes: &[u8]) -> Result<(), CliError> {
    let decoded = dc6_core::decode(bytes).map_err(|err| {
        CliError::new(
            format!("re-encoded output does not decode: {}", err),
            None,
        )
    })?;
    if decoded.header() != expected.header() || decoded.frame_count() != expected.frame_count() {
        return Err(CliError::new("re-encoded header or frame count differs", None));
    }
    for (index, (a, b)) in expected.frames().zip(decoded.frames()).enumerate() {
        if !same_frame_content(a, b) {
            return Err(CliError::new(
                format!("re-encoded frame {} differs from the input", index),
                None,
            ));
        }
    }
    debug!(frames = decoded.frame_count(), "verified re-encoded output");
    Ok(())
}

/// Every decoded field except the scanline stream, which re-encoding may
/// canonicalize.
fn same_frame_content(a: &Frame, b: &Frame) -> bool {
    (a.width(), a.height()) == (b.width(), b.height())
        && a.flipped == b.flipped
        && (a.offset_x, a.offset_y) == (b.offset_x, b.offset_y)
        && (a.unknown, a.next_block) == (b.unknown, b.next_block)
        && a.terminator == b.terminator
        && a.pixels() == b.pixels()
}

fn cmd_palette(output: PathBuf, quiet: bool) -> Result<(), CliError> {
    let json = serialize_json(&dc6_core::default_palette(), true, false)?;
    write_output(&output, json.as_bytes())?;
    if !quiet {
        eprintln!("OK: palette written -> {}", output.display());
    }
    Ok(())
}

fn read_animation(input: &Path, options: &DecodeOptions) -> Result<(Vec<u8>, Animation), CliError> {
    let bytes = fs::read(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let animation =
        dc6_core::decode_with(&bytes, options).map_err(|err| decode_failed(input, err))?;
    debug!(
        input = %input.display(),
        directions = animation.directions.len(),
        frames = animation.frame_count(),
        "decoded input"
    );
    Ok((bytes, animation))
}

fn serialize_json<T: serde::Serialize>(
    value: &T,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write output: {}", path.display()))?;
    Ok(())
}

fn ensure_distinct(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let Some(parent) = output.parent() else {
        return Ok(());
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    // A missing output directory cannot contain the input.
    let Ok(output_dir) = fs::canonicalize(parent) else {
        return Ok(());
    };
    let file_name = output
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", output.display()))?;
    if output_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a .dc6 file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a .dc6 file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "dc6" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .dc6 file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected a .dc6 file".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}",
                    pattern, count, listed
                ),
                Some("pass a single sprite file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

#[cfg(test)]
mod tests {
    use super::*;
    use dc6_core::Direction;

    fn tagged(frame: Frame) -> Frame {
        let mut frame = frame;
        frame.unknown = 0x1234;
        frame.next_block = 0x40;
        frame.terminator = [0xEE, 0xEE, 0xEE];
        frame
    }

    fn animation() -> Animation {
        let mut animation = Animation::default();
        animation.version = 6;
        animation.directions.push(Direction::new(vec![
            tagged(Frame::from_pixels(2, 2, vec![5, 0, 0, 7]).unwrap().with_offset(3, -2)),
            tagged(Frame::from_pixels(1, 1, vec![9]).unwrap().with_flipped(true)),
        ]));
        animation
    }

    #[test]
    fn verify_accepts_faithful_reencode() {
        let expected = animation();
        let bytes = dc6_core::encode(&expected).unwrap();
        assert!(verify_reencoded(&expected, &bytes).is_ok());
    }

    #[test]
    fn verify_catches_dropped_frame_fields() {
        let expected = animation();
        let edits: [fn(&mut Frame); 4] = [
            |frame| frame.flipped = 0,
            |frame| frame.unknown = 0,
            |frame| frame.next_block = 0,
            |frame| frame.terminator = [0; 3],
        ];
        for edit in edits {
            let mut altered = expected.clone();
            edit(&mut altered.directions[0].frames[1]);
            let bytes = dc6_core::encode(&altered).unwrap();
            let err = verify_reencoded(&expected, &bytes).unwrap_err();
            assert_eq!(err.message, "re-encoded frame 1 differs from the input");
        }
    }

    #[test]
    fn verify_catches_changed_dimensions() {
        let expected = animation();
        let mut altered = expected.clone();
        altered.directions[0].frames[0] =
            tagged(Frame::from_pixels(4, 1, vec![5, 0, 0, 7]).unwrap().with_offset(3, -2));
        let bytes = dc6_core::encode(&altered).unwrap();
        let err = verify_reencoded(&expected, &bytes).unwrap_err();
        assert_eq!(err.message, "re-encoded frame 0 differs from the input");
    }
}

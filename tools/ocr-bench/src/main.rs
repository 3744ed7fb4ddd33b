//! Command-line front end for the Scenario OCR API.
//!
//! Sends one image (or a directory of images) through the same client the
//! desktop app uses and prints the extracted text.
//!
//! Usage:
//!   scenario-ocr <image>                        Recognize one image
//!   scenario-ocr <image> --flow upload          Upload first, then run
//!   scenario-ocr <image> --pretty               Pretty-print JSON replies
//!   scenario-ocr --batch <directory>            All images in directory → CSV
//!   scenario-ocr --save-token <token>           Store the token in the keychain
//!
//! Options: --user <name> --token <token> --api <url> --flow inline|upload
//!          --reply unwrap|coerce --timeout <secs> --jpeg

use scenario_ocr_lib::scenario::config::{save_keychain_token, RequestFlow};
use scenario_ocr_lib::scenario::{ReplyStrategy, ScenarioClient, ScenarioConfig};
use scenario_ocr_lib::upload::{FileValidator, UploadCandidate};
use scenario_ocr_lib::OcrError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Extensions picked up by `--batch`.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// A single recognition can take minutes on large scans.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Default)]
struct Options {
    target: Option<String>,
    batch: bool,
    user: Option<String>,
    token: Option<String>,
    api: Option<String>,
    flow: Option<String>,
    reply: Option<String>,
    timeout_secs: Option<String>,
    save_token: Option<String>,
    pretty: bool,
    jpeg: bool,
}

fn usage() -> ! {
    eprintln!("Usage:");
    eprintln!("  scenario-ocr <image> [--user U] [--token T] [--api URL] [--flow inline|upload]");
    eprintln!("               [--reply unwrap|coerce] [--timeout SECS] [--pretty] [--jpeg]");
    eprintln!("  scenario-ocr --batch <directory> [options]");
    eprintln!("  scenario-ocr --save-token <token>");
    std::process::exit(1);
}

fn parse_args(args: &[String]) -> Options {
    let mut opts = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| match iter.next() {
            Some(v) => v.clone(),
            None => {
                eprintln!("{} requires a value", flag);
                usage();
            }
        };
        match arg.as_str() {
            "--batch" => {
                opts.batch = true;
                opts.target = Some(value("--batch"));
            }
            "--user" => opts.user = Some(value("--user")),
            "--token" => opts.token = Some(value("--token")),
            "--api" => opts.api = Some(value("--api")),
            "--flow" => opts.flow = Some(value("--flow")),
            "--reply" => opts.reply = Some(value("--reply")),
            "--timeout" => opts.timeout_secs = Some(value("--timeout")),
            "--save-token" => opts.save_token = Some(value("--save-token")),
            "--pretty" => opts.pretty = true,
            "--jpeg" => opts.jpeg = true,
            "-h" | "--help" => usage(),
            other if other.starts_with("--") => {
                eprintln!("Unknown option: {}", other);
                usage();
            }
            other => opts.target = Some(other.to_string()),
        }
    }
    opts
}

/// Environment first, then command-line overrides.
fn build_config<F>(opts: &Options, lookup: F) -> Result<ScenarioConfig, OcrError>
where
    F: Fn(&str) -> Option<String>,
{
    let reply_in_env = lookup("SCENARIO_REPLY").is_some_and(|v| !v.trim().is_empty());
    let mut config = ScenarioConfig::from_lookup(lookup)?;

    if let Some(api) = &opts.api {
        config.api_base = api.trim_end_matches('/').to_string();
    }
    if let Some(user) = &opts.user {
        config.user = user.clone();
    }
    if let Some(flow) = &opts.flow {
        config.flow = RequestFlow::parse(flow)?;
        if !reply_in_env {
            config.reply = config.flow.default_strategy();
        }
    }
    if let Some(reply) = &opts.reply {
        config.reply = ReplyStrategy::parse(reply)?;
    }
    if opts.jpeg {
        config.transcode_jpeg = true;
    }
    if let Some(secs) = &opts.timeout_secs {
        let secs: u64 = secs
            .parse()
            .map_err(|_| OcrError::Config(format!("--timeout is not a number: {}", secs)))?;
        config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    } else if config.timeout.is_none() {
        config.timeout = Some(DEFAULT_TIMEOUT);
    }

    if let Some(token) = &opts.token {
        config.token = token.clone();
    }
    if config.token.is_empty() {
        config.token = scenario_ocr_lib::scenario::config::keychain_token().unwrap_or_default();
    }
    if config.token.is_empty() {
        return Err(OcrError::Config(
            "no API token: pass --token, set SCENARIO_API_TOKEN, or run --save-token".to_string(),
        ));
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    scenario_ocr_lib::load_env_files();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }
    let opts = parse_args(&args);

    if let Some(token) = &opts.save_token {
        match save_keychain_token(token) {
            Ok(()) => eprintln!("Token saved to OS keychain"),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let Some(target) = opts.target.clone() else {
        usage();
    };

    let client = match build_config(&opts, |key| std::env::var(key).ok())
        .and_then(ScenarioClient::new)
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let code = if opts.batch {
        run_batch(&client, Path::new(&target)).await
    } else {
        run_single(&client, Path::new(&target), opts.pretty).await
    };
    std::process::exit(code);
}

async fn recognize_path(client: &ScenarioClient, path: &Path) -> Result<String, OcrError> {
    let candidate = UploadCandidate::open(path, &FileValidator::default()).await?;
    client.recognize(&candidate).await
}

async fn run_single(client: &ScenarioClient, path: &Path, pretty: bool) -> i32 {
    let start = Instant::now();
    match recognize_path(client, path).await {
        Ok(text) => {
            eprintln!(
                "[SCENARIO] {} → {} chars in {:.1}ms",
                path.display(),
                text.chars().count(),
                start.elapsed().as_micros() as f64 / 1000.0
            );
            println!("{}", if pretty { pretty_print(&text) } else { text });
            0
        }
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            1
        }
    }
}

/// Indent JSON replies; anything else is printed unchanged.
fn pretty_print(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .filter(|v| v.is_object() || v.is_array())
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| text.to_string())
}

fn image_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    entries.sort();
    Ok(entries)
}

async fn run_batch(client: &ScenarioClient, dir: &Path) -> i32 {
    let entries = match image_files(dir) {
        Ok(entries) if !entries.is_empty() => entries,
        Ok(_) => {
            eprintln!("No image files found in {}", dir.display());
            return 1;
        }
        Err(e) => {
            eprintln!("Cannot read {}: {}", dir.display(), e);
            return 1;
        }
    };

    println!("filename,char_count,wall_ms,status");

    let mut latencies: Vec<f64> = Vec::new();
    let mut failures = 0usize;

    for path in &entries {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let start = Instant::now();
        let outcome = recognize_path(client, path).await;
        let wall_ms = start.elapsed().as_micros() as f64 / 1000.0;

        match outcome {
            Ok(text) => {
                println!("{},{},{:.1},ok", csv_field(&filename), text.chars().count(), wall_ms);
                latencies.push(wall_ms);
            }
            Err(e) => {
                println!("{},0,{:.1},{}", csv_field(&filename), wall_ms, csv_field(&e.to_string()));
                failures += 1;
            }
        }
        std::io::stdout().flush().ok();
    }

    eprintln!("\n--- Batch Summary ---");
    eprintln!("  Images processed: {}", entries.len());
    eprintln!("  Failures: {}", failures);
    if !latencies.is_empty() {
        print_latency_summary(&mut latencies);
    }

    if failures > 0 {
        1
    } else {
        0
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn print_latency_summary(latencies: &mut [f64]) {
    latencies.sort_by(|a, b| a.total_cmp(b));
    let median = latencies[latencies.len() / 2];
    let p99_idx = ((latencies.len() as f64 * 0.99).ceil() as usize).min(latencies.len() - 1);
    let p99 = latencies[p99_idx];
    let avg: f64 = latencies.iter().sum::<f64>() / latencies.len() as f64;

    eprintln!("  Median: {:.1}ms", median);
    eprintln!("  Average: {:.1}ms", avg);
    eprintln!("  P99: {:.1}ms", p99);
}

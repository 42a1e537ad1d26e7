use clap::Parser;
use irprof::*;
use regex::Regex;
use std::fs;

/// Embedded demo snapshot for quick testing without --input
/// (the classic nested-loop-plus-branch shape, compiled with -g).
const SAMPLE_MODULE: &str = include_str!("../../fixtures/index_is_input.json");

#[derive(Parser, Debug)]
/// CLI for hierarchical complexity profile extraction from IR snapshots
struct Args {
    /// Input module snapshot, JSON (if not given, use the embedded sample)
    #[clap(short, long)]
    input: Option<String>,
    /// Output file (if not given, print to stdout)
    #[clap(short, long)]
    output: Option<String>,
    /// Only analyze functions whose name matches this regex
    #[clap(short, long)]
    function: Option<String>,
    /// Use host-measured edge probabilities instead of symbolic variables
    #[clap(long)]
    use_branch_probability: bool,
    /// Emit an indented text dump instead of JSON
    #[clap(long)]
    text: bool,
}

// ---------------------------------------------------------------------------
// Pipeline helpers
// ---------------------------------------------------------------------------

/// Load the module snapshot from file or fall back to the embedded sample.
fn load_module(input: Option<&str>) -> Module {
    let raw = match input {
        Some(path) => fs::read_to_string(path).expect("Failed to read input file"),
        None => SAMPLE_MODULE.to_string(),
    };
    match serde_json::from_str(&raw) {
        Ok(module) => module,
        Err(e) => {
            eprintln!("error: malformed module snapshot: {}", e);
            std::process::exit(1);
        }
    }
}

fn function_filter(args: &Args) -> Option<Regex> {
    args.function.as_deref().map(|pat| {
        Regex::new(pat).unwrap_or_else(|e| {
            eprintln!("error: bad --function regex: {}", e);
            std::process::exit(1);
        })
    })
}

fn render(results: &[(String, Result<FunctionProfile, AnalysisError>)], text: bool) -> String {
    if text {
        let mut out = String::new();
        for (name, result) in results {
            match result {
                Ok(profile) => out.push_str(&profile.to_text()),
                Err(e) => out.push_str(&format!("// skipped {}: {}\n", name, e)),
            }
            out.push('\n');
        }
        out
    } else {
        let values: Vec<serde_json::Value> = results
            .iter()
            .filter_map(|(name, result)| match result {
                Ok(profile) => Some(profile.to_json()),
                Err(e) => {
                    eprintln!("skipping function {}: {}", name, e);
                    None
                }
            })
            .collect();
        let mut rendered = serde_json::to_string_pretty(&values)
            .expect("profile JSON rendering is infallible");
        rendered.push('\n');
        rendered
    }
}

/// Write `content` to a file or stdout.
fn emit_output(content: &str, output: Option<&str>) {
    match output {
        Some(path) => {
            fs::write(path, content).expect("Failed to write output file");
            println!("Output written to {}", path);
        }
        None => print!("{}", content),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let args = Args::parse();
    let module = load_module(args.input.as_deref());
    let filter = function_filter(&args);
    let config = AnalysisConfig {
        use_branch_probability: args.use_branch_probability,
    };

    let results: Vec<(String, Result<FunctionProfile, AnalysisError>)> = module
        .functions
        .iter()
        .filter(|f| filter.as_ref().map(|re| re.is_match(&f.name)).unwrap_or(true))
        .map(|f| (f.name.clone(), analyze_function(f, config)))
        .collect();

    emit_output(&render(&results, args.text), args.output.as_deref());
}

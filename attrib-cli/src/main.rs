//! attrib - Claimer Attribution CLI
//!
//! Attributes a claimer to each claim frame in a directory of document
//! records, using a question-answering scoring oracle.
//!
//! # Usage
//!
//! ```bash
//! # Attribute a directory of documents
//! attrib run --input docs_in --output docs_out --topic topic.json
//!
//! # Probe the oracle interactively
//! attrib demo --prob-thresh 0.5
//! ```
//!
//! The binary ships with the deterministic mock oracle for dry runs and
//! smoke tests; production oracles implement `attrib::Oracle` and plug into
//! the same pipeline.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use attrib::batch::scored_in_order;
use attrib::{AttribConfig, ClaimerAttributor, MockOracle, Oracle, QaInstance, TopicConfig};

const BLUE: &str = "\x1b[0;34m";
const END: &str = "\x1b[0m";

/// Claimer attribution over claim-frame documents.
#[derive(Parser)]
#[command(name = "attrib", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attribute every document in a directory.
    Run {
        /// Directory of `*.claims.json` input documents.
        #[arg(long)]
        input: PathBuf,
        /// Directory the attributed documents are written to.
        #[arg(long)]
        output: PathBuf,
        /// Topic configuration with question templates.
        #[arg(long)]
        topic: PathBuf,
        /// Probability a candidate token must exceed to qualify.
        #[arg(long, default_value_t = 0.5)]
        prob_thresh: f32,
        /// Cap final candidates at ceil(ratio * sentence count).
        #[arg(long, default_value_t = 0.5)]
        sratio: f64,
        /// Maximum sentences to look back for context windows.
        #[arg(long, default_value_t = 5)]
        context: usize,
        /// Instances per oracle call.
        #[arg(long, default_value_t = 16)]
        batch_size: usize,
    },
    /// Read question/context pairs from stdin and print per-sub-token
    /// scores, highlighting those above the threshold.
    Demo {
        /// Highlight threshold.
        #[arg(long, default_value_t = 0.5)]
        prob_thresh: f32,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            input,
            output,
            topic,
            prob_thresh,
            sratio,
            context,
            batch_size,
        } => run(input, output, topic, prob_thresh, sratio, context, batch_size),
        Commands::Demo { prob_thresh } => demo(prob_thresh),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    input: PathBuf,
    output: PathBuf,
    topic: PathBuf,
    prob_thresh: f32,
    sratio: f64,
    context: usize,
    batch_size: usize,
) -> attrib::Result<()> {
    let topics = TopicConfig::load(&topic)?;
    let config = AttribConfig::new()
        .with_prob_threshold(prob_thresh)
        .with_selection_ratio(sratio)
        .with_context_lookback(context)
        .with_batch_size(batch_size);
    let attributor = ClaimerAttributor::new(Box::new(MockOracle::new()), topics).with_config(config);
    let summary = attributor.run_directory(&input, &output)?;
    println!("{}", summary);
    Ok(())
}

fn demo(prob_thresh: f32) -> attrib::Result<()> {
    let oracle = MockOracle::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        let question_text = match prompt(&mut lines, "Input a question: >> ")? {
            Some(line) => line,
            None => break,
        };
        let context_text = match prompt(&mut lines, "Input a context: >> ")? {
            Some(line) => line,
            None => break,
        };
        if question_text.is_empty() && context_text.is_empty() {
            break;
        }
        let question = oracle.encode(&question_text)?;
        let context = oracle.encode(&context_text)?;
        let instance = QaInstance::new(
            context,
            question,
            oracle.specials(),
            oracle.max_seq_length(),
            oracle.max_query_length(),
        );
        let probs = scored_in_order(&oracle, std::slice::from_ref(&instance), 1)?;
        let context_probs = &probs[0][instance.context_offset..];

        let mut printed = Vec::new();
        let mut hits = 0;
        for (subtok, prob) in instance.context.subtokens.iter().zip(context_probs) {
            if *prob > prob_thresh {
                printed.push(format!("{}{}[{:.3}]{}", BLUE, subtok, prob, END));
                hits += 1;
            } else {
                printed.push(format!("{}[{:.3}]", subtok, prob));
            }
        }
        println!("Hit count {}:", hits);
        println!("=> {}", printed.join(" "));
    }
    println!("Finished!");
    Ok(())
}

/// Print a prompt and read one trimmed line; `None` on end of input.
fn prompt(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    text: &str,
) -> io::Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?.trim().to_string())),
        None => Ok(None),
    }
}

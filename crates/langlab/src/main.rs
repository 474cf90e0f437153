use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use langlab::{analysis, grammar::Grammar};
use std::{fs, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Translate a regular expression and print every automaton stage.
    Regex {
        /// The pattern, using `|`, `*`, parentheses and optional `·`.
        pattern: String,
    },
    /// Analyze a grammar definition file.
    Grammar {
        /// The path of the grammar definition file.
        input: PathBuf,

        /// The analysis to run.
        #[arg(long, value_enum, default_value = "ll1")]
        method: Method,

        /// A sentence to derive with the LL(1) table.
        #[arg(long)]
        sentence: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Method {
    Ll1,
    Slr1,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::trace!("CLI args = {:?}", args);

    match args.command {
        Command::Regex { pattern } => {
            let analysis = analysis::analyze_regex(&pattern)?;
            println!("postfix: {}", analysis.postfix);
            println!("\nNFA:\n{}", analysis.nfa);
            println!("DFA:\n{}", analysis.dfa);
            println!("minimal DFA:\n{}", analysis.minimized);
        }
        Command::Grammar {
            input,
            method,
            sentence,
        } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let grammar = Grammar::parse(&text)?;
            match method {
                Method::Ll1 => {
                    let analysis = analysis::analyze_ll1(&grammar);
                    println!("normalized grammar:\n{}", analysis.normalized);
                    println!("{}", analysis.sets);
                    println!("{}", analysis.table);
                    if let Some(sentence) = sentence {
                        if !analysis.table.is_ll1() {
                            anyhow::bail!("the grammar is not LL(1), cannot derive a sentence");
                        }
                        println!("\n{}", analysis.table.simulate(&sentence));
                    }
                }
                Method::Slr1 => {
                    if sentence.is_some() {
                        anyhow::bail!("--sentence only applies to --method ll1");
                    }
                    let analysis = analysis::analyze_slr1(&grammar);
                    println!("augmented grammar:\n{}", analysis.augmented);
                    println!("{}", analysis.sets);
                    println!("{}", analysis.collection);
                }
            }
        }
    }

    Ok(())
}

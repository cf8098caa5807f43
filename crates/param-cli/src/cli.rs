//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use param_tree::DEFAULT_MAX_ITERATIONS;

/// paramtree - Render and inspect parameter files
#[derive(Parser, Debug)]
#[command(name = "paramtree")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Maximum number of substitution passes
    #[arg(
        long,
        global = true,
        env = "PARAMTREE_MAX_ITERATIONS",
        default_value_t = DEFAULT_MAX_ITERATIONS,
        value_parser = parse_max_iterations
    )]
    pub max_iterations: usize,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// At least one substitution pass is needed to reach a fixed point.
fn parse_max_iterations(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Overrides and templating options shared by file commands
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadArgs {
    /// Override a parameter after loading (repeatable)
    #[arg(long = "set", value_name = "PATH=VALUE")]
    pub overrides: Vec<String>,

    /// Fail on template names missing from the context
    #[arg(long)]
    pub strict_templates: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the file with every reference substituted
    ///
    /// Examples:
    ///   paramtree render train.yaml
    ///   paramtree render train.yaml --set trainer.lr=0.5
    ///   paramtree render train.yaml -- --batch 32
    Render {
        /// Parameter file (YAML or JSON)
        file: String,

        #[command(flatten)]
        load: LoadArgs,

        /// Template context as key/value pairs after `--`
        #[arg(last = true, value_name = "KEY VALUE")]
        context: Vec<String>,
    },

    /// Print every leaf as `path = value`
    Flatten {
        /// Parameter file (YAML or JSON)
        file: String,

        #[command(flatten)]
        load: LoadArgs,

        /// Output as a JSON object
        #[arg(long)]
        json: bool,

        /// Template context as key/value pairs after `--`
        #[arg(last = true, value_name = "KEY VALUE")]
        context: Vec<String>,
    },

    /// Print the subtree at a dotted path
    ///
    /// Examples:
    ///   paramtree get train.yaml trainer.optimizer
    ///   paramtree get train.yaml 'metrics[0]'
    Get {
        /// Parameter file (YAML or JSON)
        file: String,

        /// Dotted path (`a.b.0` or `a.b[0]`)
        path: String,

        #[command(flatten)]
        load: LoadArgs,

        /// Template context as key/value pairs after `--`
        #[arg(last = true, value_name = "KEY VALUE")]
        context: Vec<String>,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   paramtree completions bash > ~/.local/share/bash-completion/completions/paramtree
    ///   paramtree completions zsh > ~/.zfunc/_paramtree
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

use clap::Parser;
use formula_core::config::runtime::parse_log_level;
use formula_core::log_success;
use formula_core::utils::caret_line;
use formula_core::{
    logging, tokenize, Formula, FormulaError, FormulaOutput, ReferenceResolver, RuntimeConfig,
    Value,
};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

/// Evaluate formula expressions
#[derive(Parser, Debug)]
#[command(name = "formula", version)]
#[command(about = "Evaluate formula expressions", long_about = None)]
struct Args {
    /// Print one JSON object per evaluated expression
    #[arg(long)]
    json: bool,

    /// Print the token stream before evaluating
    #[arg(long)]
    tokens: bool,

    /// Print the parsed tree before evaluating
    #[arg(long)]
    ast: bool,

    /// Bind a host variable: NAME=EXPR (repeatable)
    #[arg(long = "set", value_name = "NAME=EXPR")]
    variables: Vec<String>,

    /// Load runtime configuration from a TOML file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum log level (error, warning, info, debug); enables console logging
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Expression to evaluate (if not provided, reads lines from stdin)
    expression: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };

    if let Some(level) = &args.log_level {
        config.logging.min_log_level =
            parse_log_level(level).ok_or_else(|| format!("Unknown log level: {}", level))?;
        config.logging.enable_console_logging = true;
    }

    // Initialize global logging system
    logging::config::init_runtime_preferences(config.logging.clone())?;
    logging::init_global_logging()?;
    if let Some(path) = &args.config {
        log_success!(
            logging::codes::success::CONFIGURATION_LOADED,
            "Configuration loaded",
            "path" => path.display()
        );
    }

    let mut resolver = ReferenceResolver::new();
    for binding in &args.variables {
        let (name, text) = binding
            .split_once('=')
            .ok_or_else(|| format!("Expected NAME=EXPR, got '{}'", binding))?;
        let value = compile(text, &config)
            .and_then(|formula| formula.evaluate(&resolver))
            .map_err(|e| format!("Cannot bind '{}': {}", name.trim(), e))?;
        resolver.set_variable(name.trim(), value);
    }

    let session = Session {
        args: &args,
        config: &config,
        resolver: &resolver,
    };

    if let Some(expression) = &args.expression {
        if !session.run(expression) {
            std::process::exit(1);
        }
        return Ok(());
    }

    session.repl()
}

fn compile(text: &str, config: &RuntimeConfig) -> Result<Formula, FormulaError> {
    Formula::compile_with(text, &config.parser)
}

struct Session<'a> {
    args: &'a Args,
    config: &'a RuntimeConfig,
    resolver: &'a ReferenceResolver,
}

impl Session<'_> {
    fn repl(&self) -> Result<(), Box<dyn std::error::Error>> {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();

        let mut lines = stdin.lock().lines();
        loop {
            if interactive {
                print!("> ");
                io::stdout().flush()?;
            }

            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let input = line.trim();

            if input.is_empty() {
                continue;
            }
            if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
                break;
            }

            self.run(&line);
        }

        Ok(())
    }

    /// Evaluate one line and report it; returns whether evaluation succeeded
    fn run(&self, text: &str) -> bool {
        if self.args.tokens {
            self.print_tokens(text);
        }

        let result = compile(text, self.config).and_then(|formula| {
            if self.args.ast {
                println!("{}", formula.root().to_tree_string());
            }
            formula.evaluate(self.resolver)
        });

        if self.args.json {
            let output = FormulaOutput::from_result(text, &result);
            match output.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize output: {}", e),
            }
            return output.is_success();
        }

        match result {
            Ok(value) => {
                print_value(&value);
                true
            }
            Err(error) => {
                print_error(text, &error);
                false
            }
        }
    }

    fn print_tokens(&self, text: &str) {
        // A lexical failure is reported by the evaluation that follows
        if let Ok(tokens) = tokenize(text) {
            for token in tokens {
                println!("{:>4}  {:?}", token.span.start(), token.value);
            }
        }
    }
}

fn print_value(value: &Value) {
    println!("= {}", value);
}

fn print_error(text: &str, error: &FormulaError) {
    if let Some(offset) = error.offset() {
        eprintln!("{}", text);
        eprintln!("{}", caret_line(offset));
    }
    eprintln!("{}", error);
}

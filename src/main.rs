use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use strata_catalog::FsCatalog;
use strata_config::{ChildKind, StackDef};
use strata_executor::{RecordingExecutor, SpoolExecutor, TaskExecutor};
use strata_registry::{
  ChainedRegistry, ChildRef, FsTemplateRegistry, TemplateManifest, TemplateRegistry, lock_child,
};
use strata_schema::Inputs;
use strata_stack::{StackResult, StackServices, TracingNotifier, compile, run_definition};
use strata_stacks::{Builtin, builtin_registry, builtins};

/// Strata - compose infrastructure automation stacks
#[derive(Parser)]
#[command(name = "strata")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.strata)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a stack
  Run {
    #[command(subcommand)]
    target: RunTarget,
  },

  /// Check a stack file without running it
  Validate {
    /// Path to the stack file (JSON)
    stack_file: PathBuf,
  },

  /// List the built-in stacks
  Builtins,

  /// Manage child templates in the data directory
  Templates {
    #[command(subcommand)]
    action: TemplateAction,
  },
}

#[derive(clap::Args)]
struct RunOptions {
  /// Input variable as key=value (repeatable)
  #[arg(long = "var", value_name = "KEY=VALUE")]
  vars: Vec<String>,

  /// Record submissions in memory and print them instead of spooling
  #[arg(long)]
  dry_run: bool,
}

#[derive(Subcommand)]
enum RunTarget {
  /// Run a stack definition file
  File {
    /// Path to the stack file (JSON)
    stack_file: PathBuf,

    #[command(flatten)]
    options: RunOptions,
  },

  /// Run a built-in stack
  Builtin {
    /// Built-in name, see `strata builtins`
    name: Builtin,

    #[command(flatten)]
    options: RunOptions,
  },
}

#[derive(Subcommand)]
enum TemplateAction {
  /// List installed and built-in templates
  List,

  /// Register a template reference
  Add {
    /// Reference, e.g. owner:::repo::name
    reference: String,

    #[arg(long, value_enum)]
    kind: KindArg,

    #[arg(long, default_value = "")]
    description: String,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
  Execgroup,
  Substack,
}

impl From<KindArg> for ChildKind {
  fn from(value: KindArg) -> Self {
    match value {
      KindArg::Execgroup => ChildKind::Execgroup,
      KindArg::Substack => ChildKind::Substack,
    }
  }
}

fn init_tracing() {
  let filter = EnvFilter::try_from_env("STRATA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".strata"),
  };

  debug!(data_dir = %data_dir.display(), "using data directory");

  let rt = tokio::runtime::Runtime::new()?;

  match cli.command {
    Some(Commands::Run { target }) => rt.block_on(run(target, &data_dir)),
    Some(Commands::Validate { stack_file }) => rt.block_on(validate(&stack_file, &data_dir)),
    Some(Commands::Builtins) => {
      for builtin in builtins() {
        println!("{:<20} {}", builtin.name(), builtin.description());
      }
      Ok(())
    }
    Some(Commands::Templates { action }) => rt.block_on(templates(action, &data_dir)),
    None => {
      println!("strata - use --help to see available commands");
      Ok(())
    }
  }
}

fn registry(data_dir: &Path) -> Result<Arc<dyn TemplateRegistry>> {
  let builtin = builtin_registry().context("failed to build built-in template registry")?;
  Ok(Arc::new(
    ChainedRegistry::new()
      .with(Arc::new(FsTemplateRegistry::new(data_dir.join("templates"))))
      .with(Arc::new(builtin)),
  ))
}

async fn run(target: RunTarget, data_dir: &Path) -> Result<()> {
  let (options, definition, builtin) = match target {
    RunTarget::File {
      stack_file,
      options,
    } => (options, Some(read_stack_file(&stack_file).await?), None),
    RunTarget::Builtin { name, options } => (options, None, Some(name)),
  };

  let inputs = read_inputs(&options.vars)?;
  eprintln!("Inputs: {}", inputs.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>().join(", "));

  let recorder = Arc::new(RecordingExecutor::new());
  let executor: Arc<dyn TaskExecutor> = if options.dry_run {
    recorder.clone()
  } else {
    Arc::new(SpoolExecutor::new(data_dir.join("spool")))
  };

  let services = StackServices::new(
    Arc::new(FsCatalog::new(data_dir.join("catalog"))),
    executor,
    registry(data_dir)?,
  )
  .with_notifier(Arc::new(TracingNotifier));

  let result: StackResult = match (definition, builtin) {
    (Some(def), _) => run_definition(&def, services, &inputs)
      .await
      .with_context(|| format!("stack '{}' failed", def.name))?,
    (None, Some(builtin)) => builtin
      .run(services, &inputs)
      .await
      .with_context(|| format!("builtin '{}' failed", builtin))?,
    (None, None) => bail!("nothing to run"),
  };

  eprintln!(
    "Stack {} completed: {} submission(s)",
    result.stack,
    result.submissions.len()
  );

  if options.dry_run {
    let output = json!({
      "result": result,
      "submissions": recorder.submissions(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
  } else {
    println!("{}", serde_json::to_string_pretty(&result)?);
  }

  Ok(())
}

async fn validate(stack_file: &Path, data_dir: &Path) -> Result<()> {
  let def = read_stack_file(stack_file).await?;
  let registry = registry(data_dir)?;

  let services = StackServices::new(
    Arc::new(FsCatalog::new(data_dir.join("catalog"))),
    Arc::new(RecordingExecutor::new()),
    registry.clone(),
  );
  compile(&def, services).with_context(|| format!("stack '{}' is invalid", def.name))?;

  for child in &def.children {
    let reference: ChildRef = child
      .reference
      .parse()
      .with_context(|| format!("invalid reference '{}'", child.reference))?;
    lock_child(registry.as_ref(), &reference, child.kind)
      .await
      .with_context(|| format!("child '{}' cannot be resolved", child.reference))?;
  }

  eprintln!(
    "Stack {} is valid: {} variable(s), {} child(ren)",
    def.name,
    def.variables.len(),
    def.children.len()
  );
  Ok(())
}

async fn templates(action: TemplateAction, data_dir: &Path) -> Result<()> {
  match action {
    TemplateAction::List => {
      for manifest in registry(data_dir)?.list().await? {
        println!("{:<10} {}", manifest.kind.to_string(), manifest.reference);
      }
    }
    TemplateAction::Add {
      reference,
      kind,
      description,
    } => {
      let reference: ChildRef = reference
        .parse()
        .with_context(|| format!("invalid reference '{}'", reference))?;
      let manifest = TemplateManifest::new(reference, kind.into()).with_description(description);
      let path = FsTemplateRegistry::new(data_dir.join("templates"))
        .install(&manifest)
        .await
        .context("failed to install template")?;
      eprintln!("Installed {} at {}", manifest.reference, path.display());
    }
  }
  Ok(())
}

async fn read_stack_file(path: &Path) -> Result<StackDef> {
  let content = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read stack file: {}", path.display()))?;

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse stack file: {}", path.display()))
}

/// Inputs from a JSON object on stdin, overridden by `--var` assignments.
fn read_inputs(vars: &[String]) -> Result<Inputs> {
  let mut inputs = if io::stdin().is_terminal() {
    Inputs::new()
  } else {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read inputs from stdin")?;

    if input.trim().is_empty() {
      Inputs::new()
    } else {
      let value = serde_json::from_str(&input).context("failed to parse inputs JSON from stdin")?;
      Inputs::from_json(value).context("invalid inputs on stdin")?
    }
  };

  for assignment in vars {
    inputs
      .parse_assignment(assignment)
      .with_context(|| format!("invalid --var '{}'", assignment))?;
  }

  Ok(inputs)
}

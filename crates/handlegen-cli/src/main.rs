use std::{fs, path::PathBuf};

use anyhow::{Context as _, anyhow};
use clap::Parser;
use handlegen_codegen::{Config, ErrorPolicy};
use tracing::info;
use tracing_subscriber::{EnvFilter, prelude::*};

/// Generate safe wrappers from a JSON descriptor file.
#[derive(Parser, Debug)]
struct Args {
    /// The descriptor file.
    descriptors: PathBuf,
    /// Where to write the generated Rust code.
    output: PathBuf,
    /// How wrappers handle failed native calls: `assert`,
    /// `fail` or `conditional`.
    #[arg(long, short, default_value_t = ErrorPolicy::Conditional)]
    policy: ErrorPolicy,
    /// Prefix for operation names in errors.
    #[arg(long, short, default_value = "")]
    namespace: String,
    /// Path to `handlegen_core` in the generated code.
    #[arg(long, default_value = "::handlegen_core")]
    core: String,
    /// The native result code type.
    #[arg(long, default_value = "crate::Result")]
    result_ty: String,
    /// Dispatch object types. May be repeated.
    #[arg(long = "dispatch", short)]
    dispatch: Vec<String>,
    /// Suppress trace output.
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if !args.quiet {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(EnvFilter::from_env("HANDLEGEN_LOG"))
            .init();
    }

    let mut cfg = Config::new(
        args.namespace,
        syn::parse_str(&args.result_ty)
            .with_context(|| format!("invalid `--result-ty`: `{}`", args.result_ty))?,
    );
    cfg.policy = args.policy;
    cfg.core = syn::parse_str(&args.core)
        .with_context(|| format!("invalid `--core`: `{}`", args.core))?;
    for ty in &args.dispatch {
        let path = syn::parse_str(ty).with_context(|| format!("invalid `--dispatch`: `{ty}`"))?;
        cfg.dispatch.register(path);
    }

    let tokens = cfg.generate_file(&args.descriptors).map_err(|err| {
        err.display();
        anyhow!(
            "unable to generate wrappers from `{}`",
            args.descriptors.display()
        )
    })?;
    let code = handlegen_codegen::format(&tokens);
    fs::write(&args.output, code)
        .with_context(|| format!("unable to write `{}`", args.output.display()))?;

    info!(output = %args.output.display(), policy = %cfg.policy, "wrote wrappers");
    Ok(())
}

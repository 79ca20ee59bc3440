use std::{env, fs, path::Path};

use anyhow::{Context as _, anyhow};
use handlegen_codegen::{Config, ErrorPolicy};
use syn::parse_quote;
use tracing_subscriber::{EnvFilter, prelude::*};

fn main() -> anyhow::Result<()> {
    let appender = tracing_appender::rolling::hourly("/tmp/handlegen-codegen-test", "build.log");
    let layer = tracing_subscriber::fmt::layer().with_writer(appender);
    tracing_subscriber::registry()
        .with(layer)
        .with(EnvFilter::from_env("HANDLEGEN_CODEGEN_TEST"))
        .init();

    let in_path = Path::new("descriptors.json");
    println!("cargo:rerun-if-changed={}", in_path.display());
    let json = fs::read_to_string(in_path)
        .with_context(|| format!("unable to read file `{}`", in_path.display()))?;

    let out_dir = env::var("OUT_DIR")?;
    for (policy, file) in [
        (ErrorPolicy::AssertOnly, "assert_only.rs"),
        (ErrorPolicy::AlwaysFail, "always_fail.rs"),
        (ErrorPolicy::Conditional, "conditional.rs"),
    ] {
        let mut cfg = Config::new("mock", parse_quote!(XrResult));
        cfg.policy = policy;
        cfg.dispatch.register(parse_quote!(MockRuntime));

        let tokens = cfg.generate_json(&json).map_err(|err| {
            err.display();
            anyhow!("unable to generate `{file}` from `{}`", in_path.display())
        })?;
        let data = handlegen_codegen::format(&tokens);
        fs::write(Path::new(&out_dir).join(file), &data)?;
        tracing::info!(file, %policy, "generated wrappers");
    }
    Ok(())
}

//! Builds the documentation site from a directory of package manifests.
//!
//! Renders `index.md`, one `<name>.md` per package, and `index.json` for the
//! client-side search command, then swaps the finished set into the output
//! directory. Warnings go to stderr; a fatal error leaves any previous output
//! untouched.

use anyhow::{Result, bail};
use pkgdocs::{BuildOptions, IssuePolicy, build_site};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_args()?;
    let out_dir = options.out_dir.clone();
    let report = build_site(&options)?;
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    println!(
        "rendered {} pages for {} packages into {}",
        report.pages_written,
        report.packages,
        out_dir.display()
    );
    Ok(())
}

fn parse_args() -> Result<BuildOptions> {
    let mut args = env::args_os().skip(1);
    let mut positionals: Vec<PathBuf> = Vec::new();
    let mut schema_path: Option<PathBuf> = None;
    let mut platform_policy = IssuePolicy::Warn;
    let mut dependency_policy: Option<IssuePolicy> = None;
    let mut publish_manifests = false;

    while let Some(arg_os) = args.next() {
        let arg = arg_os
            .into_string()
            .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
        match arg.as_str() {
            "--strict-platforms" => platform_policy = IssuePolicy::Fail,
            "--strict-deps" => {
                if dependency_policy.is_some() {
                    bail!("--strict-deps and --warn-deps may only be provided once");
                }
                dependency_policy = Some(IssuePolicy::Fail);
            }
            "--warn-deps" => {
                if dependency_policy.is_some() {
                    bail!("--strict-deps and --warn-deps may only be provided once");
                }
                dependency_policy = Some(IssuePolicy::Warn);
            }
            "--publish-manifests" => publish_manifests = true,
            "--schema" => {
                let value = next_value(&mut args, "--schema")?;
                if schema_path.is_some() {
                    bail!("--schema may only be provided once");
                }
                schema_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                print!("{}", usage());
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("unknown flag: {other}"),
            _ => positionals.push(PathBuf::from(arg)),
        }
    }

    if positionals.len() != 2 {
        bail!(
            "expected MANIFEST_DIR and OUT_DIR, got {} positional arguments\n\n{}",
            positionals.len(),
            usage()
        );
    }
    let out_dir = positionals.pop().unwrap_or_default();
    let manifest_dir = positionals.pop().unwrap_or_default();

    let mut options = BuildOptions::new(manifest_dir, out_dir);
    options.schema_path = schema_path;
    options.platform_policy = platform_policy;
    options.dependency_policy = dependency_policy.unwrap_or(IssuePolicy::Ignore);
    options.publish_manifests = publish_manifests;
    Ok(options)
}

fn next_value(args: &mut impl Iterator<Item = std::ffi::OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow::anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: site-build [--strict-platforms] [--strict-deps|--warn-deps] [--publish-manifests] [--schema PATH] MANIFEST_DIR OUT_DIR\n\
Renders every manifest in MANIFEST_DIR into a documentation page set at OUT_DIR.\n\
  --strict-platforms   treat sha256/url platform mismatches as fatal (default: warn)\n\
  --strict-deps        treat dependencies with no manifest in the set as fatal (default: allow)\n\
  --warn-deps          report unresolved dependencies without failing\n\
  --publish-manifests  copy each manifest into the output as <name>.json\n\
  --schema PATH        validate manifests against PATH instead of the bundled schema\n"
}

use react_agentic::bundler::{BundleEntry, Bundler};
use react_agentic::config::Config;
use react_agentic::driver::{compile_workspace, FileBuildStatus};
use react_agentic::error::CompileError;

/// Stand-in bundler for demo purposes: the real bundler is an external
/// JavaScript tool the embedding host supplies.
struct EchoBundler;

impl Bundler for EchoBundler {
    fn bundle(&self, entries: &[BundleEntry]) -> Result<String, CompileError> {
        let mut out = String::from("// generated runtime dispatch module\n");
        for entry in entries {
            out.push_str(&format!(
                "// {} -> {} ({:?})\n",
                entry.namespace,
                entry.source_path.display(),
                entry.exported_functions
            ));
        }
        Ok(out)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir().expect("tempdir");
    let command_path = dir.path().join("deploy.tsx");
    std::fs::write(
        &command_path,
        r#"export default (
  <Command name="deploy" description="Deploy the current branch">
    <p>Run the deploy script.</p>
    <ReadFile path="./scripts/deploy.sh" />
  </Command>
)"#,
    )
    .expect("write fixture");

    let config = Config::default();
    let outcome = compile_workspace(&[command_path], dir.path(), &config, &EchoBundler)
        .expect("config should validate");

    println!("compiled {} of {} files", outcome.succeeded, outcome.total);
    for (path, result) in &outcome.files {
        match result.status {
            FileBuildStatus::Success => {
                println!("ok: {}", path.display());
                for output in &result.output_paths {
                    println!("  -> {}", dir.path().join(output).display());
                }
            }
            FileBuildStatus::Failed => {
                println!("failed: {}\n{}", path.display(), result.error.as_deref().unwrap_or(""));
            }
        }
    }

    let written = dir.path().join(".claude/commands/deploy.md");
    if let Ok(content) = std::fs::read_to_string(&written) {
        println!("\n--- .claude/commands/deploy.md ---\n{content}");
    }
}

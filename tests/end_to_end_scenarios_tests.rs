//! End-to-end scenario tests driving the public `driver::compile_workspace`
//! entry point against full TSX fixtures.

use std::path::PathBuf;

use react_agentic::bundler::{BundleEntry, Bundler};
use react_agentic::config::Config;
use react_agentic::driver::{compile_workspace, FileBuildStatus};
use react_agentic::error::CompileError;

struct NoopBundler;
impl Bundler for NoopBundler {
    fn bundle(&self, entries: &[BundleEntry]) -> Result<String, CompileError> {
        Ok(entries.iter().map(|e| e.namespace.clone()).collect::<Vec<_>>().join("\n"))
    }
}

fn write(dir: &std::path::Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn s1_minimal_command_emits_exact_frontmatter_and_body() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "hello.tsx",
        r#"export default (<Command name="hello" description="say hi"><p>Hi.</p></Command>)"#,
    );

    let outcome = compile_workspace(&[input], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert!(outcome.is_all_success());

    let content = std::fs::read_to_string(dir.path().join(".claude/commands/hello.md")).unwrap();
    assert_eq!(content, "---\nname: hello\ndescription: say hi\n---\n\nHi.\n");
}

#[test]
fn s2_anchor_without_href_is_rejected_with_location() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "bad.tsx",
        r#"export default (<Command name="bad" description="d"><p><a>click</a></p></Command>)"#,
    );

    let outcome = compile_workspace(&[input.clone()], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert_eq!(outcome.succeeded, 0);
    assert_eq!(outcome.failed, 1);
    let result = &outcome.files[&input];
    assert_eq!(result.status, FileBuildStatus::Failed);
    assert!(result.error.as_ref().unwrap().contains("Missing required prop 'href'"));
}

#[test]
fn s3_on_status_default_pairs_with_preceding_on_status() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "status.tsx",
        r#"export default (
  <Command name="status" description="d">
    <OnStatus output={out} status="SUCCESS"><p>ok</p></OnStatus>
    <OnStatusDefault><p>fallback</p></OnStatusDefault>
  </Command>
)"#,
    );

    let outcome = compile_workspace(&[input], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert!(outcome.is_all_success());

    let content = std::fs::read_to_string(dir.path().join(".claude/commands/status.md")).unwrap();
    assert!(content.contains("**On SUCCESS:**\n\nok\n\n**On any other status:**\n\nfallback"));
}

#[test]
fn s3_leading_on_status_default_without_preceding_pair_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "status_bad.tsx",
        r#"export default (
  <Command name="status" description="d">
    <OnStatusDefault><p>fallback</p></OnStatusDefault>
  </Command>
)"#,
    );

    let outcome = compile_workspace(&[input], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert_eq!(outcome.failed, 1);
}

#[test]
fn s4_runtime_var_interpolation_resolves_through_declared_type() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "phase.tsx",
        r#"
import { useRuntimeVar } from "react-agentic";
const ctx = useRuntimeVar<{phase:{id:string}}>("CTX");
export default (<Command name="phase" description="d"><p>Phase {ctx.phase.id}</p></Command>)
"#,
    );

    let outcome = compile_workspace(&[input], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert!(outcome.is_all_success());

    let content = std::fs::read_to_string(dir.path().join(".claude/commands/phase.md")).unwrap();
    assert!(content.contains("Phase $CTX.phase.id"));
}

#[test]
fn s4_runtime_var_interpolation_of_undeclared_field_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "phase_bad.tsx",
        r#"
import { useRuntimeVar } from "react-agentic";
const ctx = useRuntimeVar<{phase:{id:string}}>("CTX");
export default (<Command name="phase" description="d"><p>Phase {ctx.phase.missing}</p></Command>)
"#,
    );

    let outcome = compile_workspace(&[input.clone()], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert_eq!(outcome.failed, 1);
    let result = &outcome.files[&input];
    assert_eq!(result.status, FileBuildStatus::Failed);
    assert!(result.error.as_ref().unwrap().contains("missing"));
}

#[test]
fn s5_spawn_agent_with_read_agent_file_prepends_instructions() {
    std::env::set_var("HOME", "/home/tester");
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "research.tsx",
        r#"export default (
  <Command name="research" description="d">
    <SpawnAgent agent="researcher" model="sonnet" description="Research" readAgentFile prompt="Do X"/>
  </Command>
)"#,
    );

    let outcome = compile_workspace(&[input], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert!(outcome.is_all_success());

    let content = std::fs::read_to_string(dir.path().join(".claude/commands/research.md")).unwrap();
    assert!(content.contains(
        "Task(prompt=\"First, read /home/tester/.claude/agents/researcher.md for your role and instructions.\\n\\nDo X"
    ));
    assert!(content.contains("subagent_type=\"researcher\""));
}

#[test]
fn s6_skill_emits_skill_md_file_and_copies_static() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "scripts/deploy.sh", "#!/bin/sh\necho deploying\n");
    let input = write(
        dir.path(),
        "deploy.tsx",
        r#"export default (
  <Skill name="deploy" description="Deploy the app" disableModelInvocation allowedTools={["Bash"]}>
    <p>Deployment steps.</p>
    <SkillFile name="reference.md"><p>Reference content.</p></SkillFile>
    <SkillStatic src="scripts/deploy.sh"/>
  </Skill>
)"#,
    );

    let outcome = compile_workspace(&[input], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert!(outcome.is_all_success());

    let skill_md = std::fs::read_to_string(dir.path().join(".claude/skills/deploy/SKILL.md")).unwrap();
    assert!(skill_md.contains("disable-model-invocation: true"));
    assert!(skill_md.contains("allowed-tools:"));

    let reference = std::fs::read_to_string(dir.path().join(".claude/skills/deploy/reference.md")).unwrap();
    assert!(reference.contains("Reference content."));

    let copied = std::fs::read_to_string(dir.path().join(".claude/skills/deploy/scripts/deploy.sh")).unwrap();
    assert_eq!(copied, "#!/bin/sh\necho deploying\n");
}

#[test]
fn break_outside_loop_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "break_bad.tsx",
        r#"
import { useRuntimeVar } from "react-agentic";
const ctx = useRuntimeVar<{ok:boolean}>("CTX");
export default (<Command name="bad" description="d"><Break/></Command>)
"#,
    );

    let outcome = compile_workspace(&[input.clone()], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert_eq!(outcome.failed, 1);
    let result = &outcome.files[&input];
    assert!(result.error.as_ref().unwrap().contains("`Break` used outside a `Loop`"));
}

#[test]
fn break_inside_loop_renders() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "break_good.tsx",
        r#"
import { useRuntimeVar } from "react-agentic";
const ctx = useRuntimeVar<{ok:boolean}>("CTX");
export default (
  <Command name="good" description="d">
    <Loop times={3}><Break message="done"/></Loop>
  </Command>
)
"#,
    );

    let outcome = compile_workspace(&[input], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert!(outcome.is_all_success());
    let content = std::fs::read_to_string(dir.path().join(".claude/commands/good.md")).unwrap();
    assert!(content.contains("**Break loop:** done"));
}

#[test]
fn bare_br_as_direct_block_child_compiles() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "br.tsx",
        r#"export default (<Command name="br" description="d"><p>one</p><br/><p>two</p></Command>)"#,
    );

    let outcome = compile_workspace(&[input], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert!(outcome.is_all_success());
}

#[test]
fn undeclared_spawn_agent_input_field_surfaces_as_warning_not_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "agent.tsx",
        r#"export default (<Agent name="researcher" description="d"><p>x</p></Agent>)"#,
    );
    write(
        dir.path(),
        "types.ts",
        r#"export interface ResearchInput { topic: string; }"#,
    );
    let command = write(
        dir.path(),
        "research.tsx",
        r#"
import { ResearchInput } from "./types";
export default (
  <Command name="research" description="d">
    <SpawnAgent<ResearchInput> agent="researcher" description="Research" input={{topic: "x", extra: "y"}}/>
  </Command>
)"#,
    );

    let outcome = compile_workspace(&[input, command.clone()], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert!(outcome.is_all_success());
    let result = &outcome.files[&command];
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("'extra'"));
}

#[test]
fn multi_file_build_recovers_from_one_failure() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write(dir.path(), "bad.tsx", r#"export default (<Unrecognized/>)"#);
    let good = write(
        dir.path(),
        "good.tsx",
        r#"export default (<Command name="good" description="d"><p>x</p></Command>)"#,
    );

    let outcome = compile_workspace(&[bad, good], dir.path(), &Config::default(), &NoopBundler).unwrap();
    assert_eq!(outcome.total, 2);
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.failed, 1);
    assert!(!outcome.is_all_success());
    assert!(!outcome.is_complete_failure());
}

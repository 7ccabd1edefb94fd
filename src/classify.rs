//! Document classifier (§4.2): chooses the downstream transformer/emitter
//! pair from the root element's tag and the file's imports.

use crate::ast::ParsedFile;
use crate::error::CompileError;

/// Which pipeline a source file compiles through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// A `Command` root using `useRuntimeVar`/`runtimeFn` — the V3 pipeline.
    RuntimeCommand,
    /// A `Command` root with no runtime-variable/function imports — V1.
    Command,
    /// An `Agent` root — V1 agent path.
    Agent,
    /// A `Skill` root — V1 skill path.
    Skill,
}

/// Classifies `parsed` per §4.2's rule.
pub fn classify(parsed: &ParsedFile) -> Result<Classification, CompileError> {
    let root = parsed.root.as_ref().ok_or_else(|| CompileError::ParseError {
        message: "no JSX reachable from `export default`".to_string(),
        location: parsed.location_at(0),
    })?;

    let imports_runtime = parsed
        .imported_names
        .iter()
        .any(|name| name == "useRuntimeVar" || name == "runtimeFn");

    match root.tag.as_str() {
        "Command" if imports_runtime => Ok(Classification::RuntimeCommand),
        "Command" => Ok(Classification::Command),
        "Agent" => Ok(Classification::Agent),
        "Skill" => Ok(Classification::Skill),
        other => Err(CompileError::MissingRequiredProp {
            tag: other.to_string(),
            prop: "a recognized root tag (Command, Agent, or Skill)".to_string(),
            location: parsed.location_at(root.offset),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_file;
    use std::path::Path;

    #[test]
    fn classifies_plain_command() {
        let source = r#"export default (<Command name="hello" description="hi"><p>Hi.</p></Command>)"#;
        let parsed = parse_file(Path::new("cmd.tsx"), source).unwrap();
        assert_eq!(classify(&parsed).unwrap(), Classification::Command);
    }

    #[test]
    fn classifies_runtime_command_when_useruntimevar_imported() {
        let source = r#"
import { useRuntimeVar } from "react-agentic";
const ctx = useRuntimeVar<{phase:{id:string}}>("CTX");
export default (<Command name="hello" description="hi"><p>Phase {ctx.phase.id}</p></Command>)
"#;
        let parsed = parse_file(Path::new("cmd.tsx"), source).unwrap();
        assert_eq!(classify(&parsed).unwrap(), Classification::RuntimeCommand);
    }

    #[test]
    fn classifies_agent_and_skill() {
        let agent_src = r#"export default (<Agent name="researcher" description="Research"><p>x</p></Agent>)"#;
        let parsed = parse_file(Path::new("agent.tsx"), agent_src).unwrap();
        assert_eq!(classify(&parsed).unwrap(), Classification::Agent);

        let skill_src = r#"export default (<Skill name="deploy" description="Deploy"><p>x</p></Skill>)"#;
        let parsed = parse_file(Path::new("skill.tsx"), skill_src).unwrap();
        assert_eq!(classify(&parsed).unwrap(), Classification::Skill);
    }
}

//! Shared Markdown rendering helpers (§4.6, §4.7): implements the full
//! block/inline grammar once; V1 documents simply never contain the
//! runtime-only node kinds (`Call`, `If`/`Else`, `Loop`, `Break`, `Return`,
//! `AskUser`'s variable capture), since the V1 transformer only reaches them
//! when a condition is a plain literal.
//!
//! Nested-list indentation width (Open Question 1) is fixed at two spaces
//! per level, applied consistently; see DESIGN.md.

use crate::config::Config;
use crate::ir::{Block, Condition, InputField, InputValue, Inline, RuntimeVarRef};

const LIST_INDENT: &str = "  ";

/// Renders a full document body (root block children) to Markdown.
pub fn render_blocks(blocks: &[Block], config: &Config) -> String {
    let rendered: Vec<String> = blocks
        .iter()
        .map(|b| render_block(b, 0, config))
        .filter(|s| !s.is_empty())
        .collect();
    let mut out = rendered.join("\n\n");
    out = out.trim_end().to_string();
    out.push('\n');
    out
}

fn indent(depth: usize) -> String {
    LIST_INDENT.repeat(depth)
}

fn render_block(block: &Block, depth: usize, config: &Config) -> String {
    let pad = indent(depth);
    match block {
        Block::Heading { level, children } => {
            let level = (*level).clamp(1, 6);
            format!("{}{} {}", pad, "#".repeat(level as usize), render_inlines(children))
        }
        Block::Paragraph(children) => format!("{pad}{}", render_inlines(children)),
        Block::List { ordered, start, items } => render_list(*ordered, *start, items, depth, config),
        Block::ListItem(children) => render_blocks_joined(children, depth, config),
        Block::Blockquote(children) => render_blocks(children, config)
            .lines()
            .map(|line| format!("{pad}> {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::CodeBlock { lang, code } => {
            let lang = lang.as_deref().unwrap_or("");
            format!("{pad}```{lang}\n{code}\n{pad}```")
        }
        Block::ThematicBreak => format!("{pad}---"),
        Block::Table { header, rows } => render_table(header, rows, &pad),
        Block::Indent(children) => render_blocks(children, config)
            .lines()
            .map(|line| format!("{LIST_INDENT}{line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::XmlBlock(raw) => format!("{pad}{raw}"),
        Block::ExecutionContext(children) => render_blocks(children, config),
        Block::Step(children) => render_blocks(children, config),
        Block::RawMarkdown(raw) => format!("{pad}{raw}"),
        Block::ReadFile { path, as_var, optional } => render_read_file(path, as_var, *optional, &pad),
        Block::SpawnAgent {
            agent,
            description,
            model,
            prompt,
            read_agent_file,
            ..
        } => render_spawn_agent(agent, description, model.as_deref(), prompt, *read_agent_file, config, &pad),
        Block::OnStatus { status, children, .. } => {
            format!("{pad}**On {status}:**\n\n{}", render_blocks(children, config))
        }
        Block::OnStatusDefault { children, .. } => {
            format!("{pad}**On any other status:**\n\n{}", render_blocks(children, config))
        }
        Block::AskUser { question, options, header, description, output_var } => {
            render_ask_user(question, options, header.as_deref(), description.as_deref(), output_var, &pad)
        }
        Block::If { condition, children } => {
            format!("{pad}**If {}:**\n\n{}", render_condition(condition), render_blocks(children, config))
        }
        Block::Else { children } => {
            format!("{pad}**Otherwise:**\n\n{}", render_blocks(children, config))
        }
        Block::Loop { max_iterations, counter_var, children } => format!(
            "{pad}**Loop up to {max_iterations} times (counter: ${counter_var}):**\n\n{}",
            render_blocks(children, config)
        ),
        Block::Break { message } => match message {
            Some(msg) => format!("{pad}**Break loop:** {msg}"),
            None => format!("{pad}**Break loop**"),
        },
        Block::Return { status, message } => render_return(status.as_deref(), message.as_deref(), &pad),
        Block::Call { namespace, function, args, output_var } => {
            render_call(namespace, function, args, output_var.as_deref(), config, &pad)
        }
    }
}

fn render_blocks_joined(blocks: &[Block], depth: usize, config: &Config) -> String {
    blocks
        .iter()
        .map(|b| render_block(b, depth, config))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_list(ordered: bool, start: u32, items: &[Block], depth: usize, config: &Config) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let marker = if ordered { format!("{}.", start as usize + i) } else { "-".to_string() };
            let body = render_block(item, depth + 1, config);
            let trimmed = body.trim_start();
            format!("{}{marker} {trimmed}", indent(depth))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_table(header: &[Vec<Inline>], rows: &[Vec<Vec<Inline>>], pad: &str) -> String {
    let mut lines = Vec::new();
    if !header.is_empty() {
        let cells: Vec<String> = header.iter().map(|c| render_inlines(c)).collect();
        lines.push(format!("{pad}| {} |", cells.join(" | ")));
        lines.push(format!("{pad}|{}|", vec![" --- "; header.len()].join("|")));
    }
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| render_inlines(c)).collect();
        lines.push(format!("{pad}| {} |", cells.join(" | ")));
    }
    lines.join("\n")
}

fn render_read_file(path: &str, as_var: &str, optional: bool, pad: &str) -> String {
    let quoted = quote_shell_path(path);
    if optional {
        format!("{pad}```bash\n{as_var}=$(cat {quoted} 2>/dev/null)\n{pad}```")
    } else {
        format!("{pad}```bash\n{as_var}=$(cat {quoted})\n{pad}```")
    }
}

fn quote_shell_path(path: &str) -> String {
    if path.contains('$') || path.contains(' ') {
        format!("\"{path}\"")
    } else {
        path.to_string()
    }
}

fn render_spawn_agent(
    agent: &str,
    description: &str,
    model: Option<&str>,
    prompt: &str,
    read_agent_file: bool,
    config: &Config,
    pad: &str,
) -> String {
    let mut full_prompt = String::new();
    if read_agent_file {
        let agent_path = config.agents_dir_expanded().join(format!("{agent}.md"));
        full_prompt.push_str(&format!(
            "First, read {} for your role and instructions.\\n\\n",
            agent_path.display()
        ));
    }
    full_prompt.push_str(&escape_task_arg(prompt));

    let model_part = model
        .map(|m| format!(", model=\"{}\"", escape_task_arg(m)))
        .unwrap_or_default();

    format!(
        "{pad}Task(prompt=\"{full_prompt}\", subagent_type=\"{agent}\"{model_part}, description=\"{}\")",
        escape_task_arg(description)
    )
}

fn escape_task_arg(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn render_ask_user(
    question: &str,
    options: &[String],
    header: Option<&str>,
    description: Option<&str>,
    output_var: &str,
    pad: &str,
) -> String {
    let options_text = options
        .iter()
        .map(|o| format!("\"{}\"", escape_task_arg(o)))
        .collect::<Vec<_>>()
        .join(", ");
    let mut call = format!(
        "{pad}AskUserQuestion(question=\"{}\", options=[{options_text}]",
        escape_task_arg(question)
    );
    if let Some(header) = header {
        call.push_str(&format!(", header=\"{}\"", escape_task_arg(header)));
    }
    if let Some(description) = description {
        call.push_str(&format!(", description=\"{}\"", escape_task_arg(description)));
    }
    call.push(')');
    format!("{call} -> ${output_var}")
}

fn render_return(status: Option<&str>, message: Option<&str>, pad: &str) -> String {
    let mut out = format!("{pad}**End command**");
    if let Some(status) = status {
        out.push_str(&format!(" ({status})"));
    }
    if let Some(message) = message {
        out.push_str(&format!(": {message}"));
    }
    out
}

fn render_call(
    namespace: &str,
    function: &str,
    args: &[InputField],
    output_var: Option<&str>,
    config: &Config,
    pad: &str,
) -> String {
    let json_args = render_args_json(args);
    let runtime_path = config.runtime_dir.join("runtime.js");
    let var = output_var.unwrap_or("_RESULT");
    format!(
        "{pad}```bash\n{var}=$(node {} {namespace}.{function} '{json_args}')\n{pad}```",
        runtime_path.display()
    )
}

fn render_args_json(args: &[InputField]) -> String {
    let fields: Vec<String> = args
        .iter()
        .map(|f| format!("\"{}\":{}", f.name, render_input_value(&f.value)))
        .collect();
    format!("{{{}}}", fields.join(","))
}

fn render_input_value(value: &InputValue) -> String {
    match value {
        InputValue::String(s) => format!("\"{s}\""),
        InputValue::Number(n) => n.to_string(),
        InputValue::Bool(b) => b.to_string(),
        InputValue::RuntimeVar(var_ref) => format!("\"{}\"", render_var_ref(var_ref)),
    }
}

fn render_condition(condition: &Condition) -> String {
    match condition {
        Condition::Literal(b) => b.to_string(),
        Condition::Ref(r) => render_var_ref(r),
        Condition::Eq { left, right } => format!("{} = \"{right}\"", render_var_ref(left)),
        Condition::Not(inner) => format!("not {}", render_condition(inner)),
        Condition::And(items) => render_conjunction(items, "and"),
        Condition::Or(items) => render_conjunction(items, "or"),
    }
}

fn render_conjunction(items: &[Condition], op: &str) -> String {
    let rendered: Vec<String> = items.iter().map(render_condition).collect();
    match rendered.as_slice() {
        [] => "true".to_string(),
        [only] => only.clone(),
        _ => format!("({})", rendered.join(&format!(" {op} "))),
    }
}

fn render_var_ref(var_ref: &RuntimeVarRef) -> String {
    if var_ref.path.is_empty() {
        format!("${}", var_ref.var_name)
    } else {
        let mut out = format!("${}", var_ref.var_name);
        for step in &var_ref.path {
            if step.chars().all(|c| c.is_ascii_digit()) {
                out.push_str(&format!("[{step}]"));
            } else {
                out.push_str(&format!(".{step}"));
            }
        }
        out
    }
}

/// Renders inline content (§4.6: inline code wins over emphasis; that
/// precedence is applied upstream during transform, not here).
pub fn render_inlines(inlines: &[Inline]) -> String {
    inlines.iter().map(render_inline).collect::<Vec<_>>().join("")
}

fn render_inline(inline: &Inline) -> String {
    match inline {
        Inline::Text(text) => text.clone(),
        Inline::Bold(children) => format!("**{}**", render_inlines(children)),
        Inline::Italic(children) => format!("*{}*", render_inlines(children)),
        Inline::InlineCode(code) => format!("`{code}`"),
        Inline::Link { text, href } => format!("[{}]({href})", render_inlines(text)),
        Inline::LineBreak => "\n".to_string(),
        Inline::RuntimeVarInterpolation(var_ref) => render_var_ref(var_ref),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_minimal_paragraph() {
        let blocks = vec![Block::Paragraph(vec![Inline::Text("Hi.".to_string())])];
        assert_eq!(render_blocks(&blocks, &Config::default()), "Hi.\n");
    }

    #[test]
    fn renders_on_status_pairing() {
        let blocks = vec![
            Block::OnStatus {
                output_ref: "out".to_string(),
                status: "SUCCESS".to_string(),
                children: vec![Block::Paragraph(vec![Inline::Text("ok".to_string())])],
            },
            Block::OnStatusDefault {
                output_ref: "out".to_string(),
                children: vec![Block::Paragraph(vec![Inline::Text("fallback".to_string())])],
            },
        ];
        let rendered = render_blocks(&blocks, &Config::default());
        assert!(rendered.contains("**On SUCCESS:**"));
        assert!(rendered.contains("**On any other status:**"));
        assert!(rendered.contains("ok"));
        assert!(rendered.contains("fallback"));
    }

    #[test]
    fn renders_runtime_var_interpolation() {
        let reference = RuntimeVarRef { var_name: "CTX".to_string(), path: vec!["phase".to_string(), "id".to_string()] };
        let inlines = vec![Inline::Text("Phase ".to_string()), Inline::RuntimeVarInterpolation(reference)];
        assert_eq!(render_inlines(&inlines), "Phase $CTX.phase.id");
    }

    #[test]
    fn spawn_agent_with_read_agent_file_prepends_instructions() {
        std::env::set_var("HOME", "/home/tester");
        let config = Config::default();
        let rendered = render_spawn_agent(
            "researcher",
            "Research",
            Some("sonnet"),
            "Do X",
            true,
            &config,
            "",
        );
        assert!(rendered.starts_with(
            "Task(prompt=\"First, read /home/tester/.claude/agents/researcher.md for your role and instructions.\\n\\nDo X\""
        ));
        assert!(rendered.contains("subagent_type=\"researcher\""));
    }
}

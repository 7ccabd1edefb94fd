//! Typed intermediate representation for Command, Agent, and Skill documents.
//!
//! The IR is a discriminated tree: every node is tagged by its Rust variant
//! (no dynamic dispatch, no inheritance — composite JSX wrappers are inlined
//! by the transformer and never reach this layer). Nodes own their children
//! by value; the only cross-references are by name (`runtimeVarRef`,
//! `outputRef`), resolved by the emitter/transformer via a pass-1 table
//! lookup rather than a pointer.

use serde::Serialize;

/// Frontmatter for a `Command` document.
#[derive(Clone, Debug, Serialize, Default, PartialEq)]
pub struct CommandMeta {
    /// Command name; becomes the output file stem.
    pub name: String,
    /// One-line description shown to the host AI system.
    pub description: String,
    /// Optional argument hint shown in command help.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argument_hint: Option<String>,
    /// Optional default agent for this command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Optional allowed-tools list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    /// Optional subdirectory under the commands output root.
    #[serde(skip)]
    pub folder: Option<String>,
}

/// Frontmatter for an `Agent` document.
///
/// `input_type`/`output_type` are opaque type references used only for
/// cross-file interface checking; they are never emitted into YAML.
#[derive(Clone, Debug, Serialize, Default, PartialEq)]
pub struct AgentMeta {
    /// Agent name; becomes the output file stem.
    pub name: String,
    /// One-line description shown to the host AI system.
    pub description: String,
    /// Optional allowed-tools list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    /// Optional UI color hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Opaque input-interface type name, not emitted.
    #[serde(skip)]
    pub input_type: Option<String>,
    /// Opaque output-interface type name, not emitted.
    #[serde(skip)]
    pub output_type: Option<String>,
}

/// Frontmatter for a `Skill` document. Keys are kebab-case in the emitted
/// YAML; field names here are camelCase per Rust convention and mapped by
/// [`crate::frontmatter`].
#[derive(Clone, Debug, Serialize, Default, PartialEq)]
pub struct SkillMeta {
    /// Skill name; becomes the output directory name.
    pub name: String,
    /// One-line description shown to the host AI system.
    pub description: String,
    /// Whether the host AI system may invoke this skill automatically.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_model_invocation: Option<bool>,
    /// Whether a human user may invoke this skill directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_invocable: Option<bool>,
    /// Optional allowed-tools list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    /// Optional argument hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argument_hint: Option<String>,
    /// Optional model override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Optional free-form context string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Optional default agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

/// A declared runtime variable: `const x = useRuntimeVar<T>("X")`.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeVarDecl {
    /// The shell-variable name (upper-cased identifier), e.g. `"CTX"`.
    pub var_name: String,
    /// The opaque TypeScript type text annotated on the declaration.
    pub ts_type: String,
}

/// A reference to a declared runtime variable, optionally indexed/member'd.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeVarRef {
    /// The referenced declaration's shell-variable name.
    pub var_name: String,
    /// Member/index path steps, in textual order (`phase`, `id`, `0`, ...).
    pub path: Vec<String>,
}

/// The boolean condition ADT used by `If`/`Loop` headers in the runtime pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// A literal `true`/`false`.
    Literal(bool),
    /// A bare runtime-variable reference, used as a scalar boolean.
    Ref(RuntimeVarRef),
    /// `left == right`, where `right` is a string literal.
    Eq {
        /// The scalar being compared.
        left: RuntimeVarRef,
        /// The literal compared against.
        right: String,
    },
    /// Logical negation.
    Not(Box<Condition>),
    /// Logical conjunction.
    And(Vec<Condition>),
    /// Logical disjunction.
    Or(Vec<Condition>),
}

/// A single inline-level IR node.
#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    /// Plain text, whitespace already normalized.
    Text(String),
    /// `**bold**`.
    Bold(Vec<Inline>),
    /// `*italic*`.
    Italic(Vec<Inline>),
    /// `` `code` ``.
    InlineCode(String),
    /// `[text](url)`.
    Link {
        /// Link label content.
        text: Vec<Inline>,
        /// Link target.
        href: String,
    },
    /// Forced line break (`<br/>`).
    LineBreak,
    /// A runtime variable interpolation (`{ctx.phase.id}` in text content).
    RuntimeVarInterpolation(RuntimeVarRef),
}

/// One entry of a `SpawnAgent`'s `input={{...}}` object literal.
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    /// A string literal value.
    String(String),
    /// A number literal value.
    Number(f64),
    /// A boolean literal value.
    Bool(bool),
    /// A runtime-variable reference used as a field value.
    RuntimeVar(RuntimeVarRef),
}

/// A single field of a `SpawnAgent`'s `input` object literal.
#[derive(Clone, Debug, PartialEq)]
pub struct InputField {
    /// The field name.
    pub name: String,
    /// The field's value.
    pub value: InputValue,
}

/// A single `<SkillFile name="...">...</SkillFile>` declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct SkillFile {
    /// Output file name, relative to the skill's output directory.
    pub name: String,
    /// Body blocks for this generated file.
    pub children: Vec<Block>,
}

/// A single `<SkillStatic src="..."/>` declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct SkillStatic {
    /// Source path, resolved relative to the authoring file's directory.
    pub src: String,
    /// Output path; defaults to `src`'s file name when unset.
    pub dest: Option<String>,
}

/// A block-level IR node. Containers compose via `children: Vec<Block>`.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// ATX heading, level clamped to 1..=6.
    Heading {
        /// Heading level, 1..=6.
        level: u8,
        /// Heading content.
        children: Vec<Inline>,
    },
    /// A paragraph of inline content.
    Paragraph(Vec<Inline>),
    /// An ordered or unordered list.
    List {
        /// Whether this is an ordered (`1.`) list.
        ordered: bool,
        /// Starting number for ordered lists.
        start: u32,
        /// List items.
        items: Vec<Block>,
    },
    /// A single list item (only valid as a `List` child).
    ListItem(Vec<Block>),
    /// A blockquote.
    Blockquote(Vec<Block>),
    /// A fenced code block.
    CodeBlock {
        /// Optional language tag, from `className="language-X"`.
        lang: Option<String>,
        /// Raw code content, outer whitespace trimmed.
        code: String,
    },
    /// `<hr/>`.
    ThematicBreak,
    /// A Markdown table.
    Table {
        /// Header row cells.
        header: Vec<Vec<Inline>>,
        /// Body rows, each a vector of cells.
        rows: Vec<Vec<Vec<Inline>>>,
    },
    /// `<Indent>` — nested content rendered at one extra indent level.
    Indent(Vec<Block>),
    /// `<XmlBlock>` — raw XML-ish passthrough content.
    XmlBlock(String),
    /// `<ExecutionContext>` — a fenced prose block describing execution context.
    ExecutionContext(Vec<Block>),
    /// `<Step>` — a single numbered workflow step.
    Step(Vec<Block>),
    /// Raw, unescaped Markdown passed through verbatim.
    RawMarkdown(String),
    /// `<ReadFile path="p" as="V" optional?/>`.
    ReadFile {
        /// File path to read.
        path: String,
        /// Shell variable name to capture into.
        as_var: String,
        /// Whether a missing file is tolerated (suppresses stderr).
        optional: bool,
    },
    /// `<SpawnAgent .../>`.
    SpawnAgent {
        /// Target agent name (`subagent_type`).
        agent: String,
        /// Human-readable description of the spawn.
        description: String,
        /// Optional model override.
        model: Option<String>,
        /// The prompt text.
        prompt: String,
        /// Whether to prepend agent-file read instructions.
        read_agent_file: bool,
        /// Resolved input fields, if `input` was an object literal.
        input: Option<Vec<InputField>>,
        /// Declared input-interface type name, if any.
        input_type: Option<String>,
    },
    /// `<OnStatus output={var} status="...">...</OnStatus>`.
    OnStatus {
        /// The `useOutput` declaration this refers to.
        output_ref: String,
        /// The status value being matched.
        status: String,
        /// Body for this status branch.
        children: Vec<Block>,
    },
    /// `<OnStatusDefault>...</OnStatusDefault>`, paired with a preceding `OnStatus`.
    OnStatusDefault {
        /// The `useOutput` declaration inherited from the paired `OnStatus`.
        output_ref: String,
        /// Body for the fallback branch.
        children: Vec<Block>,
    },
    /// `<AskUser .../>`.
    AskUser {
        /// The question text.
        question: String,
        /// Offered options.
        options: Vec<String>,
        /// Optional header label.
        header: Option<String>,
        /// Optional longer description.
        description: Option<String>,
        /// Variable capturing the selected option.
        output_var: String,
    },
    /// `<If cond={...}>...</If>`, optionally paired with a following `Else`.
    If {
        /// The branch condition.
        condition: Condition,
        /// Body when the condition holds.
        children: Vec<Block>,
    },
    /// `<Else>...</Else>`, paired with an immediately preceding `If`.
    Else {
        /// Body when the paired `If`'s condition does not hold.
        children: Vec<Block>,
    },
    /// `<Loop times={N}>...</Loop>`.
    Loop {
        /// Maximum iteration count.
        max_iterations: u32,
        /// Counter variable name (e.g. `I`).
        counter_var: String,
        /// Loop body.
        children: Vec<Block>,
    },
    /// `<Break/>`, only valid inside a `Loop`.
    Break {
        /// Optional message.
        message: Option<String>,
    },
    /// `<Return/>`, ends the command.
    Return {
        /// Optional status tag.
        status: Option<String>,
        /// Optional message.
        message: Option<String>,
    },
    /// `<X.Call args={...} output={var}/>` — a runtime-function call site.
    Call {
        /// The runtime-function namespace (`X`).
        namespace: String,
        /// The called function name.
        function: String,
        /// Literal argument object, field by field.
        args: Vec<InputField>,
        /// Optional output-capture variable.
        output_var: Option<String>,
    },
}

/// The top-level document, tagged by kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Document {
    /// A classic or runtime Command document.
    Command {
        /// Command frontmatter.
        meta: CommandMeta,
        /// Runtime variable declarations, empty for classic (V1) commands.
        runtime_vars: Vec<RuntimeVarDecl>,
        /// Runtime-function names imported via `runtimeFn`, empty for V1.
        runtime_fns: Vec<RuntimeFnImport>,
        /// Root block children, in authoring order.
        children: Vec<Block>,
    },
    /// An Agent document.
    Agent {
        /// Agent frontmatter.
        meta: AgentMeta,
        /// Root block children, in authoring order.
        children: Vec<Block>,
    },
    /// A Skill document.
    Skill {
        /// Skill frontmatter.
        meta: SkillMeta,
        /// Root block children, in authoring order (go into `SKILL.md`).
        children: Vec<Block>,
        /// Additional generated Markdown files.
        files: Vec<SkillFile>,
        /// Statically copied files.
        statics: Vec<SkillStatic>,
    },
}

/// A `runtimeFn(fn)` import: function name plus the relative TS file it names.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeFnImport {
    /// The bundler namespace this import contributes to (`X` in `<X.Call/>`).
    pub namespace: String,
    /// The relative import path of the TS source file.
    pub import_path: String,
}

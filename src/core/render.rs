//! Renderer module
//!
//! Renders the packed repository to one of three interchangeable styles:
//! plain text, XML-tagged sections, or Markdown. All styles carry the same
//! content; only the framing differs. Framing is always kept well-formed:
//! XML file bodies are wrapped in CDATA, Markdown fences are longer than any
//! backtick run in the body.

use serde::{Deserialize, Serialize};

use crate::core::model::ProcessedFile;

const PLAIN_SEPARATOR: &str = "================";
const PLAIN_LONG_SEPARATOR: &str =
    "================================================================";

/// Output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    #[default]
    Plain,
    Xml,
    Markdown,
}

impl OutputStyle {
    /// File extension used for the default output path
    pub fn extension(&self) -> &'static str {
        match self {
            OutputStyle::Plain => "txt",
            OutputStyle::Xml => "xml",
            OutputStyle::Markdown => "md",
        }
    }
}

impl std::str::FromStr for OutputStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "txt" | "text" => Ok(OutputStyle::Plain),
            "xml" => Ok(OutputStyle::Xml),
            "md" | "markdown" => Ok(OutputStyle::Markdown),
            _ => Err(format!("Unknown style: {}", s)),
        }
    }
}

/// Which transformations were applied, surfaced in the notes block
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderNotes {
    pub comments_removed: bool,
    pub empty_lines_removed: bool,
    pub line_numbers: bool,
    pub security_check: bool,
}

/// Everything a renderer needs for one output artefact
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub generated_at: String,
    pub tree: String,
    pub files: &'a [ProcessedFile],
    pub header_text: Option<String>,
    pub instruction: Option<String>,
    /// `(part_number, total_parts)` when the output is split
    pub part: Option<(usize, usize)>,
    pub notes: RenderNotes,
}

/// Renderer for packed output
pub struct Renderer {
    style: OutputStyle,
}

impl Renderer {
    pub fn new(style: OutputStyle) -> Self {
        Self { style }
    }

    /// Render a context to a string
    pub fn render(&self, ctx: &RenderContext<'_>) -> String {
        match self.style {
            OutputStyle::Plain => render_plain(ctx),
            OutputStyle::Xml => render_xml(ctx),
            OutputStyle::Markdown => render_markdown(ctx),
        }
    }
}

fn intro_line() -> &'static str {
    "This file is a merged representation of the entire codebase, combining all repository files into a single document."
}

fn purpose_text() -> &'static str {
    "This file contains a packed representation of the entire repository's contents.\n\
It is designed to be easily consumable by AI systems for analysis, code review,\n\
or other automated processes."
}

fn file_format_text(style: OutputStyle) -> String {
    let entry = match style {
        OutputStyle::Plain => {
            "  a. A separator line (================)\n  b. The file path (File: path/to/file)\n  c. Another separator line\n  d. The full contents of the file\n  e. A blank line"
        }
        OutputStyle::Xml => {
            "  - File path as an attribute\n  - Full contents of the file inside a CDATA section"
        }
        OutputStyle::Markdown => {
            "  a. A header with the file path (## File: path/to/file)\n  b. The full contents of the file in a code block"
        }
    };
    let files_label = match style {
        OutputStyle::Xml => "4. Repository files, each consisting of a <file> element with:",
        _ => "4. Multiple file entries, each consisting of:",
    };
    format!(
        "The content is organized as follows:\n1. This summary section\n2. Repository information\n3. Repository structure\n{}\n{}",
        files_label, entry
    )
}

fn usage_text() -> &'static str {
    "- This file should be treated as read-only. Any changes should be made to the\n  original repository files, not this packed version.\n\
- When processing this file, use the file path to distinguish\n  between different files in the repository.\n\
- Be aware that this file may contain sensitive information. Handle it with\n  the same level of security as you would the original repository."
}

fn notes_text(notes: &RenderNotes) -> String {
    let mut lines = vec![
        "- Some files may have been excluded based on .gitignore rules and Repopack's\n  configuration.".to_string(),
        "- Binary files are not included in this packed representation. Please refer to\n  the Repository Structure section for a complete list of file paths, including\n  binary files.".to_string(),
    ];
    if notes.security_check {
        lines.push(
            "- Files suspected of containing secrets were excluded from this file."
                .to_string(),
        );
    }
    if notes.comments_removed {
        lines.push("- Code comments have been removed.".to_string());
    }
    if notes.empty_lines_removed {
        lines.push("- Empty lines have been removed.".to_string());
    }
    if notes.line_numbers {
        lines.push("- Line numbers have been added to the beginning of each line.".to_string());
    }
    lines.join("\n")
}

fn part_text(part: Option<(usize, usize)>) -> Option<String> {
    part.map(|(n, total)| format!("This is part {} of {} of the packed output.", n, total))
}

// ==================== Plain ====================

fn plain_heading(out: &mut String, title: &str) {
    out.push_str(&format!(
        "{}\n{}\n{}\n",
        PLAIN_LONG_SEPARATOR, title, PLAIN_LONG_SEPARATOR
    ));
}

fn plain_subheading(out: &mut String, title: &str) {
    out.push_str(&format!("{}:\n{}\n", title, "-".repeat(title.len() + 1)));
}

fn render_plain(ctx: &RenderContext<'_>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\nGenerated by Repopack on: {}\n\n",
        intro_line(),
        ctx.generated_at
    ));

    plain_heading(&mut out, "File Summary");
    out.push('\n');
    plain_subheading(&mut out, "Purpose");
    out.push_str(&format!("{}\n\n", purpose_text()));
    plain_subheading(&mut out, "File Format");
    out.push_str(&format!("{}\n\n", file_format_text(OutputStyle::Plain)));
    plain_subheading(&mut out, "Usage Guidelines");
    out.push_str(&format!("{}\n\n", usage_text()));
    plain_subheading(&mut out, "Notes");
    out.push_str(&format!("{}\n\n", notes_text(&ctx.notes)));

    plain_subheading(&mut out, "Additional Info");
    if let Some(part) = part_text(ctx.part) {
        out.push_str(&format!("{}\n", part));
    }
    if let Some(header) = &ctx.header_text {
        out.push('\n');
        plain_subheading(&mut out, "User Provided Header");
        out.push_str(&format!("{}\n", header));
    }
    out.push('\n');

    plain_heading(&mut out, "Repository Structure");
    out.push_str(&format!("{}\n\n", ctx.tree));

    plain_heading(&mut out, "Repository Files");
    out.push('\n');
    for file in ctx.files {
        out.push_str(&format!(
            "{}\nFile: {}\n{}\n{}\n\n",
            PLAIN_SEPARATOR, file.path, PLAIN_SEPARATOR, file.content
        ));
    }

    if let Some(instruction) = &ctx.instruction {
        out.push('\n');
        plain_heading(&mut out, "Instruction");
        out.push_str(&format!("{}\n", instruction));
    }

    out
}

// ==================== XML ====================

/// Escape text for use in XML character data or attribute values
pub fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wrap content in CDATA. A literal `]]>` is split across two sections so the
/// content round-trips unchanged through any XML parser.
pub fn wrap_cdata(content: &str) -> String {
    format!("<![CDATA[{}]]>", content.replace("]]>", "]]]]><![CDATA[>"))
}

fn xml_element(out: &mut String, tag: &str, body: &str) {
    out.push_str(&format!("<{}>\n{}\n</{}>\n", tag, escape_xml(body), tag));
}

fn render_xml(ctx: &RenderContext<'_>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", intro_line()));
    out.push_str(&format!(
        "<generated_at>{}</generated_at>\n\n",
        escape_xml(&ctx.generated_at)
    ));

    out.push_str("<file_summary>\nThis section contains a summary of this file.\n\n");
    xml_element(&mut out, "purpose", purpose_text());
    out.push('\n');
    xml_element(&mut out, "file_format", &file_format_text(OutputStyle::Xml));
    out.push('\n');
    xml_element(&mut out, "usage_guidelines", usage_text());
    out.push('\n');
    xml_element(&mut out, "notes", &notes_text(&ctx.notes));
    out.push('\n');

    out.push_str("<additional_info>\n");
    if let Some(part) = part_text(ctx.part) {
        out.push_str(&format!("{}\n", escape_xml(&part)));
    }
    if let Some(header) = &ctx.header_text {
        xml_element(&mut out, "user_provided_header", header);
    }
    out.push_str("</additional_info>\n</file_summary>\n\n");

    xml_element(&mut out, "repository_structure", &ctx.tree);
    out.push('\n');

    out.push_str(
        "<repository_files>\nThis section contains the contents of the repository's files.\n\n",
    );
    for file in ctx.files {
        out.push_str(&format!(
            "<file path=\"{}\">{}</file>\n\n",
            escape_xml(&file.path),
            wrap_cdata(&format!("\n{}\n", file.content))
        ));
    }
    out.push_str("</repository_files>\n");

    if let Some(instruction) = &ctx.instruction {
        out.push('\n');
        xml_element(&mut out, "instruction", instruction);
    }

    out
}

// ==================== Markdown ====================

/// Build a backtick fence longer than any backtick run in `content`
pub fn code_fence(content: &str) -> String {
    let mut longest = 0usize;
    let mut current = 0usize;
    for c in content.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

/// Language hint for a Markdown code block
pub fn language_hint(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "rs" => "rust",
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "tsx",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "hh" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "sh" | "bash" | "zsh" => "bash",
        "sql" => "sql",
        "html" | "htm" => "html",
        "xml" | "svg" => "xml",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "less" => "less",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "md" | "markdown" => "markdown",
        "vue" => "vue",
        "svelte" => "svelte",
        "dart" => "dart",
        "scala" => "scala",
        _ => "",
    }
}

fn render_markdown(ctx: &RenderContext<'_>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\nGenerated by Repopack on: {}\n\n",
        intro_line(),
        ctx.generated_at
    ));

    out.push_str("# File Summary\n\n");
    out.push_str(&format!("## Purpose\n{}\n\n", purpose_text()));
    out.push_str(&format!(
        "## File Format\n{}\n\n",
        file_format_text(OutputStyle::Markdown)
    ));
    out.push_str(&format!("## Usage Guidelines\n{}\n\n", usage_text()));
    out.push_str(&format!("## Notes\n{}\n\n", notes_text(&ctx.notes)));

    out.push_str("## Additional Info\n");
    if let Some(part) = part_text(ctx.part) {
        out.push_str(&format!("{}\n", part));
    }
    if let Some(header) = &ctx.header_text {
        out.push_str(&format!("\n### User Provided Header\n{}\n", header));
    }
    out.push('\n');

    let tree_fence = code_fence(&ctx.tree);
    out.push_str(&format!(
        "# Repository Structure\n{}\n{}\n{}\n\n",
        tree_fence, ctx.tree, tree_fence
    ));

    out.push_str("# Repository Files\n\n");
    for file in ctx.files {
        let fence = code_fence(&file.content);
        out.push_str(&format!(
            "## File: {}\n{}{}\n{}\n{}\n\n",
            file.path,
            fence,
            language_hint(&file.path),
            file.content,
            fence
        ));
    }

    if let Some(instruction) = &ctx.instruction {
        out.push_str(&format!("# Instruction\n{}\n", instruction));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_files() -> Vec<ProcessedFile> {
        vec![
            ProcessedFile::new("src/main.rs", "fn main() {}"),
            ProcessedFile::new("data.xml", "<root><![CDATA[x]]></root>"),
        ]
    }

    fn context(files: &[ProcessedFile]) -> RenderContext<'_> {
        RenderContext {
            generated_at: "2024-01-01T00:00:00+00:00".to_string(),
            tree: "src/\n  main.rs\ndata.xml".to_string(),
            files,
            header_text: Some("Project header".to_string()),
            instruction: Some("Review the code".to_string()),
            part: None,
            notes: RenderNotes::default(),
        }
    }

    #[test]
    fn test_output_style_parse() {
        assert_eq!("plain".parse::<OutputStyle>().unwrap(), OutputStyle::Plain);
        assert_eq!("XML".parse::<OutputStyle>().unwrap(), OutputStyle::Xml);
        assert_eq!("md".parse::<OutputStyle>().unwrap(), OutputStyle::Markdown);
        assert!("html".parse::<OutputStyle>().is_err());
    }

    #[test]
    fn test_all_styles_carry_same_content() {
        let files = sample_files();
        let ctx = context(&files);
        for style in [OutputStyle::Plain, OutputStyle::Xml, OutputStyle::Markdown] {
            let output = Renderer::new(style).render(&ctx);
            assert!(output.contains("packed representation"), "{:?}", style);
            assert!(output.contains("src/main.rs"), "{:?}", style);
            assert!(output.contains("fn main() {}"), "{:?}", style);
            assert!(output.contains("Project header"), "{:?}", style);
            assert!(output.contains("Review the code"), "{:?}", style);
            assert!(output.contains("main.rs"), "{:?}", style);
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let files = sample_files();
        let ctx = context(&files);
        for style in [OutputStyle::Plain, OutputStyle::Xml, OutputStyle::Markdown] {
            let renderer = Renderer::new(style);
            assert_eq!(renderer.render(&ctx), renderer.render(&ctx));
        }
    }

    #[test]
    fn test_plain_file_framing() {
        let files = vec![ProcessedFile::new("a.txt", "hello")];
        let output = Renderer::new(OutputStyle::Plain).render(&context(&files));
        assert!(output.contains("================\nFile: a.txt\n================\nhello\n"));
    }

    #[test]
    fn test_xml_content_cannot_break_framing() {
        let files = sample_files();
        let output = Renderer::new(OutputStyle::Xml).render(&context(&files));
        assert!(output.contains("<file path=\"data.xml\"><![CDATA[\n<root><![CDATA[x]]]]><![CDATA[></root>\n]]></file>"));
        // One opening and one closing tag per file
        assert_eq!(output.matches("<file path=").count(), 2);
        assert_eq!(output.matches("</file>").count(), 2);
    }

    #[test]
    fn test_xml_escapes_attributes() {
        let files = vec![ProcessedFile::new("a&b\".txt", "x")];
        let output = Renderer::new(OutputStyle::Xml).render(&context(&files));
        assert!(output.contains("<file path=\"a&amp;b&quot;.txt\">"));
    }

    #[test]
    fn test_markdown_fence_longer_than_content_backticks() {
        let files = vec![ProcessedFile::new("README.md", "```rust\nlet x = 1;\n```")];
        let output = Renderer::new(OutputStyle::Markdown).render(&context(&files));
        assert!(output.contains("## File: README.md\n````markdown\n```rust"));
        assert!(output.contains("```\n````\n"));
    }

    #[test]
    fn test_code_fence_minimum() {
        assert_eq!(code_fence("plain"), "```");
        assert_eq!(code_fence("a ```` b"), "`````");
    }

    #[test]
    fn test_language_hint() {
        assert_eq!(language_hint("src/main.rs"), "rust");
        assert_eq!(language_hint("app.TSX"), "tsx");
        assert_eq!(language_hint("Makefile"), "");
    }

    #[test]
    fn test_part_info_rendered() {
        let files = sample_files();
        let mut ctx = context(&files);
        ctx.part = Some((2, 3));
        let output = Renderer::new(OutputStyle::Plain).render(&ctx);
        assert!(output.contains("This is part 2 of 3"));
    }

    #[test]
    fn test_notes_reflect_transformations() {
        let files = sample_files();
        let mut ctx = context(&files);
        ctx.notes = RenderNotes {
            comments_removed: true,
            line_numbers: true,
            ..Default::default()
        };
        let output = Renderer::new(OutputStyle::Markdown).render(&ctx);
        assert!(output.contains("Code comments have been removed."));
        assert!(output.contains("Line numbers have been added"));
        assert!(!output.contains("Empty lines have been removed."));
    }

    #[test]
    fn test_no_instruction_section_when_absent() {
        let files = sample_files();
        let mut ctx = context(&files);
        ctx.instruction = None;
        let output = Renderer::new(OutputStyle::Plain).render(&ctx);
        assert!(!output.contains("Instruction\n"));
    }
}

//! Parses free-form model output into a structured action.
//!
//! The model is instructed to answer with marker lines, but real output
//! drifts: markers change case, synonyms appear, the input lands on the
//! next line. This parser is a pure function that absorbs that drift and
//! never fails — in the worst case the whole text is the answer.
//!
//! Marker matching is ASCII-case-insensitive on the raw text; byte
//! offsets from a match are safe to slice at because the markers are pure
//! ASCII.

/// A parsed model action: invoke a tool, or answer the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAction {
    Tool { name: String, input: String },
    Answer(String),
}

/// Any of these anywhere in the text means the model is trying to invoke
/// a tool.
const TOOL_PRESENCE_MARKERS: [&str; 4] = ["HERRAMIENTA:", "USAR_HERRAMIENTA:", "TOOL:", "ACTION:"];

/// Line markers that carry the tool name.
const TOOL_NAME_MARKERS: [&str; 3] = ["HERRAMIENTA:", "TOOL:", "ACTION:"];

/// Line markers that carry the tool input.
const INPUT_MARKERS: [&str; 2] = ["INPUT:", "QUERY:"];

/// Marker introducing a final answer.
const ANSWER_MARKER: &str = "RESPUESTA:";

/// Normalized name of the retrieval tool.
pub const RETRIEVAL_TOOL: &str = "buscar_documentos";

/// Normalized name of the calculator tool.
pub const CALCULATOR_TOOL: &str = "calcular";

/// Map raw model output to an action. Total: every input yields an action.
///
/// Precedence: tool invocation (when complete), then explicit answer
/// marker, then the whole text verbatim. Parsing is applied once — an
/// answer that itself contains marker text is returned as-is.
pub fn parse(text: &str) -> ParsedAction {
    if TOOL_PRESENCE_MARKERS
        .iter()
        .any(|m| find_ascii_ci(text, m).is_some())
    {
        if let Some(action) = parse_tool_invocation(text) {
            return action;
        }
    }

    if let Some(idx) = find_ascii_ci(text, ANSWER_MARKER) {
        let content = text[idx + ANSWER_MARKER.len()..].trim();
        return ParsedAction::Answer(content.to_string());
    }

    ParsedAction::Answer(text.to_string())
}

/// Line-by-line scan for a tool name and an input. Returns `None` when
/// either is missing or empty, letting [`parse`] fall through to the
/// answer paths.
fn parse_tool_invocation(text: &str) -> Option<ParsedAction> {
    let lines: Vec<&str> = text.lines().collect();
    let mut name: Option<String> = None;
    let mut input: Option<String> = None;

    for (i, line) in lines.iter().enumerate() {
        if TOOL_NAME_MARKERS
            .iter()
            .any(|m| find_ascii_ci(line, m).is_some())
        {
            if let Some((_, value)) = line.split_once(':') {
                let value = value.trim();
                if !value.is_empty() {
                    name = Some(normalize_tool_name(&value.to_lowercase()));
                }
            }
        }

        if INPUT_MARKERS
            .iter()
            .any(|m| find_ascii_ci(line, m).is_some())
        {
            if let Some((_, value)) = line.split_once(':') {
                let value = value.trim();
                if !value.is_empty() {
                    input = Some(value.to_string());
                } else if let Some(next) = lines.get(i + 1) {
                    // Input marker with no trailing value: the next line
                    // is the input.
                    let next = next.trim();
                    if !next.is_empty() {
                        input = Some(next.to_string());
                    }
                }
            }
        }
    }

    match (name, input) {
        (Some(name), Some(input)) => Some(ParsedAction::Tool { name, input }),
        _ => None,
    }
}

/// Normalize a raw tool name into one of the known identifiers by
/// substring. Unrecognized names pass through verbatim so the loop can
/// report them instead of guessing.
fn normalize_tool_name(raw: &str) -> String {
    if raw.contains("buscar") || raw.contains("documento") {
        RETRIEVAL_TOOL.to_string()
    } else if raw.contains("calcul") {
        CALCULATOR_TOOL.to_string()
    } else {
        raw.to_string()
    }
}

/// ASCII-case-insensitive substring search returning a byte offset. The
/// needle must be pure ASCII; matches therefore start on char boundaries.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

//! Rule-based autocomplete suggestions.
//!
//! A stateless pure function from `(code, cursor_position, language)` to a
//! suggestion string. Only the line the cursor sits on is inspected; the
//! rules are simple prefix patterns per language. Deliberately no model and
//! no state, so it lives outside the real-time core.

use serde::{Deserialize, Serialize};

use crate::domain::DEFAULT_LANGUAGE;

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionRequest {
    pub code: String,
    pub cursor_position: usize,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub suggestion: String,
    pub start_position: usize,
    pub end_position: usize,
}

/// Produce a suggestion for the code as typed up to the cursor.
///
/// A cursor past the end of the buffer (or inside a multi-byte character)
/// is clamped to the nearest valid position.
pub fn suggest(request: &SuggestionRequest) -> Suggestion {
    let code = &request.code;
    let mut cursor = request.cursor_position.min(code.len());
    while !code.is_char_boundary(cursor) {
        cursor -= 1;
    }

    // The current line up to the cursor
    let current_line = code[..cursor].rsplit('\n').next().unwrap_or("");

    let suggestion = match request.language.as_str() {
        "python" => python_suggestion(current_line),
        "javascript" | "typescript" => javascript_suggestion(current_line),
        "java" => java_suggestion(current_line),
        "cpp" | "c++" => cpp_suggestion(current_line),
        "go" => go_suggestion(current_line),
        _ => "  // Continue coding...",
    };

    Suggestion {
        suggestion: suggestion.to_string(),
        start_position: cursor,
        end_position: cursor + suggestion.len(),
    }
}

fn python_suggestion(line: &str) -> &'static str {
    let trimmed = line.trim();
    if trimmed.starts_with("def ") {
        ":\n    pass"
    } else if trimmed.starts_with("class ") {
        ":\n    def __init__(self):\n        pass"
    } else if trimmed.starts_with("if ")
        || trimmed.starts_with("for ")
        || trimmed.starts_with("while ")
        || trimmed.starts_with("with ")
    {
        ":\n    pass"
    } else if trimmed.starts_with("try") {
        ":\n    pass\nexcept Exception as e:\n    pass"
    } else if line.contains("print") && !trimmed.ends_with(')') {
        ")"
    } else if trimmed == "import" {
        " numpy as np"
    } else if trimmed.starts_with("from ") {
        " import "
    } else {
        ""
    }
}

fn javascript_suggestion(line: &str) -> &'static str {
    let trimmed = line.trim();
    if trimmed.starts_with("function ") {
        " {\n  // TODO: Implement\n}"
    } else if trimmed.starts_with("const ") || trimmed.starts_with("let ") {
        " = "
    } else if trimmed.starts_with("if ") || trimmed.starts_with("for ") || trimmed.starts_with("while ") {
        " {\n  \n}"
    } else if trimmed.starts_with("class ") {
        " {\n  constructor() {\n  }\n}"
    } else if trimmed.starts_with("async ") {
        " () => {\n  \n}"
    } else if trimmed.starts_with("try") {
        " {\n  \n} catch (error) {\n  \n}"
    } else if line.contains("console.log") && !trimmed.ends_with(')') {
        ")"
    } else if trimmed.starts_with("import ") {
        " from ''"
    } else if trimmed.starts_with("export ") {
        " default "
    } else {
        ""
    }
}

fn java_suggestion(line: &str) -> &'static str {
    let trimmed = line.trim();
    if trimmed.starts_with("public class ") {
        " {\n  public static void main(String[] args) {\n    \n  }\n}"
    } else if trimmed.starts_with("private ") || trimmed.starts_with("public ") {
        if line.contains('(') {
            " {\n    \n  }"
        } else {
            ";"
        }
    } else if trimmed.starts_with("if ") || trimmed.starts_with("for ") || trimmed.starts_with("while ") {
        " {\n    \n  }"
    } else if trimmed.starts_with("try") {
        " {\n    \n  } catch (Exception e) {\n    \n  }"
    } else if line.contains("System.out.println") && !trimmed.ends_with(')') {
        ")"
    } else if trimmed.starts_with("import ") {
        ";"
    } else {
        ""
    }
}

fn cpp_suggestion(line: &str) -> &'static str {
    let trimmed = line.trim();
    if trimmed.starts_with("#include") {
        if line.contains('<') { "iostream>" } else { " <iostream>" }
    } else if trimmed.starts_with("int main") {
        " {\n  return 0;\n}"
    } else if trimmed.starts_with("class ") {
        " {\npublic:\n  \nprivate:\n  \n};"
    } else if trimmed.starts_with("struct ") {
        " {\n  \n};"
    } else if line.contains("void ") || line.contains("int ") || line.contains("double ") {
        if line.contains('(') && line.contains(')') {
            " {\n  \n}"
        } else {
            ""
        }
    } else if trimmed.starts_with("if ") || trimmed.starts_with("for ") || trimmed.starts_with("while ") {
        " {\n  \n}"
    } else if line.contains("std::cout") {
        " << std::endl;"
    } else if line.contains("std::cin") {
        " >> "
    } else if trimmed.starts_with("using ") {
        "namespace std;"
    } else {
        ""
    }
}

fn go_suggestion(line: &str) -> &'static str {
    let trimmed = line.trim();
    if trimmed.starts_with("package ") {
        "main"
    } else if trimmed.starts_with("import ") {
        "(\"fmt\")"
    } else if trimmed.starts_with("func main") {
        "() {\n  \n}"
    } else if trimmed.starts_with("func ") {
        "() {\n  \n}"
    } else if trimmed.starts_with("type ") {
        if line.contains("struct") {
            " {\n  \n}"
        } else {
            " struct {\n  \n}"
        }
    } else if trimmed.starts_with("if ") || trimmed.starts_with("for ") {
        " {\n  \n}"
    } else if line.contains("fmt.Println") && !trimmed.ends_with(')') {
        ")"
    } else if trimmed.starts_with("var ") {
        " := "
    } else if trimmed == ":" {
        "= "
    } else {
        ""
    }
}

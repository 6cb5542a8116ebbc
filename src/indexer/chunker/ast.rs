//! Tree-sitter segmentation of source files into semantic units.
//!
//! Only the root's direct children are walked: top-level definitions,
//! imports, comments and expression statements. Consecutive units are
//! grouped greedily under a character budget; a single unit larger than
//! the budget still becomes one chunk, never split mid-definition.

use tree_sitter::{Language, Parser};

use super::{split_simple, Chunk};

/// Segment `content` along AST boundaries. Returns `None` when no
/// grammar is linked for `language` (the caller falls back to the text
/// splitter). A supported language whose parse yields nothing usable
/// falls back internally.
pub(super) fn split_ast(
    content: &str,
    language: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Option<Vec<Chunk>> {
    let lang = language_for(language)?;

    let mut parser = Parser::new();
    if parser.set_language(&lang).is_err() {
        return Some(split_simple(content, chunk_size, chunk_overlap));
    }
    let Some(tree) = parser.parse(content, None) else {
        return Some(split_simple(content, chunk_size, chunk_overlap));
    };
    let root = tree.root_node();
    let allowed = semantic_unit_types(language);

    // (start_byte, text) per collected top-level node.
    let mut units: Vec<(usize, &str)> = Vec::new();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        let kind = child.kind();
        let collect = if allowed.is_empty() {
            true
        } else {
            allowed.contains(&kind)
                || kind == "comment"
                || kind == "expression_statement"
        };
        if collect {
            units.push((child.start_byte(), &content[child.byte_range()]));
        }
    }

    if units.is_empty() {
        return Some(split_simple(content, chunk_size, chunk_overlap));
    }

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut buffer_len = 0usize;
    let mut buffer_start = 0usize;
    let mut idx = 0usize;

    let mut flush = |buffer: &mut Vec<&str>, buffer_start: usize, idx: &mut usize| {
        if buffer.is_empty() {
            return;
        }
        let text = buffer.join("\n");
        if !text.trim().is_empty() {
            chunks.push(Chunk {
                text,
                location: format!("{}:{}", *idx, buffer_start),
            });
            *idx += 1;
        }
        buffer.clear();
    };

    for (start_byte, text) in units {
        if !buffer.is_empty() && buffer_len + text.len() > chunk_size {
            flush(&mut buffer, buffer_start, &mut idx);
            buffer_len = 0;
        }
        if buffer.is_empty() {
            buffer_start = start_byte;
        }
        buffer_len += text.len();
        buffer.push(text);
    }
    flush(&mut buffer, buffer_start, &mut idx);
    drop(flush);

    if chunks.is_empty() {
        return Some(split_simple(content, chunk_size, chunk_overlap));
    }
    Some(chunks)
}

/// Grammar lookup for a language tag. Grammars are statically linked, so
/// this total match doubles as the parser cache: a `None` is the
/// negative entry and costs nothing to re-answer.
fn language_for(language: &str) -> Option<Language> {
    match language {
        "python" => Some(tree_sitter_python::language()),
        "rust" => Some(tree_sitter_rust::language()),
        "typescript" => Some(tree_sitter_typescript::language_typescript()),
        "tsx" => Some(tree_sitter_typescript::language_tsx()),
        "javascript" => Some(tree_sitter_javascript::language()),
        "c_sharp" => Some(tree_sitter_c_sharp::language()),
        _ => None,
    }
}

/// Top-level node kinds that count as semantic units per language.
/// Comments and expression statements are collected regardless, to keep
/// module docstrings and headers.
fn semantic_unit_types(language: &str) -> &'static [&'static str] {
    match language {
        "python" => &[
            "function_definition",
            "class_definition",
            "decorated_definition",
            "import_statement",
            "import_from_statement",
        ],
        "rust" => &[
            "function_item",
            "struct_item",
            "enum_item",
            "trait_item",
            "impl_item",
            "mod_item",
            "use_declaration",
            "macro_definition",
            "type_item",
            "const_item",
            "static_item",
        ],
        "typescript" | "tsx" => &[
            "function_declaration",
            "class_declaration",
            "abstract_class_declaration",
            "interface_declaration",
            "type_alias_declaration",
            "enum_declaration",
            "import_statement",
            "export_statement",
            "lexical_declaration",
            "variable_declaration",
        ],
        "javascript" => &[
            "function_declaration",
            "class_declaration",
            "import_statement",
            "export_statement",
            "lexical_declaration",
            "variable_declaration",
        ],
        "c_sharp" => &[
            "using_directive",
            "namespace_declaration",
            "file_scoped_namespace_declaration",
            "class_declaration",
            "interface_declaration",
            "struct_declaration",
            "enum_declaration",
            "record_declaration",
            "delegate_declaration",
            "global_statement",
        ],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_single_function() {
        let code = "def hello():\n    print('hi')\n";
        let chunks = split_ast(code, "python", 1000, 0).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("def hello"));
    }

    #[test]
    fn test_python_multiple_functions_fit_in_one_chunk() {
        let code = "def foo():\n    pass\n\ndef bar():\n    pass\n";
        let chunks = split_ast(code, "python", 1000, 0).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("def foo"));
        assert!(chunks[0].text.contains("def bar"));
    }

    #[test]
    fn test_python_functions_split_when_exceeding_size() {
        let func1 = format!("def foo():\n{}", "    x = 1\n".repeat(50));
        let func2 = format!("def bar():\n{}", "    y = 2\n".repeat(50));
        let code = format!("{func1}\n{func2}");
        let chunks = split_ast(&code, "python", 400, 0).unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.contains("def foo"));
        assert!(chunks[1].text.contains("def bar"));
    }

    #[test]
    fn test_python_class_kept_intact() {
        let code = "class MyClass:\n    def method(self):\n        pass\n";
        let chunks = split_ast(code, "python", 1000, 0).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("class MyClass"));
    }

    #[test]
    fn test_python_imports_grouped() {
        let code = "import os\nimport sys\n\ndef main():\n    pass\n";
        let chunks = split_ast(code, "python", 1000, 0).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("import os"));
        assert!(chunks[0].text.contains("import sys"));
    }

    #[test]
    fn test_returns_none_for_unsupported_language() {
        assert!(split_ast("some content", "brainfuck", 100, 0).is_none());
        assert!(split_ast("func _ready():\n\tpass\n", "gdscript", 100, 0).is_none());
    }

    #[test]
    fn test_typescript_function() {
        let code = "function greet(name: string): string {\n  return name;\n}\n";
        let chunks = split_ast(code, "typescript", 1000, 0).unwrap();
        assert!(!chunks.is_empty());
        assert!(chunks[0].text.contains("function greet"));
    }

    #[test]
    fn test_rust_items_collected() {
        let code = "use std::fmt;\n\npub fn answer() -> u32 {\n    42\n}\n";
        let chunks = split_ast(code, "rust", 1000, 0).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("use std::fmt"));
        assert!(chunks[0].text.contains("pub fn answer"));
    }

    #[test]
    fn test_csharp_namespace_kept_intact() {
        let code = "using System;\n\nnamespace App {\n    class Program { }\n}\n";
        let chunks = split_ast(code, "c_sharp", 1000, 0).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("namespace App"));
    }

    #[test]
    fn test_location_carries_first_node_start_byte() {
        let code = "def foo():\n    pass\n\ndef bar():\n    pass\n";
        let chunks = split_ast(code, "python", 20, 0).unwrap();
        assert!(chunks.len() >= 2);
        assert_eq!(chunks[0].location, "0:0");
        let second_start: usize = chunks[1].location.split(':').nth(1).unwrap().parse().unwrap();
        assert_eq!(second_start, code.find("def bar").unwrap());
    }

    #[test]
    fn test_empty_file_falls_back_to_simple() {
        let chunks = split_ast("", "python", 100, 0).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].location, "0:0");
    }

    #[test]
    fn test_large_single_definition_not_split() {
        let code = format!("def big():\n{}", "    x = 1\n".repeat(200));
        let chunks = split_ast(&code, "python", 500, 0).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("def big"));
    }

    #[test]
    fn test_module_docstring_kept() {
        let code = "\"\"\"Module docs.\"\"\"\n\ndef f():\n    pass\n";
        let chunks = split_ast(code, "python", 1000, 0).unwrap();
        assert!(chunks[0].text.contains("Module docs"));
    }
}

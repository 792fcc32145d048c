#[cfg(test)]
#[path = "syntaxes_test.rs"]
mod tests;

use once_cell::sync::Lazy;
use ratatui::style::Color;
use syntect::parsing::SyntaxReference;
use syntect::parsing::SyntaxSet;

pub static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

pub struct Syntaxes {}

impl Syntaxes {
    /// Resolves the language tag of a code fence to a syntax. Untagged and
    /// unknown blocks fall back to plain text.
    pub fn get(name: &str) -> &'static SyntaxReference {
        let name = name.trim().to_lowercase();
        let token = match name.as_str() {
            "" | "plaintext" | "plain" | "text" | "txt" => {
                return SYNTAX_SET.find_syntax_plain_text();
            }
            "typescript" | "ts" | "tsx" | "jsx" | "node" => "js",
            "shell" | "zsh" | "console" => "bash",
            "golang" => "go",
            "c++" => "cpp",
            "c#" | "csharp" => "cs",
            "yml" => "yaml",
            _ => name.as_str(),
        };

        if let Some(syntax) = SYNTAX_SET.find_syntax_by_token(token) {
            return syntax;
        }

        return SYNTAX_SET.find_syntax_plain_text();
    }

    pub fn list() -> Vec<String> {
        let mut syntaxes = SYNTAX_SET
            .syntaxes()
            .iter()
            .map(|e| return e.name.to_string())
            .collect::<Vec<String>>();
        syntaxes.sort();
        syntaxes.dedup();

        return syntaxes;
    }

    pub fn translate_colour(syntect_color: syntect::highlighting::Color) -> Option<Color> {
        match syntect_color {
            syntect::highlighting::Color { r, g, b, a } if a > 0 => {
                return Some(Color::Rgb(r, g, b));
            }
            _ => return None,
        }
    }
}
